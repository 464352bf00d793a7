use crate::core::error::EngineError;
use crate::core::metric::Metric;
use crate::core::vector::{FeatureVector, RankingResult, ScoredMatch};
use crate::storage::table::FeatureTable;
use rayon::prelude::*;
use tracing::{debug, warn};

/// Scores a target against a candidate collection with one metric and
/// returns the candidates ordered most-similar first.
pub struct RankingEngine {
    metric: Box<dyn Metric>,
    top_k: Option<usize>,
    exclude_id: Option<String>,
    exact: bool,
}

impl RankingEngine {
    pub fn new(metric: impl Metric + 'static) -> Self {
        Self {
            metric: Box::new(metric),
            top_k: None,
            exclude_id: None,
            exact: false,
        }
    }

    /// Keep only the best `k` matches.
    pub fn top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    /// Never return the candidate with this id (normally the query itself).
    pub fn exclude(mut self, id: impl Into<String>) -> Self {
        self.exclude_id = Some(id.into());
        self
    }

    /// Fail with `InsufficientCandidates` instead of returning fewer than
    /// `top_k` matches.
    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    pub fn rank(&self, target: &FeatureVector, candidates: &[FeatureVector]) -> Result<RankingResult, EngineError> {
        let excluded: Vec<&str> = self.exclude_id.as_deref().into_iter().collect();
        self.rank_excluding(target, candidates, &excluded)
    }

    /// Ranks a table against one of its own rows. The target row is always
    /// excluded from the output, in addition to any `exclude` id.
    pub fn rank_table(&self, target_id: &str, table: &FeatureTable) -> Result<RankingResult, EngineError> {
        let target = table
            .get(target_id)
            .ok_or_else(|| EngineError::UnknownId(target_id.to_string()))?;
        let mut excluded = vec![target_id];
        excluded.extend(self.exclude_id.as_deref());
        self.rank_excluding(target, table.vectors(), &excluded)
    }

    fn rank_excluding(
        &self,
        target: &FeatureVector,
        candidates: &[FeatureVector],
        excluded: &[&str],
    ) -> Result<RankingResult, EngineError> {
        let metric = self.metric.as_ref();

        // Collected in candidate order, so ties resolve the same way
        // regardless of how rayon schedules the work.
        let scored: Vec<Option<ScoredMatch>> = candidates
            .par_iter()
            .map(|candidate| {
                if excluded.contains(&candidate.id()) {
                    return None;
                }
                match metric.distance(target, candidate) {
                    Ok(score) if score.is_finite() => Some(ScoredMatch::new(candidate.id(), score)),
                    Ok(score) => {
                        warn!(id = candidate.id(), score, metric = metric.name(), "Skipping candidate with non-finite score");
                        None
                    }
                    Err(e) => {
                        warn!(id = candidate.id(), error = %e, metric = metric.name(), "Skipping candidate");
                        None
                    }
                }
            })
            .collect();

        let matches: Vec<ScoredMatch> = scored.into_iter().flatten().collect();
        let valid = matches.len();

        let mut ranking = RankingResult::new(metric.name(), metric.direction(), matches);
        ranking.sort();

        if let Some(k) = self.top_k {
            if self.exact && valid < k {
                return Err(EngineError::InsufficientCandidates {
                    requested: k,
                    available: valid,
                });
            }
            ranking.truncate(k);
        }

        debug!(
            metric = metric.name(),
            candidates = candidates.len(),
            valid,
            returned = ranking.len(),
            "Ranking complete"
        );
        Ok(ranking)
    }
}
