//! Weighted fusion of several normalized rankings into one.
//!
//! Every input must already be normalized (scores in `[0, 1]`, larger = more
//! similar). For each fused id the engine computes `Σ weight_i · score_i` and
//! then applies a [`FinalTransform`]. The default transform is the reciprocal
//! `1 / Σ`, sorted descending, which reproduces the legacy output scale.

use crate::core::error::EngineError;
use crate::core::vector::{Direction, RankingResult, ScoredMatch};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Per-signal weights keyed by ranking name. Weights need not sum to 1.
pub type FusionWeights = HashMap<String, f32>;

/// What to do with an id that some rankings do not contain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingSignal {
    /// Keep only ids present in every ranking.
    #[default]
    Drop,
    /// Substitute this normalized score for the missing signal.
    Default(f32),
}

/// How entries of different rankings are paired up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// Join on id.
    ById { missing: MissingSignal },
    /// Pair entries by list position and truncate to the shortest ranking.
    /// Ids come from the first ranking. Only meaningful when every input
    /// lists the same candidates in the same order.
    Positional,
}

impl Default for Alignment {
    fn default() -> Self {
        Alignment::ById {
            missing: MissingSignal::Drop,
        }
    }
}

/// Maps the combined weighted similarity to the reported score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FinalTransform {
    /// `1 / weighted_sum`. Output is sorted descending, so the least similar
    /// candidate comes first; this matches the historical output exactly.
    #[default]
    Reciprocal,
    /// Report the weighted sum itself, sorted descending.
    Identity,
}

/// What `Reciprocal` does with an id whose weighted sum is zero. With
/// distance signals this happens whenever every signal puts the same
/// candidate last, since normalization maps the farthest one to 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ZeroSumPolicy {
    /// Fail the whole fusion with `ZeroDivisor`.
    #[default]
    Fail,
    /// Leave the id out of the fused ranking.
    Skip,
}

impl FinalTransform {
    /// Whether the most similar candidate ends up last in the fused order.
    pub fn most_similar_last(self) -> bool {
        self == FinalTransform::Reciprocal
    }

    fn apply(self, weighted_sum: f32) -> Result<f32, EngineError> {
        match self {
            FinalTransform::Reciprocal => {
                if weighted_sum == 0.0 {
                    return Err(EngineError::ZeroDivisor);
                }
                Ok(1.0 / weighted_sum)
            }
            FinalTransform::Identity => Ok(weighted_sum),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FusionEngine {
    pub alignment: Alignment,
    pub transform: FinalTransform,
    pub zero_sum: ZeroSumPolicy,
}

impl FusionEngine {
    pub fn new(alignment: Alignment, transform: FinalTransform) -> Self {
        Self {
            alignment,
            transform,
            zero_sum: ZeroSumPolicy::default(),
        }
    }

    pub fn zero_sum(mut self, policy: ZeroSumPolicy) -> Self {
        self.zero_sum = policy;
        self
    }

    /// The `k` best entries of a ranking this engine fused, most similar
    /// first. Under `Reciprocal` those are the last `k` entries.
    pub fn most_similar(&self, fused: &RankingResult, k: usize) -> Vec<ScoredMatch> {
        if self.transform.most_similar_last() {
            fused.matches.iter().rev().take(k).cloned().collect()
        } else {
            fused.matches.iter().take(k).cloned().collect()
        }
    }

    /// Fuses `(ranking, weight)` pairs into a single ranking named "fused".
    pub fn fuse(&self, rankings: &[(RankingResult, f32)]) -> Result<RankingResult, EngineError> {
        validate(rankings)?;

        let combined = match self.alignment {
            Alignment::Positional => combine_positional(rankings),
            Alignment::ById { missing } => combine_by_id(rankings, missing),
        };

        let mut matches = Vec::with_capacity(combined.len());
        for (id, weighted_sum) in combined {
            match self.transform.apply(weighted_sum) {
                Ok(score) => matches.push(ScoredMatch::new(id, score)),
                Err(EngineError::ZeroDivisor) if self.zero_sum == ZeroSumPolicy::Skip => {
                    warn!(id = %id, "Skipping candidate with zero weighted similarity");
                }
                Err(e) => return Err(e),
            }
        }

        let mut fused = RankingResult::new("fused", Direction::LargerIsSimilar, matches);
        fused.sort();
        debug!(
            inputs = rankings.len(),
            fused = fused.len(),
            transform = ?self.transform,
            "Fusion complete"
        );
        Ok(fused)
    }

    /// Fuses rankings using weights looked up by ranking name.
    pub fn fuse_weighted(
        &self,
        rankings: &[RankingResult],
        weights: &FusionWeights,
    ) -> Result<RankingResult, EngineError> {
        let pairs = rankings
            .iter()
            .map(|r| {
                weights
                    .get(&r.name)
                    .map(|&w| (r.clone(), w))
                    .ok_or_else(|| EngineError::InvalidParameter(format!("no weight for ranking '{}'", r.name)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.fuse(&pairs)
    }
}

fn validate(rankings: &[(RankingResult, f32)]) -> Result<(), EngineError> {
    if rankings.is_empty() {
        return Err(EngineError::InvalidParameter("fusion needs at least one ranking".to_string()));
    }
    for (ranking, weight) in rankings {
        if !ranking.normalized {
            return Err(EngineError::Unnormalized(ranking.name.clone()));
        }
        if !weight.is_finite() || *weight < 0.0 {
            return Err(EngineError::InvalidParameter(format!(
                "weight {} for '{}' must be finite and non-negative",
                weight, ranking.name
            )));
        }
    }
    Ok(())
}

fn combine_positional(rankings: &[(RankingResult, f32)]) -> Vec<(String, f32)> {
    let limit = rankings.iter().map(|(r, _)| r.len()).min().unwrap_or(0);
    let (first, _) = &rankings[0];

    (0..limit)
        .map(|i| {
            let id = &first.matches[i].id;
            let mut sum = 0.0;
            for (ranking, weight) in rankings {
                let entry = &ranking.matches[i];
                if &entry.id != id {
                    warn!(position = i, expected = %id, found = %entry.id, ranking = %ranking.name, "Positional fusion paired different ids");
                }
                sum += weight * entry.score;
            }
            (id.clone(), sum)
        })
        .collect()
}

fn combine_by_id(rankings: &[(RankingResult, f32)], missing: MissingSignal) -> Vec<(String, f32)> {
    let lookups: Vec<HashMap<&str, f32>> = rankings
        .iter()
        .map(|(ranking, _)| {
            let mut scores = HashMap::with_capacity(ranking.len());
            for m in &ranking.matches {
                if scores.contains_key(m.id.as_str()) {
                    warn!(id = %m.id, ranking = %ranking.name, "Duplicate id in ranking, keeping first");
                    continue;
                }
                scores.insert(m.id.as_str(), m.score);
            }
            scores
        })
        .collect();

    // First ranking's order first, then ids only later rankings know about.
    let mut seen = HashSet::new();
    let mut order: Vec<&str> = Vec::new();
    let candidates: Box<dyn Iterator<Item = &str> + '_> = match missing {
        MissingSignal::Drop => Box::new(rankings[0].0.ids()),
        MissingSignal::Default(_) => Box::new(rankings.iter().flat_map(|(r, _)| r.ids())),
    };
    for id in candidates {
        if seen.insert(id) {
            order.push(id);
        }
    }

    order
        .into_iter()
        .filter_map(|id| {
            let mut sum = 0.0;
            for ((_, weight), scores) in rankings.iter().zip(&lookups) {
                let score = match (scores.get(id), missing) {
                    (Some(&s), _) => s,
                    (None, MissingSignal::Default(fill)) => fill,
                    (None, MissingSignal::Drop) => return None,
                };
                sum += weight * score;
            }
            Some((id.to_string(), sum))
        })
        .collect()
}
