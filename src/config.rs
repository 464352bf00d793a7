//! JSON configuration for fused queries.
//!
//! ```json
//! {
//!   "signals": [
//!     { "name": "texture", "table": "texture.csv", "metric": "cosine", "weight": 0.7 },
//!     { "name": "color", "table": "color.csv", "metric": "histogram_intersection", "weight": 0.3 }
//!   ],
//!   "top_k": 3
//! }
//! ```
//!
//! Relative table paths are resolved against the config file's directory.
//! Unlike a bare [`FusionEngine`], a config-driven query skips candidates
//! whose weighted sum is zero unless `"zero_sum": "fail"` is given.

use crate::core::fusion::{Alignment, FinalTransform, FusionEngine, FusionWeights, ZeroSumPolicy};
use crate::core::metric::DistanceMetric;
use crate::core::normalize::ScoreNormalizer;
use crate::core::ranking::RankingEngine;
use crate::core::vector::RankingResult;
use crate::storage::table::{FeatureTable, StorageError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub use crate::core::kmeans::ClusterConfig;

fn default_top_k() -> usize {
    3
}

fn default_zero_sum() -> ZeroSumPolicy {
    ZeroSumPolicy::Skip
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalConfig {
    pub name: String,
    pub table: PathBuf,
    pub metric: DistanceMetric,
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub signals: Vec<SignalConfig>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub alignment: Alignment,
    #[serde(default)]
    pub transform: FinalTransform,
    #[serde(default = "default_zero_sum")]
    pub zero_sum: ZeroSumPolicy,
}

impl RetrievalConfig {
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let text = std::fs::read_to_string(path)?;
        let mut config = Self::from_json(&text)?;
        if let Some(base) = path.parent() {
            for signal in &mut config.signals {
                if signal.table.is_relative() {
                    signal.table = base.join(&signal.table);
                }
            }
        }
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, StorageError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), StorageError> {
        if self.signals.is_empty() {
            return Err(StorageError::Config("no signals listed".to_string()));
        }
        let mut names = HashSet::new();
        for signal in &self.signals {
            if !names.insert(signal.name.as_str()) {
                return Err(StorageError::Config(format!("signal '{}' is listed twice", signal.name)));
            }
        }
        Ok(())
    }

    pub fn weights(&self) -> FusionWeights {
        self.signals.iter().map(|s| (s.name.clone(), s.weight)).collect()
    }

    pub fn fusion_engine(&self) -> FusionEngine {
        FusionEngine::new(self.alignment, self.transform).zero_sum(self.zero_sum)
    }

    /// Ranks `target` against every signal's table, normalizes each ranking
    /// and fuses them. Every signal ranks the whole table so normalization
    /// sees the full batch. The fused ranking is not cut to `top_k`.
    pub fn query(&self, target: &str) -> Result<RankingResult, StorageError> {
        let mut rankings = Vec::with_capacity(self.signals.len());
        for signal in &self.signals {
            let table = FeatureTable::load(&signal.table)?;
            let mut ranking = RankingEngine::new(signal.metric).rank_table(target, &table)?;
            ranking.name = signal.name.clone();
            rankings.push(ScoreNormalizer::normalize_ranking(&ranking)?);
        }
        Ok(self.fusion_engine().fuse_weighted(&rankings, &self.weights())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fusion::MissingSignal;

    #[test]
    fn test_defaults() {
        let config = RetrievalConfig::from_json(
            r#"{"signals": [{"name": "color", "table": "c.csv", "metric": "histogram_intersection", "weight": 1.0}]}"#,
        )
        .unwrap();
        assert_eq!(config.top_k, 3);
        assert_eq!(config.alignment, Alignment::default());
        assert_eq!(config.transform, FinalTransform::Reciprocal);
        assert_eq!(config.zero_sum, ZeroSumPolicy::Skip);
        assert_eq!(config.fusion_engine().zero_sum, ZeroSumPolicy::Skip);
        assert_eq!(config.weights().get("color"), Some(&1.0));
    }

    #[test]
    fn test_full_config() {
        let config = RetrievalConfig::from_json(
            r#"{
                "signals": [
                    {"name": "texture", "table": "t.csv", "metric": "cosine", "weight": 0.7},
                    {"name": "color", "table": "c.csv", "metric": "manhattan", "weight": 0.3}
                ],
                "top_k": 5,
                "alignment": {"by_id": {"missing": {"default": 0.0}}},
                "transform": "identity",
                "zero_sum": "fail"
            }"#,
        )
        .unwrap();
        assert_eq!(config.signals[0].metric, DistanceMetric::Cosine);
        assert_eq!(
            config.alignment,
            Alignment::ById {
                missing: MissingSignal::Default(0.0)
            }
        );
        assert_eq!(config.fusion_engine().transform, FinalTransform::Identity);
        assert_eq!(config.fusion_engine().zero_sum, ZeroSumPolicy::Fail);
    }

    #[test]
    fn test_rejects_duplicates_and_empty() {
        assert!(RetrievalConfig::from_json(r#"{"signals": []}"#).is_err());
        let dup = r#"{"signals": [
            {"name": "a", "table": "x.csv", "metric": "cosine", "weight": 1.0},
            {"name": "a", "table": "y.csv", "metric": "cosine", "weight": 1.0}
        ]}"#;
        assert!(matches!(RetrievalConfig::from_json(dup), Err(StorageError::Config(_))));
    }

    #[test]
    fn test_load_resolves_relative_tables() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("query.json");
        std::fs::write(
            &path,
            r#"{"signals": [{"name": "c", "table": "c.csv", "metric": "cosine", "weight": 1.0}], "alignment": "positional"}"#,
        )?;
        let config = RetrievalConfig::load(&path)?;
        assert_eq!(config.signals[0].table, dir.path().join("c.csv"));
        assert_eq!(config.alignment, Alignment::Positional);
        Ok(())
    }
}
