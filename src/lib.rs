//! Content-based image retrieval engine.
//!
//! Scores precomputed feature vectors (colour histograms, gradient-magnitude
//! histograms, deep embeddings) against a query, normalises and fuses several
//! rankings into one, and quantises image colours with k-means.

pub mod config;
pub mod core;
pub mod features;
pub mod simd;
pub mod storage;

pub use crate::core::error::EngineError;
pub use crate::core::fusion::{Alignment, FinalTransform, FusionEngine, FusionWeights, MissingSignal, ZeroSumPolicy};
pub use crate::core::kmeans::{ClusterEngine, ClusterOutcome, ClusterStatus};
pub use crate::core::metric::{DistanceMetric, Metric};
pub use crate::core::normalize::ScoreNormalizer;
pub use crate::core::ranking::RankingEngine;
pub use crate::core::vector::{Direction, FeatureVector, RankingResult, ScoredMatch};
pub use crate::storage::table::{FeatureTable, StorageError};
