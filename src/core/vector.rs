use crate::core::error::EngineError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A named, immutable feature vector. The id is the collection key
/// (typically the image filename).
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    id: String,
    values: Vec<f32>,
}

impl FeatureVector {
    pub fn new(id: impl Into<String>, values: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            values,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }
}

/// Fails with `DimensionMismatch` unless both slices have the same length.
pub(crate) fn check_dimensions(a: &[f32], b: &[f32]) -> Result<(), EngineError> {
    if a.len() != b.len() {
        return Err(EngineError::DimensionMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }
    Ok(())
}

/// Which end of a metric's range means "more similar".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Distances: 0 is identical.
    SmallerIsSimilar,
    /// Similarities and normalized scores.
    LargerIsSimilar,
}

impl Direction {
    /// Orders two scores so that the more similar one comes first.
    pub fn compare(self, a: f32, b: f32) -> Ordering {
        let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        match self {
            Direction::SmallerIsSimilar => ord,
            Direction::LargerIsSimilar => ord.reverse(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatch {
    pub id: String,
    pub score: f32,
}

impl ScoredMatch {
    pub fn new(id: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            score,
        }
    }
}

/// An ordered list of matches produced by one metric (or by fusion).
///
/// `direction` records how `matches` is sorted. Once `normalized` is set the
/// scores lie in `[0, 1]` and larger always means more similar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResult {
    pub name: String,
    pub direction: Direction,
    pub normalized: bool,
    pub matches: Vec<ScoredMatch>,
}

impl RankingResult {
    pub fn new(name: impl Into<String>, direction: Direction, matches: Vec<ScoredMatch>) -> Self {
        Self {
            name: name.into(),
            direction,
            normalized: false,
            matches,
        }
    }

    /// Builds an already-normalized ranking (scores in `[0, 1]`, larger = more similar).
    pub fn normalized(name: impl Into<String>, matches: Vec<ScoredMatch>) -> Self {
        Self {
            name: name.into(),
            direction: Direction::LargerIsSimilar,
            normalized: true,
            matches,
        }
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.matches.iter().map(|m| m.id.as_str())
    }

    pub fn scores(&self) -> Vec<f32> {
        self.matches.iter().map(|m| m.score).collect()
    }

    /// Keeps the first `k` entries.
    pub fn truncate(&mut self, k: usize) {
        self.matches.truncate(k);
    }

    /// Stable sort by `direction`; ties keep insertion order.
    pub(crate) fn sort(&mut self) {
        let direction = self.direction;
        self.matches
            .sort_by(|a, b| direction.compare(a.score, b.score));
    }
}
