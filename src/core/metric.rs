use crate::core::error::EngineError;
use crate::core::vector::{check_dimensions, Direction, FeatureVector};
use crate::simd::{get_dot_product, get_histogram_intersection, get_manhattan_distance};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A pairwise scoring function over equal-length vectors.
///
/// Implementations declare which end of their range is "more similar" so the
/// normalizer can orient every metric the same way before fusion.
pub trait Metric: Send + Sync {
    fn name(&self) -> &str;

    fn direction(&self) -> Direction;

    fn score(&self, a: &[f32], b: &[f32]) -> Result<f32, EngineError>;

    fn distance(&self, a: &FeatureVector, b: &FeatureVector) -> Result<f32, EngineError> {
        self.score(a.values(), b.values())
    }
}

/// The built-in metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// `acos(a·b / (|a||b|))` in `[0, π]`.
    Cosine,
    /// `Σ min(a_i, b_i)`.
    HistogramIntersection,
    /// `Σ |a_i - b_i|`.
    Manhattan,
}

impl DistanceMetric {
    pub const ALL: [DistanceMetric; 3] = [
        DistanceMetric::Cosine,
        DistanceMetric::HistogramIntersection,
        DistanceMetric::Manhattan,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::HistogramIntersection => "histogram_intersection",
            DistanceMetric::Manhattan => "manhattan",
        }
    }
}

impl Metric for DistanceMetric {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn direction(&self) -> Direction {
        match self {
            DistanceMetric::Cosine | DistanceMetric::Manhattan => Direction::SmallerIsSimilar,
            DistanceMetric::HistogramIntersection => Direction::LargerIsSimilar,
        }
    }

    fn score(&self, a: &[f32], b: &[f32]) -> Result<f32, EngineError> {
        check_dimensions(a, b)?;
        match self {
            DistanceMetric::Cosine => cosine_distance(a, b),
            DistanceMetric::HistogramIntersection => Ok(histogram_intersection(a, b)),
            DistanceMetric::Manhattan => Ok(manhattan_distance(a, b)),
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceMetric {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "cosine" => Ok(DistanceMetric::Cosine),
            "histogram_intersection" | "intersection" => Ok(DistanceMetric::HistogramIntersection),
            "manhattan" | "l1" => Ok(DistanceMetric::Manhattan),
            other => Err(EngineError::InvalidParameter(format!("unknown metric '{}'", other))),
        }
    }
}

/// Angle between two vectors. A zero-norm input has no angle and yields
/// `DegenerateVector`.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> Result<f32, EngineError> {
    check_dimensions(a, b)?;
    let dot_func = get_dot_product();
    let (dot, norm_a_sq, norm_b_sq) = unsafe { (dot_func(a, b), dot_func(a, a), dot_func(b, b)) };

    if norm_a_sq == 0.0 || norm_b_sq == 0.0 {
        return Err(EngineError::DegenerateVector);
    }

    // f64 keeps acos stable near 1.0; the clamp absorbs rounding past ±1.
    let cos = dot as f64 / (norm_a_sq as f64 * norm_b_sq as f64).sqrt();
    Ok(cos.clamp(-1.0, 1.0).acos() as f32)
}

pub fn histogram_intersection(a: &[f32], b: &[f32]) -> f32 {
    let func = get_histogram_intersection();
    unsafe { func(a, b) }
}

pub fn manhattan_distance(a: &[f32], b: &[f32]) -> f32 {
    let func = get_manhattan_distance();
    unsafe { func(a, b) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_cosine_identical() {
        let a = FeatureVector::new("a", vec![1.0, 2.0, 3.0]);
        let b = FeatureVector::new("b", vec![1.0, 2.0, 3.0]);
        let d = DistanceMetric::Cosine.distance(&a, &b).unwrap();
        assert!(d.abs() < 1e-4, "expected ~0, got {}", d);
    }

    #[test]
    fn test_cosine_orthogonal_and_opposite() {
        let d = cosine_distance(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!((d - FRAC_PI_2).abs() < 1e-6);
        let d = cosine_distance(&[1.0, 0.0], &[-2.0, 0.0]).unwrap();
        assert!((d - PI).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_norm() {
        assert_eq!(
            cosine_distance(&[0.0, 0.0, 0.0], &[1.0, 2.0, 3.0]),
            Err(EngineError::DegenerateVector)
        );
    }

    #[test]
    fn test_histogram_intersection_scenario() {
        let h1 = [2.0, 0.0, 4.0];
        let h2 = [1.0, 3.0, 2.0];
        let s = DistanceMetric::HistogramIntersection.score(&h1, &h2).unwrap();
        assert_eq!(s, 3.0);
    }

    #[test]
    fn test_manhattan() {
        let s = DistanceMetric::Manhattan.score(&[1.0, 5.0, -2.0], &[2.0, 3.0, 2.0]).unwrap();
        assert_eq!(s, 7.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        for metric in DistanceMetric::ALL {
            assert_eq!(
                metric.score(&[1.0, 2.0], &[1.0]),
                Err(EngineError::DimensionMismatch { expected: 2, found: 1 })
            );
        }
    }

    #[test]
    fn test_directions() {
        assert_eq!(DistanceMetric::Cosine.direction(), Direction::SmallerIsSimilar);
        assert_eq!(DistanceMetric::Manhattan.direction(), Direction::SmallerIsSimilar);
        assert_eq!(
            DistanceMetric::HistogramIntersection.direction(),
            Direction::LargerIsSimilar
        );
    }

    #[test]
    fn test_parse_metric() {
        assert_eq!("cosine".parse::<DistanceMetric>().unwrap(), DistanceMetric::Cosine);
        assert_eq!("L1".parse::<DistanceMetric>().unwrap(), DistanceMetric::Manhattan);
        assert_eq!(
            "histogram-intersection".parse::<DistanceMetric>().unwrap(),
            DistanceMetric::HistogramIntersection
        );
        assert!("chebyshev".parse::<DistanceMetric>().is_err());
    }
}
