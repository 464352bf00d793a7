use crate::core::error::EngineError;
use crate::core::vector::{Direction, RankingResult, ScoredMatch};

/// Divide-by-maximum normalization.
///
/// Every raw score in a batch is divided by the batch maximum, which puts
/// heterogeneous metrics on a common `[0, 1]` scale before weighting. Scores
/// whose native direction is "smaller is similar" are inverted (`1 - s/max`)
/// so that the output convention is always "larger is similar".
pub struct ScoreNormalizer;

impl ScoreNormalizer {
    /// Normalizes `scores` in place order. Raw scores must be finite and
    /// non-negative; a zero maximum is `ZeroDivisor`.
    pub fn normalize(scores: &[f32], direction: Direction) -> Result<Vec<f32>, EngineError> {
        if scores.is_empty() {
            return Ok(Vec::new());
        }

        let mut max = 0.0f32;
        for (i, &s) in scores.iter().enumerate() {
            if !s.is_finite() || s < 0.0 {
                return Err(EngineError::InvalidParameter(format!(
                    "score {} at position {} is not a finite non-negative value",
                    s, i
                )));
            }
            max = max.max(s);
        }

        if max == 0.0 {
            return Err(EngineError::ZeroDivisor);
        }

        let normalized = scores
            .iter()
            .map(|&s| {
                let scaled = s / max;
                match direction {
                    Direction::LargerIsSimilar => scaled,
                    Direction::SmallerIsSimilar => 1.0 - scaled,
                }
            })
            .collect();
        Ok(normalized)
    }

    /// Normalizes a ranking, keeping every id at its position.
    pub fn normalize_ranking(ranking: &RankingResult) -> Result<RankingResult, EngineError> {
        if ranking.normalized {
            return Ok(ranking.clone());
        }

        let scores = Self::normalize(&ranking.scores(), ranking.direction)?;
        let matches = ranking
            .matches
            .iter()
            .zip(scores)
            .map(|(m, score)| ScoredMatch::new(m.id.clone(), score))
            .collect();
        Ok(RankingResult::normalized(ranking.name.clone(), matches))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_larger_is_similar() {
        let out = ScoreNormalizer::normalize(&[2.0, 4.0, 1.0], Direction::LargerIsSimilar).unwrap();
        assert_eq!(out, vec![0.5, 1.0, 0.25]);
    }

    #[test]
    fn test_normalize_inverts_distances() {
        let out = ScoreNormalizer::normalize(&[0.0, 2.0, 4.0], Direction::SmallerIsSimilar).unwrap();
        assert_eq!(out, vec![1.0, 0.5, 0.0]);
    }

    #[test]
    fn test_normalize_zero_divisor() {
        assert_eq!(
            ScoreNormalizer::normalize(&[0.0, 0.0], Direction::LargerIsSimilar),
            Err(EngineError::ZeroDivisor)
        );
    }

    #[test]
    fn test_normalize_rejects_negative_and_nan() {
        assert!(matches!(
            ScoreNormalizer::normalize(&[1.0, -0.5], Direction::SmallerIsSimilar),
            Err(EngineError::InvalidParameter(_))
        ));
        assert!(matches!(
            ScoreNormalizer::normalize(&[f32::NAN], Direction::SmallerIsSimilar),
            Err(EngineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_normalize_empty() {
        assert!(ScoreNormalizer::normalize(&[], Direction::LargerIsSimilar).unwrap().is_empty());
    }

    #[test]
    fn test_normalize_ranking_preserves_order() {
        let ranking = RankingResult::new(
            "cosine",
            Direction::SmallerIsSimilar,
            vec![
                ScoredMatch::new("a", 0.5),
                ScoredMatch::new("b", 1.0),
                ScoredMatch::new("c", 2.0),
            ],
        );
        let normalized = ScoreNormalizer::normalize_ranking(&ranking).unwrap();
        assert!(normalized.normalized);
        assert_eq!(normalized.direction, Direction::LargerIsSimilar);
        let ids: Vec<&str> = normalized.ids().collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(normalized.scores(), vec![0.75, 0.5, 0.0]);
    }
}
