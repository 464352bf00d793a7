//! Property tests for the scoring, normalization, ranking, fusion and
//! clustering invariants.

use proptest::prelude::*;
use retrieval_engine::core::kmeans::{ClusterConfig, Seeding};
use retrieval_engine::core::metric::{cosine_distance, histogram_intersection, manhattan_distance};
use retrieval_engine::{
    Alignment, ClusterEngine, Direction, DistanceMetric, FeatureTable, FeatureVector, FinalTransform, FusionEngine,
    RankingEngine, RankingResult, ScoreNormalizer, ScoredMatch,
};
use std::f32::consts::PI;

fn vector_pair(max_len: usize) -> impl Strategy<Value = (Vec<f32>, Vec<f32>)> {
    (1..max_len).prop_flat_map(|len| {
        (
            prop::collection::vec(0.0f32..10.0, len),
            prop::collection::vec(0.0f32..10.0, len),
        )
    })
}

proptest! {
    #[test]
    fn cosine_is_symmetric_and_bounded((a, b) in vector_pair(64)) {
        prop_assume!(a.iter().any(|&x| x > 1e-3) && b.iter().any(|&x| x > 1e-3));
        let ab = cosine_distance(&a, &b).unwrap();
        let ba = cosine_distance(&b, &a).unwrap();
        prop_assert!((ab - ba).abs() < 1e-6);
        prop_assert!((0.0..=PI + 1e-6).contains(&ab));
    }

    #[test]
    fn cosine_self_distance_is_zero(a in prop::collection::vec(-10.0f32..10.0, 1..64)) {
        prop_assume!(a.iter().any(|&x| x.abs() > 1e-3));
        let d = cosine_distance(&a, &a).unwrap();
        prop_assert!(d.abs() < 1e-3, "self distance {}", d);
    }

    #[test]
    fn intersection_is_bounded_by_smaller_mass((a, b) in vector_pair(64)) {
        let s = histogram_intersection(&a, &b);
        let mass_a: f32 = a.iter().sum();
        let mass_b: f32 = b.iter().sum();
        prop_assert!(s >= 0.0);
        prop_assert!(s <= mass_a.min(mass_b) * (1.0 + 1e-5) + 1e-4);
        prop_assert!((s - histogram_intersection(&b, &a)).abs() < 1e-4);
    }

    #[test]
    fn manhattan_is_a_symmetric_distance((a, b) in vector_pair(64)) {
        prop_assert_eq!(manhattan_distance(&a, &a), 0.0);
        let ab = manhattan_distance(&a, &b);
        prop_assert!(ab >= 0.0);
        prop_assert!((ab - manhattan_distance(&b, &a)).abs() < 1e-4);
    }

    #[test]
    fn normalization_is_scale_invariant(
        scores in prop::collection::vec(0.0f32..100.0, 1..32),
        scale in 0.5f32..100.0,
    ) {
        prop_assume!(scores.iter().any(|&s| s > 0.01));
        let scaled: Vec<f32> = scores.iter().map(|s| s * scale).collect();
        for direction in [Direction::LargerIsSimilar, Direction::SmallerIsSimilar] {
            let base = ScoreNormalizer::normalize(&scores, direction).unwrap();
            let other = ScoreNormalizer::normalize(&scaled, direction).unwrap();
            prop_assert_eq!(base.len(), scores.len());
            for (x, y) in base.iter().zip(&other) {
                prop_assert!((0.0..=1.0).contains(x));
                prop_assert!((x - y).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn ranking_excludes_target_and_respects_k(
        rows in prop::collection::vec(prop::collection::vec(0.0f32..1.0, 4), 2..40),
        k in 1usize..50,
        target in any::<prop::sample::Index>(),
    ) {
        let vectors: Vec<FeatureVector> = rows
            .into_iter()
            .enumerate()
            .map(|(i, values)| FeatureVector::new(format!("img{}", i), values))
            .collect();
        let table = FeatureTable::from_vectors(vectors).unwrap();
        let target_id = table.vectors()[target.index(table.len())].id().to_string();

        let ranking = RankingEngine::new(DistanceMetric::Manhattan)
            .top_k(k)
            .rank_table(&target_id, &table)
            .unwrap();

        prop_assert_eq!(ranking.len(), k.min(table.len() - 1));
        prop_assert!(ranking.ids().all(|id| id != target_id));
        for pair in ranking.matches.windows(2) {
            prop_assert!(pair[0].score <= pair[1].score);
        }
    }

    #[test]
    fn positional_fusion_is_positive_and_descending(
        a in prop::collection::vec(0.01f32..1.0, 1..20),
        b in prop::collection::vec(0.01f32..1.0, 1..20),
        wa in 0.1f32..1.0,
        wb in 0.1f32..1.0,
    ) {
        let ranking = |name: &str, scores: &[f32]| {
            RankingResult::normalized(
                name,
                scores.iter().enumerate().map(|(i, &s)| ScoredMatch::new(format!("img{}", i), s)).collect(),
            )
        };
        let fused = FusionEngine::new(Alignment::Positional, FinalTransform::Reciprocal)
            .fuse(&[(ranking("a", &a), wa), (ranking("b", &b), wb)])
            .unwrap();

        prop_assert_eq!(fused.len(), a.len().min(b.len()));
        prop_assert!(fused.matches.iter().all(|m| m.score > 0.0 && m.score.is_finite()));
        for pair in fused.matches.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn cluster_labels_are_in_range(
        samples in prop::collection::vec(prop::array::uniform3(0.0f32..255.0), 1..60),
        k in 1usize..6,
        seed in any::<u64>(),
    ) {
        prop_assume!(k <= samples.len());
        let config = ClusterConfig {
            k,
            max_iterations: 15,
            seeding: Seeding::PlusPlus { seed },
            ..ClusterConfig::default()
        };
        let outcome = ClusterEngine::new(config).unwrap().cluster(&samples).unwrap();

        prop_assert_eq!(outcome.labels.len(), samples.len());
        prop_assert_eq!(outcome.k(), k);
        prop_assert!(outcome.labels.iter().all(|&l| l < k));
        prop_assert!(outcome.iterations <= 15);
    }
}
