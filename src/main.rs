use retrieval_engine::core::kmeans::ClusterConfig;
use retrieval_engine::{
    ClusterEngine, DistanceMetric, FeatureTable, FeatureVector, FusionEngine, FusionWeights, RankingEngine,
    ScoreNormalizer, ZeroSumPolicy,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    println!("=== Retrieval Engine Demo ===");

    // 1. Two signals over the same four images
    println!("\n[1] Building in-memory feature tables...");
    let texture = FeatureTable::from_vectors(vec![
        FeatureVector::new("pic.0001.jpg", vec![0.9, 0.1, 0.0, 0.0]),
        FeatureVector::new("pic.0002.jpg", vec![0.8, 0.2, 0.1, 0.0]),
        FeatureVector::new("pic.0003.jpg", vec![0.0, 0.1, 0.9, 0.4]),
        FeatureVector::new("pic.0004.jpg", vec![0.1, 0.0, 0.3, 0.9]),
    ])?;
    let color = FeatureTable::from_vectors(vec![
        FeatureVector::new("pic.0001.jpg", vec![0.5, 0.3, 0.2]),
        FeatureVector::new("pic.0002.jpg", vec![0.1, 0.1, 0.8]),
        FeatureVector::new("pic.0003.jpg", vec![0.4, 0.4, 0.2]),
        FeatureVector::new("pic.0004.jpg", vec![0.2, 0.2, 0.6]),
    ])?;
    println!("    texture: {} x {}, color: {} x {}", texture.len(), texture.dimension(), color.len(), color.dimension());

    // 2. Rank each signal against the query image
    let target = "pic.0001.jpg";
    println!("\n[2] Ranking against {}...", target);
    let by_texture = RankingEngine::new(DistanceMetric::Cosine).rank_table(target, &texture)?;
    let by_color = RankingEngine::new(DistanceMetric::HistogramIntersection).rank_table(target, &color)?;
    for ranking in [&by_texture, &by_color] {
        println!("    {}:", ranking.name);
        for m in &ranking.matches {
            println!("    - {} {:.4}", m.id, m.score);
        }
    }

    // 3. Normalize and fuse
    println!("\n[3] Fusing (texture 0.7, color 0.3)...");
    let mut weights = FusionWeights::new();
    weights.insert(by_texture.name.clone(), 0.7);
    weights.insert(by_color.name.clone(), 0.3);
    let normalized = [
        ScoreNormalizer::normalize_ranking(&by_texture)?,
        ScoreNormalizer::normalize_ranking(&by_color)?,
    ];
    let engine = FusionEngine::default().zero_sum(ZeroSumPolicy::Skip);
    let fused = engine.fuse_weighted(&normalized, &weights)?;
    for m in &engine.most_similar(&fused, fused.len()) {
        println!("    - {} {:.4}", m.id, m.score);
    }

    // 4. Cluster a handful of colours
    println!("\n[4] Clustering colours (k=2)...");
    let samples = [
        [250.0, 10.0, 10.0],
        [240.0, 20.0, 15.0],
        [10.0, 10.0, 250.0],
        [20.0, 15.0, 240.0],
        [245.0, 5.0, 20.0],
    ];
    let config = ClusterConfig {
        k: 2,
        ..ClusterConfig::default()
    };
    let outcome = ClusterEngine::new(config)?.cluster(&samples)?;
    println!("    {:?} after {} iterations", outcome.status, outcome.iterations);
    for (i, cluster) in outcome.clusters().iter().enumerate() {
        println!("    - cluster {}: centroid {:?}, members {:?}", i, cluster.centroid, cluster.members);
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
