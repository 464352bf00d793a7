use clap::Parser;
use retrieval_engine::config::RetrievalConfig;
use retrieval_engine::core::runtime::RuntimeConfig;
use retrieval_engine::{Direction, DistanceMetric, FeatureTable, RankingEngine, RankingResult};
use std::path::PathBuf;
use std::time::Instant;

/// Rank a feature table against one of its images, or fuse several tables.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Id (filename) of the query image
    #[arg(short, long)]
    target: String,

    /// Single-signal mode: feature table to rank
    #[arg(long, conflicts_with = "config")]
    table: Option<PathBuf>,

    /// cosine, histogram_intersection or manhattan
    #[arg(short, long, default_value = "cosine")]
    metric: DistanceMetric,

    /// Fusion mode: JSON file listing signals and weights
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    k: Option<usize>,

    /// Print the ranking as JSON
    #[arg(long)]
    json: bool,

    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    RuntimeConfig::init_thread_pool(args.threads)?;

    let start = Instant::now();
    let mut reversed = false;
    let (ranking, shown) = match (&args.config, &args.table) {
        (Some(path), _) => {
            let config = RetrievalConfig::load(path)?;
            let fused = config.query(&args.target)?;
            let engine = config.fusion_engine();
            reversed = engine.transform.most_similar_last();
            if reversed && !args.json {
                println!("Reciprocal scores: smaller is more similar, listed best first");
            }
            let shown = engine.most_similar(&fused, args.k.unwrap_or(config.top_k));
            (fused, shown)
        }
        (None, Some(table)) => {
            let table = FeatureTable::load(table)?;
            let ranking = RankingEngine::new(args.metric)
                .top_k(args.k.unwrap_or(3))
                .rank_table(&args.target, &table)?;
            let shown = ranking.matches.clone();
            (ranking, shown)
        }
        (None, None) => return Err("either --table or --config is required".into()),
    };
    let elapsed = start.elapsed();

    if args.json {
        let direction = if reversed { Direction::SmallerIsSimilar } else { ranking.direction };
        let output = RankingResult {
            direction,
            matches: shown,
            ..ranking
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Target: {} ({}, {:.2?})", args.target, ranking.name, elapsed);
        for (i, m) in shown.iter().enumerate() {
            println!("{:>3}. {:<32} {:.6}", i + 1, m.id, m.score);
        }
    }
    Ok(())
}
