use clap::Parser;
use hdrhistogram::Histogram;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use retrieval_engine::core::runtime::RuntimeConfig;
use retrieval_engine::{DistanceMetric, FeatureTable, FeatureVector, RankingEngine};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about = "Ranking latency on a random feature table", long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 10_000)]
    num_vectors: usize,

    #[arg(short, long, default_value_t = 512)]
    dim: usize,

    #[arg(short, long, default_value_t = 200)]
    queries: usize,

    #[arg(short, long, default_value_t = 10)]
    k: usize,

    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    #[arg(short, long)]
    threads: Option<usize>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    RuntimeConfig::init_thread_pool(args.threads)?;

    println!(
        "=== Benchmark: N={}, Dim={}, Queries={}, kernel={} ===",
        args.num_vectors,
        args.dim,
        args.queries,
        retrieval_engine::simd::kernel_name()
    );

    println!("Generating data...");
    let mut rng = StdRng::seed_from_u64(args.seed);
    let vectors: Vec<FeatureVector> = (0..args.num_vectors)
        .map(|i| {
            let values: Vec<f32> = (0..args.dim).map(|_| rng.gen()).collect();
            FeatureVector::new(format!("img.{:05}.jpg", i), values)
        })
        .collect();
    let table = FeatureTable::from_vectors(vectors)?;

    for metric in DistanceMetric::ALL {
        let engine = RankingEngine::new(metric).top_k(args.k);
        let mut hist = Histogram::<u64>::new(3)?;

        let start = Instant::now();
        for _ in 0..args.queries {
            let target = &table.vectors()[rng.gen_range(0..table.len())];
            let query_start = Instant::now();
            engine.rank_table(target.id(), &table)?;
            hist.record(query_start.elapsed().as_micros() as u64)?;
        }
        let qps = args.queries as f64 / start.elapsed().as_secs_f64();

        println!(
            "{:<24} QPS: {:>8.1}  p50: {:>6}us  p95: {:>6}us  p99: {:>6}us  max: {:>6}us",
            metric.as_str(),
            qps,
            hist.value_at_quantile(0.50),
            hist.value_at_quantile(0.95),
            hist.value_at_quantile(0.99),
            hist.max()
        );
    }
    Ok(())
}
