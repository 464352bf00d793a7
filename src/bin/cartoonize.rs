use clap::Parser;
use retrieval_engine::config::ClusterConfig;
use retrieval_engine::core::kmeans::Seeding;
use retrieval_engine::core::quantization::Cartoonizer;
use retrieval_engine::core::runtime::RuntimeConfig;
use retrieval_engine::storage::image_io::{load_image, save_image};
use std::path::PathBuf;
use std::time::Instant;

/// Reduce an image to `k` colours with k-means.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    input: PathBuf,

    #[arg(short, long)]
    output: PathBuf,

    #[arg(short, long, default_value_t = 7)]
    k: usize,

    #[arg(short, long, default_value_t = 10)]
    max_iterations: usize,

    #[arg(short, long, default_value_t = 0.0)]
    stop_threshold: f32,

    /// Seed for k-means++ initialisation; first distinct colours otherwise
    #[arg(long)]
    seed: Option<u64>,

    /// Only quantise this window, given as x,y,width,height
    #[arg(long, value_delimiter = ',')]
    region: Option<Vec<usize>>,

    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    RuntimeConfig::init_thread_pool(args.threads)?;

    let config = ClusterConfig {
        k: args.k,
        max_iterations: args.max_iterations,
        stop_threshold: args.stop_threshold,
        seeding: args.seed.map_or(Seeding::FirstDistinct, |seed| Seeding::PlusPlus { seed }),
        ..ClusterConfig::default()
    };
    let cartoonizer = Cartoonizer::new(config)?;

    let image = load_image(&args.input)?;
    let start = Instant::now();
    let result = match args.region.as_deref() {
        Some(&[x, y, w, h]) => cartoonizer.quantize_region(&image, x, y, w, h)?,
        Some(_) => return Err("--region takes x,y,width,height".into()),
        None => cartoonizer.quantize(&image)?,
    };

    println!(
        "{}x{} image, k={}: {:?} after {} iterations (movement {:.4}) in {:.2?}",
        image.width(),
        image.height(),
        result.outcome.k(),
        result.outcome.status,
        result.outcome.iterations,
        result.outcome.movement,
        start.elapsed()
    );
    for (i, colour) in result.palette().iter().enumerate() {
        println!("  {}: rgb({}, {}, {})", i, colour[0], colour[1], colour[2]);
    }

    save_image(&args.output, &result.image)?;
    println!("Wrote {:?}", args.output);
    Ok(())
}
