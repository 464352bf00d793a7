use clap::Parser;
use rayon::prelude::*;
use retrieval_engine::core::runtime::RuntimeConfig;
use retrieval_engine::features::FeatureKind;
use retrieval_engine::storage::image_io::{is_image_path, load_image};
use retrieval_engine::{FeatureTable, FeatureVector};
use std::path::PathBuf;
use std::time::Instant;
use tracing::warn;

/// Extract one feature vector per image in a directory into a CSV table.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory of .jpg/.png images
    #[arg(short, long)]
    dir: PathBuf,

    /// baseline, rgb_histogram, multi_histogram, chromaticity, texture_color
    #[arg(short, long, default_value = "rgb_histogram")]
    kind: FeatureKind,

    #[arg(short, long, default_value = "features.csv")]
    output: PathBuf,

    #[arg(short, long)]
    threads: Option<usize>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    RuntimeConfig::init_thread_pool(args.threads)?;

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(&args.dir)? {
        let path = entry?.path();
        if path.is_file() && is_image_path(&path) {
            paths.push(path);
        }
    }
    println!("Extracting {} features from {} images in {:?}...", args.kind, paths.len(), args.dir);
    let start = Instant::now();

    let mut vectors: Vec<FeatureVector> = paths
        .par_iter()
        .filter_map(|path| {
            let id = path.file_name()?.to_string_lossy().into_owned();
            match load_image(path) {
                Ok(image) if !image.is_empty() => Some(FeatureVector::new(id, args.kind.extract(&image))),
                Ok(_) => {
                    warn!(image = %id, "Skipping empty image");
                    None
                }
                Err(e) => {
                    warn!(image = %id, error = %e, "Skipping unreadable image");
                    None
                }
            }
        })
        .collect();
    vectors.sort_by(|a, b| a.id().cmp(b.id()));

    let table = FeatureTable::from_vectors(vectors)?;
    table.save(&args.output, &args.kind.schema(table.dimension()))?;

    println!(
        "Wrote {} rows x {} columns to {:?} in {:.2?}",
        table.len(),
        table.dimension(),
        args.output,
        start.elapsed()
    );
    Ok(())
}
