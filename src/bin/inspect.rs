use clap::Parser;
use retrieval_engine::core::diagnostics::{Diagnostics, HealthStatus, TableSummary};
use retrieval_engine::FeatureTable;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Check a feature table and optionally export it as JSON", long_about = None)]
struct Args {
    table: PathBuf,

    /// Write health, summary and every row to this JSON file
    #[arg(short, long)]
    export: Option<PathBuf>,
}

#[derive(Serialize)]
struct TableExport<'a> {
    health: HealthStatus,
    summary: TableSummary,
    rows: Vec<RowExport<'a>>,
}

#[derive(Serialize)]
struct RowExport<'a> {
    id: &'a str,
    values: &'a [f32],
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let table = FeatureTable::load(&args.table)?;
    let health = Diagnostics::check_health(&table);
    let summary = Diagnostics::summarize(&table);

    println!("Table: {:?}", args.table);
    println!("Rows: {}", summary.rows);
    println!("Dimensions: {}", summary.dimension);
    println!("Range: [{}, {}], mean {:.6}", summary.min, summary.max, summary.mean);
    println!("Zero-norm rows: {}", summary.zero_norm_rows);
    match &health {
        HealthStatus::Healthy => println!("Health: OK"),
        HealthStatus::Corrupted(reason) => println!("Health: CORRUPTED ({})", reason),
        HealthStatus::Suspicious(reason) => println!("Health: SUSPICIOUS ({})", reason),
    }

    if let Some(path) = &args.export {
        let export = TableExport {
            health,
            summary,
            rows: table
                .vectors()
                .iter()
                .map(|v| RowExport {
                    id: v.id(),
                    values: v.values(),
                })
                .collect(),
        };
        let json = serde_json::to_string_pretty(&export)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        println!("Exported to {:?}", path);
    }
    Ok(())
}
