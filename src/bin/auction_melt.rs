//! auction-melt: Convert auction JSON exports into pipe-delimited tables
//!
//! Usage:
//!   # Append rows from every export to ./itemTable.dat, ./bids.dat, ...
//!   auction-melt ebay_data/items-*.json
//!
//!   # Write the tables somewhere else
//!   auction-melt --output-dir ./load items-0.json items-1.json
//!
//! Paths that do not end in `.json` are skipped.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::Result;
use auction_melt::{melt_file, MeltConfig, MeltContext, TableWriter};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "auction-melt")]
#[command(about = "Convert auction JSON exports into pipe-delimited tables", long_about = None)]
struct Args {
    /// Export files to process, in order
    #[arg(value_name = "FILE", required = true, num_args = 1..)]
    inputs: Vec<PathBuf>,

    /// Directory for the .dat table files
    #[arg(long, short = 'o', default_value = ".")]
    output_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = MeltConfig {
        output_dir: args.output_dir,
        ..MeltConfig::default()
    };
    let writer = TableWriter::new(&config)?;
    let mut ctx = MeltContext::new();

    for input in &args.inputs {
        if melt_file(input, &config, &writer, &mut ctx)? {
            println!("Success parsing {}", input.display());
        }
    }

    Ok(())
}
