//! # auction-melt
//!
//! Converts nested JSON exports of an online-auction dataset into flat,
//! pipe-delimited tables ready for a SQL bulk load.
//!
//! ## Modules
//!
//! - **normalize**: currency and timestamp normalization
//! - **melt**: item extraction, per-run dedup state and table writing
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use auction_melt::{melt_file, MeltConfig, MeltContext, TableWriter};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = MeltConfig::default();
//! let writer = TableWriter::new(&config)?;
//! let mut ctx = MeltContext::new();
//!
//! for path in ["items-0.json", "items-1.json"] {
//!     melt_file(path, &config, &writer, &mut ctx)?;
//! }
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

pub mod error;
pub mod melt;
pub mod normalize;

pub use error::MeltError;
pub use melt::{AuctionFile, AuctionMelter, MeltConfig, MeltContext, Table, TableBatch, TableWriter};

const JSON_SUFFIX: &str = ".json";

/// True if the path ends in `.json` and has something before the suffix
pub fn is_json_path(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref().to_string_lossy();
    path.len() > JSON_SUFFIX.len() && path.ends_with(JSON_SUFFIX)
}

/// Read and parse one export file
pub fn read_auction_file(path: impl AsRef<Path>) -> error::Result<AuctionFile> {
    let path = path.as_ref();
    let mut content = std::fs::read(path).map_err(|source| MeltError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    simd_json::serde::from_slice(&mut content).map_err(|source| MeltError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Main entry point: melt one export file and append its rows.
///
/// Returns `Ok(false)` without touching anything when the path is not a
/// `.json` file.
pub fn melt_file(
    path: impl AsRef<Path>,
    config: &MeltConfig,
    writer: &TableWriter,
    ctx: &mut MeltContext,
) -> Result<bool> {
    let path = path.as_ref();
    if !is_json_path(path) {
        debug!(path = %path.display(), "skipping non-JSON path");
        return Ok(false);
    }

    let file = read_auction_file(path)?;
    let melter = AuctionMelter::new(config.clone());
    let batch = melter
        .melt(ctx, &file.items)
        .with_context(|| format!("Failed to melt items from {}", path.display()))?;

    let written = writer
        .write_batch(ctx, &batch)
        .with_context(|| format!("Failed to write tables for {}", path.display()))?;

    info!(
        path = %path.display(),
        items = file.items.len(),
        lines = written,
        "melted file"
    );
    Ok(true)
}
