use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MeltError>;

#[derive(Error, Debug)]
pub enum MeltError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: simd_json::Error,
    },

    #[error("invalid currency amount: {0:?}")]
    InvalidCurrency(String),

    #[error("invalid timestamp (expected Mon-DD-YY HH:MM:SS): {0:?}")]
    InvalidTimestamp(String),
}
