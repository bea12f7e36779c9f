//! Crate error type.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid detection JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid image size {width}x{height}")]
    InvalidImageSize { width: u32, height: u32 },

    #[error("expected {expected} classifier scores, got {got}")]
    ScoreCount { expected: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
