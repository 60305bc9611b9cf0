//! Errors raised at the edges of the transcript pipeline.
//!
//! Parsing and grouping never fail; only reading input, writing output and
//! loading settings can.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("failed to read {path}: {source}", path = path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}", path = path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid message JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("message {index} is older than the message before it")]
    OutOfOrder { index: usize },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("transcript writer has shut down")]
    WriterClosed,
}

pub type Result<T> = std::result::Result<T, TranscriptError>;
