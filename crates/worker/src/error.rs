use std::path::PathBuf;

use formcheck_core::error::CoreError;

/// Errors raised by the batch worker.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Analysis task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Cancelled before analysis started")]
    Cancelled,
}
