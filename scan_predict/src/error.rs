//! Error types for prediction.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PredictError>;

#[derive(Error, Debug)]
pub enum PredictError {
    /// Transport failure, including timeouts.
    #[error("remote prediction request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote prediction returned HTTP {0}")]
    Status(u16),

    #[error("remote prediction reply malformed: {0}")]
    Malformed(String),

    #[error(transparent)]
    Store(#[from] scan_ngram::StoreError),

    #[error("prediction worker could not start: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("prediction worker has stopped")]
    WorkerClosed,
}
