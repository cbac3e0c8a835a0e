//! Error types for fanout-rs.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("concurrency cap must be at least 1, got {0}")]
    InvalidCapacity(usize),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("worker panicked: {0}")]
    WorkerPanicked(#[from] tokio::task::JoinError),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
