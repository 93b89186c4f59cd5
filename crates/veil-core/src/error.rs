use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Resource error: {0}")]
    Resource(String),

    #[error("Slot {slot} not found: only {available} artifact(s) exist")]
    NotFound { slot: usize, available: usize },

    #[error("Precondition violated: {0}")]
    Precondition(String),

    #[error("Artifact for ordinal {ordinal} is owned but missing on disk")]
    MirrorDivergence { ordinal: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
