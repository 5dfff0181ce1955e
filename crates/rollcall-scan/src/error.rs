//! Domain service errors

use thiserror::Error;

/// Failure reported by the domain service for one scan
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Unknown id: {0}")]
    UnknownId(String),

    #[error("Already recorded today: {0}")]
    AlreadyRecorded(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
