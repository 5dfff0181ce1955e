//! Error types for key parsing

use thiserror::Error;

/// Errors raised while parsing key names and priorities from configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid key syntax: {0}")]
    InvalidKeySyntax(String),

    #[error("Invalid modifier: {0}")]
    InvalidModifier(String),

    #[error("Invalid announcement priority: {0}")]
    InvalidPriority(String),
}
