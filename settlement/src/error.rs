//! Error types for settlement engine

use crate::{money::Money, types::MemberId};
use thiserror::Error;

/// Result type for settlement operations
pub type Result<T> = std::result::Result<T, Error>;

/// Settlement errors
#[derive(Error, Debug)]
pub enum Error {
    /// Balances do not sum to zero within tolerance
    #[error("Unbalanced input: balances sum to {imbalance}")]
    UnbalancedInput {
        /// Signed sum of all member balances
        imbalance: Money,
    },

    /// Same member listed twice in one group
    #[error("Duplicate member: {0}")]
    DuplicateMember(MemberId),

    /// Amount cannot be represented in minor units
    #[error("Amount out of range: {0}")]
    AmountOutOfRange(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Metrics registry error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
