//! Engine error types.
//!
//! Malformed products and out-of-range quantities are deliberately absent:
//! the cart treats them as logged no-ops or removals, never as failures.

use thiserror::Error;

use crate::config::ConfigError;
use crate::db::RepositoryError;
use crate::device::DeviceError;

/// Errors returned by catalog queries.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The request parameters are out of range.
    #[error("invalid query parameters: {0}")]
    InvalidParams(String),

    /// The backing store failed while executing the query.
    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

impl QueryError {
    /// Returns `true` if repeating the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(RepositoryError::Database(_)))
    }

    /// A message safe to show to the operator.
    ///
    /// Storage details are logged, not displayed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidParams(msg) => format!("Invalid search: {msg}"),
            Self::Storage(RepositoryError::Database(_)) => {
                "Products could not be loaded. Please try again.".to_string()
            }
            Self::Storage(RepositoryError::DataCorruption(_)) => {
                "The product catalog contains invalid data.".to_string()
            }
        }
    }
}

/// Umbrella error for binaries wiring the engine together.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    #[error("Device error: {0}")]
    Device(#[from] DeviceError),
}

/// Result type alias for `EngineError`.
pub type Result<T> = std::result::Result<T, EngineError>;
