//! Error types for the pool manager

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoolError {
    #[error("No pool named '{0}' exists - check spelling and capitalization")]
    PoolNotFound(String),

    #[error("A pool named '{0}' is already registered")]
    DuplicatePoolName(String),

    #[error("Invalid spec for pool '{name}': {reason}")]
    InvalidPoolSpec { name: String, reason: String },

    #[error("Every object in pool '{0}' is still active")]
    PoolExhausted(String),

    #[error("No tokio runtime is available to schedule deactivations")]
    NoRuntime,

    #[error("Failed to load pool specs: {0}")]
    Config(String),
}

pub type PoolResult<T> = Result<T, PoolError>;
