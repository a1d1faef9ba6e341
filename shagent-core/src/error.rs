//! Error types for shagent-core.
//!
//! Unschedulable tasks are not errors: they are simply absent from the plan.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// Rejected before any scheduling or tracking happens.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failure reported by an injected store that is not IO/JSON shaped.
    #[error("store error: {0}")]
    Store(String),
}

impl CoreError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        CoreError::InvalidInput(msg.into())
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, CoreError::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
