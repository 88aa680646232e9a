//! Centralized error types for the console.

use thiserror::Error;

/// Main error type for console operations.
#[derive(Error, Debug)]
pub enum MdcError {
    #[error("Call not found: {0}")]
    CallNotFound(String),

    #[error("Crew not found: {0}")]
    CrewNotFound(u32),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Test not found: {0}")]
    TestNotFound(String),

    #[error("Test assignment not found: {0}")]
    AssignmentNotFound(String),

    #[error("User already exists: {0}")]
    UserExists(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account awaiting approval: {0}")]
    PendingApproval(String),

    #[error("Invalid state transition: cannot move from '{from}' to '{to}'")]
    InvalidStateTransition { from: String, to: String },

    #[error("{0} is disabled by a system restriction")]
    Restricted(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Store error: {0}")]
    Store(#[from] mdc_store::StoreError),

    #[error("Sync error: {0}")]
    Sync(#[from] mdc_sync::SyncError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for console operations.
pub type MdcResult<T> = Result<T, MdcError>;

impl MdcError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::InvalidStateTransition {
            from: from.into(),
            to: to.into(),
        }
    }
}
