//! Top-level error type for programmer-error surfaces (configuration,
//! checkpoint I/O). Workflow-level failures never appear here; they are
//! reported as data inside `ExecutionReport`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConductorError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("checkpoint error: {0}")]
    Checkpoint(String),
}

impl ConductorError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn checkpoint(message: impl Into<String>) -> Self {
        Self::Checkpoint(message.into())
    }
}

pub type Result<T> = std::result::Result<T, ConductorError>;
