//! # Orchestration Error Types
//!
//! Structured error handling for the orchestration engine using thiserror.
//!
//! Definition errors are surfaced before any execution and always as a
//! complete list, never one at a time. Execution errors are retried according
//! to policy and end up as FAILED unit results; they never escape `run()` as
//! an `Err`. Rollback failures are collected and logged, never re-raised.

use std::time::Duration;
use thiserror::Error;

/// A problem with the workflow definition itself. Fatal and local to
/// validation: when any of these exist, the run never starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("unit '{unit_id}' depends on unknown unit '{dependency}'")]
    UnknownDependency {
        unit_id: String,
        dependency: String,
    },

    #[error("cycle detected in dependencies for unit '{unit_id}'")]
    CycleDetected { unit_id: String },

    #[error("duplicate unit id '{unit_id}'")]
    DuplicateUnit { unit_id: String },

    #[error(
        "unit '{unit_id}' in phase {phase} depends on unit '{dependency}' in later phase {dependency_phase}"
    )]
    LaterPhaseDependency {
        unit_id: String,
        phase: String,
        dependency: String,
        dependency_phase: String,
    },

    #[error("unit '{unit_id}' has no registered handler")]
    UnregisteredUnit { unit_id: String },
}

impl DefinitionError {
    pub fn unknown_dependency(unit_id: impl Into<String>, dependency: impl Into<String>) -> Self {
        Self::UnknownDependency {
            unit_id: unit_id.into(),
            dependency: dependency.into(),
        }
    }

    pub fn cycle_detected(unit_id: impl Into<String>) -> Self {
        Self::CycleDetected {
            unit_id: unit_id.into(),
        }
    }

    pub fn duplicate_unit(unit_id: impl Into<String>) -> Self {
        Self::DuplicateUnit {
            unit_id: unit_id.into(),
        }
    }

    pub fn unregistered_unit(unit_id: impl Into<String>) -> Self {
        Self::UnregisteredUnit {
            unit_id: unit_id.into(),
        }
    }
}

/// A failure during one execution attempt of a unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("unit '{unit_id}' failed: {message}")]
    Failed { unit_id: String, message: String },

    #[error("unit '{unit_id}' timed out after {timeout_seconds}s")]
    Timeout {
        unit_id: String,
        timeout_seconds: u64,
    },

    #[error("unit '{unit_id}' panicked: {message}")]
    Panicked { unit_id: String, message: String },

    #[error("unit '{unit_id}' prerequisites not met: {issues}")]
    PrerequisitesNotMet { unit_id: String, issues: String },
}

impl ExecutionError {
    pub fn failed(unit_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            unit_id: unit_id.into(),
            message: message.into(),
        }
    }

    pub fn timeout(unit_id: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            unit_id: unit_id.into(),
            timeout_seconds: timeout.as_secs(),
        }
    }

    pub fn panicked(unit_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Panicked {
            unit_id: unit_id.into(),
            message: message.into(),
        }
    }

    pub fn prerequisites_not_met(unit_id: impl Into<String>, issues: &[String]) -> Self {
        Self::PrerequisitesNotMet {
            unit_id: unit_id.into(),
            issues: issues.join("; "),
        }
    }

    /// Whether this failure counts against the retry budget. All execution
    /// failures do, including timeouts.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::PrerequisitesNotMet { .. })
    }
}

/// A failure raised while rolling back one unit. Collected and logged by the
/// rollback coordinator; never stops the remaining rollbacks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rollback of unit '{unit_id}' failed: {message}")]
pub struct RollbackFailure {
    pub unit_id: String,
    pub message: String,
}

impl RollbackFailure {
    pub fn new(unit_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            unit_id: unit_id.into(),
            message: message.into(),
        }
    }
}
