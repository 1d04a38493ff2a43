//! # Engine Configuration
//!
//! Explicit, validated configuration for the orchestration engine. Defaults
//! are compiled in; environment variables with the `CONDUCTOR_` prefix
//! override individual fields (e.g. `CONDUCTOR_EXECUTION__DEFAULT_TIMEOUT_SECONDS=60`).
//!
//! Workflow definitions themselves are not loaded here; they arrive through
//! the orchestrator API. This module only configures engine behavior: timeout
//! bounds and retry backoff.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ConductorError, Result};

/// Root engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConductorConfig {
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub backoff: BackoffConfig,
}

/// Execution timeout bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Applied when a declaration leaves `timeout_seconds` at zero.
    pub default_timeout_seconds: u64,
    /// Hard ceiling for any single attempt.
    pub max_timeout_seconds: u64,
}

/// Retry backoff parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackoffConfig {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
    pub jitter: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            default_timeout_seconds: 300,
            max_timeout_seconds: 3600,
        }
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 1000,
            max_delay_ms: 30000,
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl Default for ConductorConfig {
    fn default() -> Self {
        Self {
            execution: ExecutionConfig::default(),
            backoff: BackoffConfig::default(),
        }
    }
}

impl ConductorConfig {
    /// Configuration for deterministic tests: no backoff waits, short
    /// timeouts.
    pub fn for_testing() -> Self {
        Self {
            execution: ExecutionConfig {
                default_timeout_seconds: 2,
                max_timeout_seconds: 5,
            },
            backoff: BackoffConfig {
                base_delay_ms: 0,
                max_delay_ms: 0,
                multiplier: 1.0,
                jitter: false,
            },
        }
    }

    /// Load defaults layered with `CONDUCTOR_*` environment overrides.
    pub fn from_env() -> Result<Self> {
        let defaults = config::Config::try_from(&Self::default())
            .map_err(|e| ConductorError::configuration(e.to_string()))?;

        config::Config::builder()
            .add_source(defaults)
            .add_source(
                config::Environment::with_prefix("CONDUCTOR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|e| ConductorError::configuration(e.to_string()))
    }

    /// Effective per-attempt timeout for a declared value, clamped to the
    /// configured ceiling.
    pub fn effective_timeout(&self, declared_seconds: u64) -> Duration {
        let seconds = if declared_seconds == 0 {
            self.execution.default_timeout_seconds
        } else {
            declared_seconds.min(self.execution.max_timeout_seconds)
        };
        Duration::from_secs(seconds)
    }
}
