//! # Unit Executor
//!
//! Runs a single unit through its lifecycle: conditional gate, prerequisite
//! validation, then the retry loop. Each attempt is bounded by the unit's
//! timeout; on expiry the attempt future is dropped, which cancels the unit at
//! its next await point. Panics from non-conforming handlers are caught and
//! converted to failed attempts.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use crate::config::ConductorConfig;
use crate::orchestration::backoff::BackoffPolicy;
use crate::orchestration::errors::ExecutionError;
use crate::orchestration::types::{
    UnitDeclaration, UnitHandler, UnitResult, UnitStatus, WorkflowState,
};

/// Executes one unit at a time, enforcing timeout and retry policy.
pub struct UnitExecutor {
    config: ConductorConfig,
    backoff: BackoffPolicy,
}

impl UnitExecutor {
    pub fn new(config: ConductorConfig) -> Self {
        let backoff = BackoffPolicy::new(&config.backoff);
        Self { config, backoff }
    }

    /// Run a unit's gate, prerequisite check, and retry loop, producing its
    /// final result. Dependency gating happens in the coordinator before this
    /// is called.
    #[instrument(skip(self, handler, state), fields(unit_id = %declaration.id))]
    pub async fn execute_unit(
        &self,
        handler: &Arc<dyn UnitHandler>,
        declaration: &UnitDeclaration,
        state: &mut WorkflowState,
    ) -> UnitResult {
        let unit_id = &declaration.id;

        if !handler.should_run(state).await {
            debug!(unit_id = %unit_id, "conditional gate closed, skipping");
            return UnitResult::skipped(unit_id, "should_run returned false");
        }

        let check = handler.validate_prerequisites(state).await;
        if !check.satisfied {
            let error = ExecutionError::prerequisites_not_met(unit_id, &check.issues);
            warn!(unit_id = %unit_id, issues = ?check.issues, "prerequisite validation failed");
            return UnitResult::failed(unit_id, error, 0, 0);
        }

        state
            .unit_statuses
            .insert(unit_id.clone(), UnitStatus::Running);
        self.execute_with_retry(handler, declaration, state).await
    }

    async fn execute_with_retry(
        &self,
        handler: &Arc<dyn UnitHandler>,
        declaration: &UnitDeclaration,
        state: &mut WorkflowState,
    ) -> UnitResult {
        let unit_id = &declaration.id;
        let max_attempts = declaration.effective_attempts();
        let attempt_timeout = self.config.effective_timeout(declaration.timeout_seconds);
        let started = Instant::now();

        let mut last_error = ExecutionError::failed(unit_id, "no attempts were made");

        for attempt in 1..=max_attempts {
            let delay = self.backoff.delay_for_attempt(attempt);
            if !delay.is_zero() {
                debug!(unit_id = %unit_id, attempt, delay_ms = delay.as_millis() as u64, "waiting before retry");
                tokio::time::sleep(delay).await;
            }

            debug!(unit_id = %unit_id, attempt, max_attempts, "starting attempt");

            let attempt_future = AssertUnwindSafe(handler.execute(state)).catch_unwind();
            last_error = match timeout(attempt_timeout, attempt_future).await {
                Err(_elapsed) => ExecutionError::timeout(unit_id, attempt_timeout),
                Ok(Err(panic)) => ExecutionError::panicked(unit_id, panic_message(&panic)),
                Ok(Ok(Err(error))) => error,
                Ok(Ok(Ok(output))) => {
                    let duration_ms = started.elapsed().as_millis() as u64;
                    debug!(unit_id = %unit_id, attempt, duration_ms, "unit succeeded");
                    return UnitResult::success(unit_id, output, attempt, duration_ms);
                }
            };

            warn!(
                unit_id = %unit_id,
                attempt,
                max_attempts,
                error = %last_error,
                "attempt failed"
            );

            if !last_error.is_retryable() {
                let duration_ms = started.elapsed().as_millis() as u64;
                return UnitResult::failed(unit_id, last_error, attempt, duration_ms);
            }
        }

        let duration_ms = started.elapsed().as_millis() as u64;
        UnitResult::failed(unit_id, last_error, max_attempts, duration_ms)
    }
}

/// Best-effort extraction of a panic payload message.
pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
