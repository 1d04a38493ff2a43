//! # Rollback Coordinator
//!
//! Unwinds successfully completed units after an aborting failure. Rollback is
//! best-effort and total-coverage over fail-fast: every completed unit gets
//! its `rollback` called in strict reverse completion order, and individual
//! failures (errors or panics) are collected and logged without stopping the
//! remaining rollbacks.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{info, warn};

use crate::orchestration::errors::RollbackFailure;
use crate::orchestration::executor::panic_message;
use crate::orchestration::types::WorkflowState;
use crate::registry::UnitRegistry;

/// Coordinates reverse-order rollback of completed units.
pub struct RollbackCoordinator {
    registry: Arc<UnitRegistry>,
}

impl RollbackCoordinator {
    pub fn new(registry: Arc<UnitRegistry>) -> Self {
        Self { registry }
    }

    /// Roll back `completed_order` (chronological completion order) in
    /// reverse. Returns every failure encountered, for auditing; the list is
    /// empty when all rollbacks succeeded.
    pub async fn unwind(
        &self,
        state: &mut WorkflowState,
        completed_order: &[String],
    ) -> Vec<RollbackFailure> {
        let mut failures = Vec::new();

        info!(
            workflow_id = %state.workflow_id,
            units = completed_order.len(),
            "rolling back completed units in reverse order"
        );

        for unit_id in completed_order.iter().rev() {
            let Some(handler) = self.registry.get(unit_id) else {
                // Registry mutation mid-run is a programmer error; record it
                // rather than halting the unwind.
                failures.push(RollbackFailure::new(unit_id, "handler no longer registered"));
                continue;
            };

            let rollback_future = AssertUnwindSafe(handler.rollback(state)).catch_unwind();
            match rollback_future.await {
                Ok(Ok(())) => {
                    info!(unit_id = %unit_id, "rollback complete");
                }
                Ok(Err(error)) => {
                    warn!(unit_id = %unit_id, error = %error, "rollback failed, continuing");
                    failures.push(RollbackFailure::new(unit_id, error.to_string()));
                }
                Err(panic) => {
                    let message = panic_message(&panic);
                    warn!(unit_id = %unit_id, panic = %message, "rollback panicked, continuing");
                    failures.push(RollbackFailure::new(unit_id, format!("panicked: {message}")));
                }
            }
        }

        failures
    }
}
