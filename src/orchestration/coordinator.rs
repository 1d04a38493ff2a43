//! # Workflow Coordinator
//!
//! Drives one run end to end: validates the dependency graph, computes the
//! plan, walks it sequentially with dependency gating, aborts on required
//! failures, unwinds completed units, and assembles the final report.
//!
//! Units execute strictly one at a time in plan order. The graph encodes all
//! required orderings, so independent branches could be parallelized, but the
//! reference behavior is sequential and tests rely on it.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::config::ConductorConfig;
use crate::orchestration::checkpoint::Checkpoint;
use crate::orchestration::executor::UnitExecutor;
use crate::orchestration::graph::DependencyGraph;
use crate::orchestration::report::{ExecutionReport, ReportBuilder};
use crate::orchestration::rollback::RollbackCoordinator;
use crate::orchestration::scheduler::ExecutionPlan;
use crate::orchestration::types::{UnitResult, UnitStatus, WorkflowState};
use crate::registry::UnitRegistry;

/// Options narrowing one run: a unit subset and/or a resume checkpoint.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RunOptions<'a> {
    pub selected: Option<&'a [String]>,
    pub checkpoint: Option<&'a Checkpoint>,
}

/// Sequential run loop over a computed plan.
pub struct WorkflowCoordinator {
    registry: Arc<UnitRegistry>,
    executor: UnitExecutor,
}

impl WorkflowCoordinator {
    pub fn new(registry: Arc<UnitRegistry>, config: ConductorConfig) -> Self {
        let executor = UnitExecutor::new(config);
        Self { registry, executor }
    }

    #[instrument(skip(self, context_seed, options), fields(workflow_id = %workflow_id))]
    pub(crate) async fn run(
        &self,
        workflow_id: &str,
        context_seed: std::collections::HashMap<String, serde_json::Value>,
        options: RunOptions<'_>,
    ) -> ExecutionReport {
        let run_started = Instant::now();

        let declarations = self.registry.declarations();
        let graph = match DependencyGraph::build(&declarations) {
            Ok(graph) => graph,
            Err(errors) => {
                warn!(
                    workflow_id = %workflow_id,
                    error_count = errors.len(),
                    "workflow definition rejected, nothing executed"
                );
                return ReportBuilder::rejected(&errors, run_started.elapsed());
            }
        };

        let plan = match options.selected {
            Some(ids) => {
                for id in ids.iter().filter(|id| !graph.contains(id)) {
                    warn!(unit_id = %id, "selected unit is not part of the workflow, ignoring");
                }
                ExecutionPlan::compute(&graph).restricted_to(ids)
            }
            None => ExecutionPlan::compute(&graph),
        };
        let selected_set: Option<HashSet<&String>> =
            options.selected.map(|ids| ids.iter().collect());

        info!(
            workflow_id = %workflow_id,
            units = plan.len(),
            resumed = options.checkpoint.is_some(),
            "starting workflow run"
        );

        let mut state = WorkflowState::new(workflow_id, context_seed);
        state.start_time = Some(Utc::now());
        for unit_id in plan.order() {
            state.unit_statuses.insert(unit_id.clone(), UnitStatus::Pending);
        }
        if let Some(checkpoint) = options.checkpoint {
            if checkpoint.workflow_id != workflow_id {
                warn!(
                    workflow_id = %workflow_id,
                    checkpoint_workflow_id = %checkpoint.workflow_id,
                    "checkpoint belongs to a different workflow, ignoring it"
                );
            } else {
                for unit_id in plan.order() {
                    if checkpoint.is_satisfied(unit_id) {
                        state
                            .unit_statuses
                            .insert(unit_id.clone(), UnitStatus::Success);
                    }
                }
            }
        }

        let mut builder = ReportBuilder::new(plan.len());
        // Completion order of this run only; units satisfied by a checkpoint
        // belong to a previous run and are not unwound here.
        let mut completed_order: Vec<String> = Vec::new();

        for (position, unit_id) in plan.order().iter().enumerate() {
            if state.status_of(unit_id) == UnitStatus::Success {
                debug!(unit_id = %unit_id, "already satisfied by checkpoint, not re-executing");
                continue;
            }

            let Some(declaration) = graph.declaration(unit_id) else {
                continue;
            };
            let Some(handler) = self.registry.get(unit_id) else {
                continue;
            };

            // Dependency gating. Dependencies outside an explicit selection
            // are treated as satisfied: the caller narrowed scope on purpose.
            let unsatisfied = declaration.depends_on.iter().find(|dep| {
                if let Some(selected) = &selected_set {
                    if !selected.contains(dep) {
                        return false;
                    }
                }
                state.status_of(dep) != UnitStatus::Success
            });

            if let Some(dependency) = unsatisfied {
                let reason = format!("dependency '{dependency}' did not succeed");
                state
                    .unit_statuses
                    .insert(unit_id.clone(), UnitStatus::Skipped);
                builder.record(UnitResult::skipped(unit_id, reason.clone()));

                if declaration.required {
                    warn!(unit_id = %unit_id, dependency = %dependency, "required unit blocked, aborting run");
                    builder.mark_aborted(unit_id, reason);
                    self.finish_aborted(&plan, position, &mut state, &mut builder);
                    break;
                }

                debug!(unit_id = %unit_id, dependency = %dependency, "optional unit blocked, skipping");
                continue;
            }

            state.current_unit = Some(unit_id.clone());
            let result = self
                .executor
                .execute_unit(&handler, declaration, &mut state)
                .await;
            state.current_unit = None;
            state.unit_statuses.insert(unit_id.clone(), result.status);

            match result.status {
                UnitStatus::Success => {
                    state
                        .unit_outputs
                        .insert(unit_id.clone(), result.output.clone());
                    completed_order.push(unit_id.clone());
                    builder.record(result);
                }
                UnitStatus::Failed => {
                    let reason = result
                        .error
                        .clone()
                        .unwrap_or_else(|| "unknown failure".to_string());
                    builder.record(result);

                    if declaration.required {
                        builder.mark_aborted(unit_id, reason);
                        self.finish_aborted(&plan, position, &mut state, &mut builder);
                        break;
                    }
                    warn!(unit_id = %unit_id, error = %reason, "optional unit failed, continuing");
                }
                _ => {
                    // Gate skip; dependents still see "not SUCCESS".
                    builder.record(result);
                }
            }
        }

        if builder.is_aborted() {
            let failures = RollbackCoordinator::new(self.registry.clone())
                .unwind(&mut state, &completed_order)
                .await;
            builder.record_rollback_failures(&failures);
        }

        state.end_time = Some(Utc::now());
        let report = builder.build(run_started.elapsed());

        info!(
            workflow_id = %workflow_id,
            overall_success = report.overall_success,
            succeeded = report.metrics.units_succeeded,
            failed = report.metrics.units_failed,
            skipped = report.metrics.units_skipped,
            duration_ms = report.duration_ms,
            summary = %report.summary,
            "workflow run finished"
        );

        report
    }

    /// Record every not-yet-started unit after `position` as SKIPPED. None of
    /// them is ever invoked; the skip marker only documents the abort.
    fn finish_aborted(
        &self,
        plan: &ExecutionPlan,
        position: usize,
        state: &mut WorkflowState,
        builder: &mut ReportBuilder,
    ) {
        let aborted_at = &plan.order()[position];
        for unit_id in &plan.order()[position + 1..] {
            if state.status_of(unit_id) == UnitStatus::Pending {
                state
                    .unit_statuses
                    .insert(unit_id.clone(), UnitStatus::Skipped);
                builder.record(UnitResult::skipped(
                    unit_id,
                    format!("run aborted at unit '{aborted_at}'"),
                ));
            }
        }
    }
}
