//! # Execution Report
//!
//! Aggregates per-unit results into the final report returned to the caller.
//! The report is the sole externally visible outcome of a run: definition
//! errors, aborts, and rollback failures all surface here as data, never as
//! an `Err` from `run()`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::orchestration::errors::{DefinitionError, RollbackFailure};
use crate::orchestration::types::{UnitResult, UnitStatus};

/// Aggregate counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionMetrics {
    pub units_planned: usize,
    pub units_executed: usize,
    pub units_succeeded: usize,
    pub units_failed: usize,
    pub units_skipped: usize,
}

/// Final aggregate of one run. Built once, immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub overall_success: bool,
    /// Per-unit results in execution order.
    pub unit_results: Vec<UnitResult>,
    /// Ids of units that ended FAILED.
    pub failed_units: Vec<String>,
    pub duration_ms: u64,
    /// Short deterministic human summary.
    pub summary: String,
    /// Definition errors that prevented the run from starting, if any.
    pub definition_errors: Vec<String>,
    /// Rollback failures collected during an aborting unwind, if any.
    pub rollback_errors: Vec<String>,
    pub metrics: ExecutionMetrics,
}

impl ExecutionReport {
    pub fn result_for(&self, unit_id: &str) -> Option<&UnitResult> {
        self.unit_results.iter().find(|r| r.unit_id == unit_id)
    }

    pub fn status_of(&self, unit_id: &str) -> Option<UnitStatus> {
        self.result_for(unit_id).map(|r| r.status)
    }
}

/// Accumulates results during a run and assembles the final report.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    planned: usize,
    results: Vec<UnitResult>,
    aborted_at: Option<(String, String)>,
    rollback_errors: Vec<String>,
}

impl ReportBuilder {
    pub fn new(planned: usize) -> Self {
        Self {
            planned,
            ..Self::default()
        }
    }

    pub fn record(&mut self, result: UnitResult) {
        self.results.push(result);
    }

    /// Mark the run aborted at `unit_id`. Only the first abort is kept.
    pub fn mark_aborted(&mut self, unit_id: impl Into<String>, reason: impl Into<String>) {
        if self.aborted_at.is_none() {
            self.aborted_at = Some((unit_id.into(), reason.into()));
        }
    }

    pub fn record_rollback_failures(&mut self, failures: &[RollbackFailure]) {
        self.rollback_errors
            .extend(failures.iter().map(ToString::to_string));
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted_at.is_some()
    }

    /// Build a report for a run rejected at validation time: zero unit
    /// results, all definition errors listed.
    pub fn rejected(errors: &[DefinitionError], duration: Duration) -> ExecutionReport {
        ExecutionReport {
            overall_success: false,
            unit_results: Vec::new(),
            failed_units: Vec::new(),
            duration_ms: duration.as_millis() as u64,
            summary: format!("validation failed: {} error(s)", errors.len()),
            definition_errors: errors.iter().map(ToString::to_string).collect(),
            rollback_errors: Vec::new(),
            metrics: ExecutionMetrics::default(),
        }
    }

    pub fn build(self, duration: Duration) -> ExecutionReport {
        let failed_units: Vec<String> = self
            .results
            .iter()
            .filter(|r| r.status == UnitStatus::Failed)
            .map(|r| r.unit_id.clone())
            .collect();

        let metrics = ExecutionMetrics {
            units_planned: self.planned,
            units_executed: self
                .results
                .iter()
                .filter(|r| r.attempts_used > 0)
                .count(),
            units_succeeded: self
                .results
                .iter()
                .filter(|r| r.status == UnitStatus::Success)
                .count(),
            units_failed: failed_units.len(),
            units_skipped: self
                .results
                .iter()
                .filter(|r| r.status == UnitStatus::Skipped)
                .count(),
        };

        let summary = match &self.aborted_at {
            Some((unit_id, reason)) => format!("aborted at unit '{unit_id}': {reason}"),
            None => format!(
                "{}/{} units succeeded",
                metrics.units_succeeded, self.planned
            ),
        };

        ExecutionReport {
            overall_success: failed_units.is_empty() && self.aborted_at.is_none(),
            unit_results: self.results,
            failed_units,
            duration_ms: duration.as_millis() as u64,
            summary,
            definition_errors: Vec::new(),
            rollback_errors: self.rollback_errors,
            metrics,
        }
    }
}
