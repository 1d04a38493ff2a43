//! # Orchestration Types
//!
//! Core types and data structures shared across all orchestration components:
//! unit declarations, workflow state, per-unit results, and the unit handler
//! contract that every orchestrated piece of work implements.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use crate::orchestration::errors::ExecutionError;

/// Coarse ordinal grouping for units. All units in an earlier phase complete
/// before later-phase units are considered ready.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    Preparation,
    Environment,
    #[default]
    Processing,
    Validation,
    Finalization,
    Completion,
}

impl WorkflowPhase {
    /// Ordinal position used for bucket sorting.
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    /// All phases in execution order.
    pub fn all() -> [WorkflowPhase; 6] {
        [
            WorkflowPhase::Preparation,
            WorkflowPhase::Environment,
            WorkflowPhase::Processing,
            WorkflowPhase::Validation,
            WorkflowPhase::Finalization,
            WorkflowPhase::Completion,
        ]
    }
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowPhase::Preparation => "preparation",
            WorkflowPhase::Environment => "environment",
            WorkflowPhase::Processing => "processing",
            WorkflowPhase::Validation => "validation",
            WorkflowPhase::Finalization => "finalization",
            WorkflowPhase::Completion => "completion",
        };
        write!(f, "{name}")
    }
}

/// Identity and static metadata for one orchestrated unit of work.
///
/// Created once at workflow-definition time and immutable thereafter. Every id
/// in `depends_on` must resolve to a declared unit in the same workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDeclaration {
    /// Unique identifier within a workflow.
    pub id: String,
    /// Phase bucket this unit belongs to.
    #[serde(default)]
    pub phase: WorkflowPhase,
    /// Lower runs first among equally ready units in the same phase.
    #[serde(default)]
    pub priority: i32,
    /// Ids of units that must reach SUCCESS before this one runs.
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// If true, failure aborts the whole run; if false, failure only skips
    /// dependents.
    #[serde(default = "default_required")]
    pub required: bool,
    /// Whether failed attempts are retried.
    #[serde(default)]
    pub retryable: bool,
    /// Maximum execution attempts when retryable (>= 1).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Per-attempt execution timeout in seconds. Zero means "use the engine
    /// default".
    #[serde(default)]
    pub timeout_seconds: u64,
}

fn default_required() -> bool {
    true
}

fn default_max_retries() -> u32 {
    1
}

impl UnitDeclaration {
    /// Create a declaration with defaults: Processing phase, priority 0,
    /// required, not retryable.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            phase: WorkflowPhase::default(),
            priority: 0,
            depends_on: Vec::new(),
            required: true,
            retryable: false,
            max_retries: 1,
            timeout_seconds: 0,
        }
    }

    pub fn with_phase(mut self, phase: WorkflowPhase) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.retryable = true;
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Number of execution attempts the executor will make.
    pub fn effective_attempts(&self) -> u32 {
        if self.retryable {
            self.max_retries.max(1)
        } else {
            1
        }
    }
}

/// Status of a unit within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    Pending,
    Running,
    Success,
    Failed,
    Skipped,
}

impl UnitStatus {
    /// Whether this status ends the unit's lifecycle for the run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UnitStatus::Success | UnitStatus::Failed | UnitStatus::Skipped
        )
    }

    /// Legal transitions: Pending -> Running | Skipped, Running -> terminal.
    pub fn can_transition_to(&self, next: UnitStatus) -> bool {
        match self {
            UnitStatus::Pending => matches!(next, UnitStatus::Running | UnitStatus::Skipped),
            UnitStatus::Running => matches!(next, UnitStatus::Success | UnitStatus::Failed),
            _ => false,
        }
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitStatus::Pending => "pending",
            UnitStatus::Running => "running",
            UnitStatus::Success => "success",
            UnitStatus::Failed => "failed",
            UnitStatus::Skipped => "skipped",
        };
        write!(f, "{name}")
    }
}

/// Key-value output produced by a unit.
pub type UnitOutput = HashMap<String, serde_json::Value>;

/// Mutable state threaded through one run.
///
/// Owned exclusively by the executor for the duration of a run; mutated only
/// by the executor and the currently running unit. Never shared across
/// concurrent runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    pub workflow_id: String,
    pub correlation_id: Uuid,
    pub initial_request: serde_json::Value,
    /// Shared context map, injected exactly once before any unit runs.
    pub context: HashMap<String, serde_json::Value>,
    /// Outputs of successfully completed units, keyed by unit id.
    pub unit_outputs: HashMap<String, UnitOutput>,
    /// Current status of every unit in the plan.
    pub unit_statuses: HashMap<String, UnitStatus>,
    pub current_unit: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl WorkflowState {
    /// Create state for a fresh run, seeding the context exactly once.
    pub fn new(workflow_id: impl Into<String>, context_seed: HashMap<String, serde_json::Value>) -> Self {
        let initial_request = serde_json::Value::Object(
            context_seed
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        );
        Self {
            workflow_id: workflow_id.into(),
            correlation_id: Uuid::new_v4(),
            initial_request,
            context: context_seed,
            unit_outputs: HashMap::new(),
            unit_statuses: HashMap::new(),
            current_unit: None,
            start_time: None,
            end_time: None,
        }
    }

    /// Read a context value.
    pub fn context_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.context.get(key)
    }

    /// Write a context value, visible to all subsequently executed units.
    pub fn set_context_value(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.context.insert(key.into(), value);
    }

    /// Output recorded for a previously successful unit.
    pub fn output_of(&self, unit_id: &str) -> Option<&UnitOutput> {
        self.unit_outputs.get(unit_id)
    }

    /// Recorded status for a unit, defaulting to Pending for unknown ids.
    pub fn status_of(&self, unit_id: &str) -> UnitStatus {
        self.unit_statuses
            .get(unit_id)
            .copied()
            .unwrap_or(UnitStatus::Pending)
    }
}

/// Final outcome of one unit within one run. Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitResult {
    pub unit_id: String,
    pub status: UnitStatus,
    pub duration_ms: u64,
    pub output: UnitOutput,
    pub error: Option<String>,
    pub attempts_used: u32,
}

impl UnitResult {
    pub fn success(
        unit_id: impl Into<String>,
        output: UnitOutput,
        attempts_used: u32,
        duration_ms: u64,
    ) -> Self {
        Self {
            unit_id: unit_id.into(),
            status: UnitStatus::Success,
            duration_ms,
            output,
            error: None,
            attempts_used,
        }
    }

    pub fn failed(
        unit_id: impl Into<String>,
        error: impl fmt::Display,
        attempts_used: u32,
        duration_ms: u64,
    ) -> Self {
        Self {
            unit_id: unit_id.into(),
            status: UnitStatus::Failed,
            duration_ms,
            output: UnitOutput::new(),
            error: Some(error.to_string()),
            attempts_used,
        }
    }

    pub fn skipped(unit_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            unit_id: unit_id.into(),
            status: UnitStatus::Skipped,
            duration_ms: 0,
            output: UnitOutput::new(),
            error: Some(reason.into()),
            attempts_used: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == UnitStatus::Success
    }

    pub fn is_failure(&self) -> bool {
        self.status == UnitStatus::Failed
    }
}

/// Outcome of a unit's local prerequisite check, distinct from dependency
/// satisfaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrerequisiteCheck {
    pub satisfied: bool,
    pub issues: Vec<String>,
}

impl PrerequisiteCheck {
    pub fn satisfied() -> Self {
        Self {
            satisfied: true,
            issues: Vec::new(),
        }
    }

    pub fn unsatisfied<I, S>(issues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            satisfied: false,
            issues: issues.into_iter().map(Into::into).collect(),
        }
    }
}

/// Contract every orchestrated unit implements.
///
/// Units are plain handlers: the engine drives the lifecycle (gating,
/// validation, retries, timeouts, rollback ordering) and the handler supplies
/// the work. `execute` may mutate the shared context in place; the mutation is
/// visible to later units in the same run. A conforming handler reports
/// failure through the returned `ExecutionError`; the executor additionally
/// guards against panics from non-conforming handlers and converts them to
/// failed results.
#[async_trait::async_trait]
pub trait UnitHandler: Send + Sync {
    /// Static metadata for this unit.
    fn declaration(&self) -> UnitDeclaration;

    /// Conditional gate. When false the unit is recorded SKIPPED and
    /// `validate_prerequisites`/`execute` are never invoked.
    async fn should_run(&self, _state: &WorkflowState) -> bool {
        true
    }

    /// Local sanity check, distinct from dependency satisfaction.
    async fn validate_prerequisites(&self, _state: &WorkflowState) -> PrerequisiteCheck {
        PrerequisiteCheck::satisfied()
    }

    /// Do the work. May mutate `state.context` in place.
    async fn execute(&self, state: &mut WorkflowState) -> Result<UnitOutput, ExecutionError>;

    /// Best-effort undo. Errors are logged by the rollback coordinator and
    /// never propagated.
    async fn rollback(&self, _state: &mut WorkflowState) -> Result<(), ExecutionError> {
        Ok(())
    }
}

/// Serde-friendly workflow definition record, as consumed from configuration.
///
/// `units` carries the same declarations the registered handlers report; ids
/// referenced here without a registered handler are a validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub workflow_id: String,
    pub units: Vec<UnitDeclaration>,
}
