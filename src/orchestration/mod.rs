//! # Orchestration Engine
//!
//! Dependency-aware unit orchestration: register units of work with explicit
//! dependencies and priorities, validate the dependency graph, compute a
//! deterministic execution order, run each unit with retry/timeout policy,
//! and unwind completed units when a required unit fails.
//!
//! ## Core Components
//!
//! - **Orchestrator**: public facade for registering handlers, validating, running
//! - **DependencyGraph**: declaration validation and adjacency (all errors at once)
//! - **ExecutionPlan**: deterministic phase-bucketed topological order
//! - **UnitExecutor**: per-unit lifecycle with retry, timeout, and panic guard
//! - **WorkflowCoordinator**: sequential run loop with dependency gating
//! - **RollbackCoordinator**: best-effort reverse-order unwind after an abort
//! - **ReportBuilder**: final `ExecutionReport` assembly
//! - **Checkpoint**: resumable record of previously successful units

pub mod backoff;
pub mod checkpoint;
pub mod coordinator;
pub mod core;
pub mod errors;
pub mod executor;
pub mod graph;
pub mod report;
pub mod rollback;
pub mod scheduler;
pub mod types;

pub use backoff::BackoffPolicy;
pub use checkpoint::Checkpoint;
pub use coordinator::WorkflowCoordinator;
pub use core::Orchestrator;
pub use errors::{DefinitionError, ExecutionError, RollbackFailure};
pub use executor::UnitExecutor;
pub use graph::DependencyGraph;
pub use report::{ExecutionMetrics, ExecutionReport, ReportBuilder};
pub use rollback::RollbackCoordinator;
pub use scheduler::ExecutionPlan;
pub use types::{
    PrerequisiteCheck, UnitDeclaration, UnitHandler, UnitOutput, UnitResult, UnitStatus,
    WorkflowDefinition, WorkflowPhase, WorkflowState,
};
