//! # Conductor Core
//!
//! Declarative, dependency-aware unit orchestration engine.
//!
//! ## Overview
//!
//! Callers register units of work, each with an id, phase bucket, priority,
//! dependency set, and retry/timeout policy. The engine validates the
//! dependency graph, computes a deterministic execution order, and runs the
//! units strictly one at a time. Required failures abort the run and unwind
//! completed units in reverse order; optional failures only skip dependents.
//! The sole output of a run is a structured [`ExecutionReport`].
//!
//! ## Module Organization
//!
//! - [`orchestration`] - graph validation, scheduling, execution, rollback
//! - [`registry`] - unit handler registration and lookup
//! - [`config`] - engine configuration with environment overrides
//! - [`error`] - top-level error handling for programmer-error surfaces
//! - [`logging`] - structured tracing initialization
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use conductor_core::orchestration::{
//!     ExecutionError, Orchestrator, UnitDeclaration, UnitHandler, UnitOutput, WorkflowState,
//! };
//!
//! struct CloneRepo;
//!
//! #[async_trait::async_trait]
//! impl UnitHandler for CloneRepo {
//!     fn declaration(&self) -> UnitDeclaration {
//!         UnitDeclaration::new("clone_repo").with_retries(3).with_timeout_seconds(120)
//!     }
//!
//!     async fn execute(&self, state: &mut WorkflowState) -> Result<UnitOutput, ExecutionError> {
//!         state.set_context_value("checkout_path", serde_json::json!("/tmp/repo"));
//!         Ok(UnitOutput::new())
//!     }
//! }
//!
//! # async fn example() {
//! let orchestrator = Orchestrator::new("setup");
//! orchestrator.register(Arc::new(CloneRepo));
//! let report = orchestrator.run(HashMap::new()).await;
//! assert!(report.overall_success);
//! # }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod orchestration;
pub mod registry;

pub use config::ConductorConfig;
pub use error::{ConductorError, Result};
pub use orchestration::{
    Checkpoint, DefinitionError, ExecutionError, ExecutionReport, Orchestrator, UnitDeclaration,
    UnitHandler, UnitResult, UnitStatus, WorkflowPhase, WorkflowState,
};
pub use registry::{RegistryStats, UnitRegistry};
