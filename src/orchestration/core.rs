//! # Orchestrator
//!
//! Public entry point: register unit handlers, validate the resulting
//! workflow, and run it. `run` and its variants always return an
//! `ExecutionReport`: definition errors and aborts are data in the report,
//! never an `Err`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ConductorConfig;
use crate::orchestration::checkpoint::Checkpoint;
use crate::orchestration::coordinator::{RunOptions, WorkflowCoordinator};
use crate::orchestration::errors::DefinitionError;
use crate::orchestration::graph::DependencyGraph;
use crate::orchestration::report::ExecutionReport;
use crate::orchestration::types::{UnitHandler, WorkflowDefinition};
use crate::registry::UnitRegistry;

/// Declarative, dependency-aware workflow orchestrator.
pub struct Orchestrator {
    workflow_id: String,
    registry: Arc<UnitRegistry>,
    coordinator: WorkflowCoordinator,
}

impl Orchestrator {
    /// Create an orchestrator with default engine configuration.
    pub fn new(workflow_id: impl Into<String>) -> Self {
        Self::with_config(workflow_id, ConductorConfig::default())
    }

    pub fn with_config(workflow_id: impl Into<String>, config: ConductorConfig) -> Self {
        let registry = Arc::new(UnitRegistry::new());
        let coordinator = WorkflowCoordinator::new(registry.clone(), config);
        Self {
            workflow_id: workflow_id.into(),
            registry,
            coordinator,
        }
    }

    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }

    /// Register a unit handler under the id its declaration reports.
    pub fn register(&self, handler: Arc<dyn UnitHandler>) {
        self.registry.register(handler);
    }

    pub fn registry(&self) -> &Arc<UnitRegistry> {
        &self.registry
    }

    /// Validate the registered units without executing anything. Returns the
    /// complete list of definition errors, empty when the workflow is sound.
    pub fn validate(&self) -> Vec<DefinitionError> {
        match DependencyGraph::build(&self.registry.declarations()) {
            Ok(_) => Vec::new(),
            Err(errors) => errors,
        }
    }

    /// Export the current workflow as a serde-friendly definition record.
    pub fn definition(&self) -> WorkflowDefinition {
        WorkflowDefinition {
            workflow_id: self.workflow_id.clone(),
            units: self.registry.declarations(),
        }
    }

    /// Validate an externally supplied workflow definition against the
    /// registry and graph rules. Ids without a registered handler are errors.
    pub fn validate_definition(&self, definition: &WorkflowDefinition) -> Vec<DefinitionError> {
        let mut errors: Vec<DefinitionError> = definition
            .units
            .iter()
            .filter(|unit| !self.registry.contains(&unit.id))
            .map(|unit| DefinitionError::unregistered_unit(&unit.id))
            .collect();

        if let Err(graph_errors) = DependencyGraph::build(&definition.units) {
            errors.extend(graph_errors);
        }

        errors
    }

    /// Run the full workflow with the given context seed.
    pub async fn run(&self, context_seed: HashMap<String, serde_json::Value>) -> ExecutionReport {
        self.coordinator
            .run(&self.workflow_id, context_seed, RunOptions::default())
            .await
    }

    /// Run a restricted subset of units. Dependency gating still applies
    /// among the subset; dependencies outside it are treated as satisfied.
    pub async fn run_selected(
        &self,
        context_seed: HashMap<String, serde_json::Value>,
        selected_unit_ids: &[String],
    ) -> ExecutionReport {
        self.coordinator
            .run(
                &self.workflow_id,
                context_seed,
                RunOptions {
                    selected: Some(selected_unit_ids),
                    checkpoint: None,
                },
            )
            .await
    }

    /// Resume from a checkpoint: units recorded SUCCESS there are treated as
    /// already satisfied and never re-executed.
    pub async fn resume(
        &self,
        context_seed: HashMap<String, serde_json::Value>,
        checkpoint: &Checkpoint,
    ) -> ExecutionReport {
        self.coordinator
            .run(
                &self.workflow_id,
                context_seed,
                RunOptions {
                    selected: None,
                    checkpoint: Some(checkpoint),
                },
            )
            .await
    }
}
