//! # Checkpoint
//!
//! Persisted record of which units have already reached SUCCESS, enabling a
//! later run to resume without re-executing them. Stored as plain JSON; only
//! SUCCESS entries are honored on resume.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{ConductorError, Result};
use crate::orchestration::report::ExecutionReport;
use crate::orchestration::types::UnitStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub workflow_id: String,
    pub unit_statuses: HashMap<String, UnitStatus>,
    pub saved_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(workflow_id: impl Into<String>, unit_statuses: HashMap<String, UnitStatus>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            unit_statuses,
            saved_at: Utc::now(),
        }
    }

    /// Build a checkpoint from a finished (possibly partial) run's report.
    pub fn from_report(workflow_id: impl Into<String>, report: &ExecutionReport) -> Self {
        let unit_statuses = report
            .unit_results
            .iter()
            .map(|r| (r.unit_id.clone(), r.status))
            .collect();
        Self::new(workflow_id, unit_statuses)
    }

    /// Unit ids recorded SUCCESS, i.e. the ones a resumed run skips.
    pub fn satisfied_units(&self) -> Vec<String> {
        self.unit_statuses
            .iter()
            .filter(|(_, status)| **status == UnitStatus::Success)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn is_satisfied(&self, unit_id: &str) -> bool {
        self.unit_statuses.get(unit_id) == Some(&UnitStatus::Success)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConductorError::checkpoint(format!("serialize: {e}")))?;
        std::fs::write(path, json)
            .map_err(|e| ConductorError::checkpoint(format!("write {}: {e}", path.display())))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConductorError::checkpoint(format!("read {}: {e}", path.display())))?;
        serde_json::from_str(&json)
            .map_err(|e| ConductorError::checkpoint(format!("parse {}: {e}", path.display())))
    }
}
