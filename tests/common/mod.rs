//! Shared test scaffolding: a scriptable unit handler whose execution and
//! rollback activity is observable from outside the run.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use conductor_core::orchestration::{
    ExecutionError, PrerequisiteCheck, UnitDeclaration, UnitHandler, UnitOutput, WorkflowState,
};

/// Chronological log of unit activity shared across all units of a run.
#[derive(Clone, Default)]
pub struct RunLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    pub fn executed(&self) -> Vec<String> {
        self.filtered("exec:")
    }

    pub fn rolled_back(&self) -> Vec<String> {
        self.filtered("rollback:")
    }

    fn filtered(&self, prefix: &str) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter_map(|e| e.strip_prefix(prefix).map(str::to_string))
            .collect()
    }
}

/// Scriptable unit handler: fails its first `fail_first` attempts and then
/// succeeds (`u32::MAX` means always fail). Can also sleep, write or assert
/// context values, close its conditional gate, or fail its own rollback.
pub struct ScriptedUnit {
    decl: UnitDeclaration,
    log: RunLog,
    executions: Arc<AtomicU32>,
    fail_first: u32,
    panics: bool,
    runnable: bool,
    rollback_fails: bool,
    sleep: Option<Duration>,
    context_writes: Vec<(String, serde_json::Value)>,
    context_expectations: Vec<(String, serde_json::Value)>,
}

impl ScriptedUnit {
    pub fn new(decl: UnitDeclaration, log: &RunLog) -> Self {
        Self {
            decl,
            log: log.clone(),
            executions: Arc::new(AtomicU32::new(0)),
            fail_first: 0,
            panics: false,
            runnable: true,
            rollback_fails: false,
            sleep: None,
            context_writes: Vec::new(),
            context_expectations: Vec::new(),
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail_first = u32::MAX;
        self
    }

    pub fn failing_first(mut self, attempts: u32) -> Self {
        self.fail_first = attempts;
        self
    }

    pub fn panicking(mut self) -> Self {
        self.panics = true;
        self
    }

    pub fn not_runnable(mut self) -> Self {
        self.runnable = false;
        self
    }

    pub fn with_failing_rollback(mut self) -> Self {
        self.rollback_fails = true;
        self
    }

    pub fn sleeping(mut self, duration: Duration) -> Self {
        self.sleep = Some(duration);
        self
    }

    pub fn writing_context(mut self, key: &str, value: serde_json::Value) -> Self {
        self.context_writes.push((key.to_string(), value));
        self
    }

    /// Fail execution unless the shared context holds `key == value` when
    /// this unit runs.
    pub fn expecting_context(mut self, key: &str, value: serde_json::Value) -> Self {
        self.context_expectations.push((key.to_string(), value));
        self
    }

    /// Handle on the execution counter, usable after registration.
    pub fn executions_handle(&self) -> Arc<AtomicU32> {
        self.executions.clone()
    }
}

#[async_trait::async_trait]
impl UnitHandler for ScriptedUnit {
    fn declaration(&self) -> UnitDeclaration {
        self.decl.clone()
    }

    async fn should_run(&self, _state: &WorkflowState) -> bool {
        self.runnable
    }

    async fn validate_prerequisites(&self, _state: &WorkflowState) -> PrerequisiteCheck {
        PrerequisiteCheck::satisfied()
    }

    async fn execute(&self, state: &mut WorkflowState) -> Result<UnitOutput, ExecutionError> {
        let attempt = self.executions.fetch_add(1, Ordering::SeqCst) + 1;
        self.log.push(format!("exec:{}", self.decl.id));

        if let Some(duration) = self.sleep {
            tokio::time::sleep(duration).await;
        }

        if self.panics {
            panic!("scripted panic in '{}'", self.decl.id);
        }

        for (key, expected) in &self.context_expectations {
            match state.context_value(key) {
                Some(actual) if actual == expected => {}
                other => {
                    return Err(ExecutionError::failed(
                        &self.decl.id,
                        format!("expected context {key}={expected}, found {other:?}"),
                    ));
                }
            }
        }

        if attempt <= self.fail_first {
            return Err(ExecutionError::failed(
                &self.decl.id,
                format!("scripted failure on attempt {attempt}"),
            ));
        }

        for (key, value) in &self.context_writes {
            state.set_context_value(key.clone(), value.clone());
        }

        let mut output = HashMap::new();
        output.insert("attempt".to_string(), serde_json::json!(attempt));
        Ok(output)
    }

    async fn rollback(&self, _state: &mut WorkflowState) -> Result<(), ExecutionError> {
        self.log.push(format!("rollback:{}", self.decl.id));
        if self.rollback_fails {
            return Err(ExecutionError::failed(
                &self.decl.id,
                "scripted rollback failure",
            ));
        }
        Ok(())
    }
}
