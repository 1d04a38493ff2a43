//! # Unit Registry
//!
//! Thread-safe registry mapping unit ids to their handlers. Registration
//! order is preserved because it is the scheduler's final tie-break.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::orchestration::types::{UnitDeclaration, UnitHandler};

/// Registry statistics snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryStats {
    pub total_units: usize,
    pub thread_safe: bool,
}

#[derive(Default)]
struct RegistryInner {
    handlers: HashMap<String, Arc<dyn UnitHandler>>,
    /// Unit ids in registration order.
    order: Vec<String>,
}

/// Thread-safe unit handler registry.
#[derive(Default)]
pub struct UnitRegistry {
    inner: RwLock<RegistryInner>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under the id reported by its declaration.
    /// Re-registering an id replaces the previous handler with a warning and
    /// keeps its original position in the declaration order.
    pub fn register(&self, handler: Arc<dyn UnitHandler>) {
        let declaration = handler.declaration();
        let unit_id = declaration.id.clone();

        let mut inner = self.inner.write();
        if inner.handlers.insert(unit_id.clone(), handler).is_some() {
            warn!(unit_id = %unit_id, "unit already registered, replacing handler");
        } else {
            inner.order.push(unit_id.clone());
            info!(
                unit_id = %unit_id,
                phase = %declaration.phase,
                required = declaration.required,
                "unit registered"
            );
        }
    }

    pub fn get(&self, unit_id: &str) -> Option<Arc<dyn UnitHandler>> {
        self.inner.read().handlers.get(unit_id).cloned()
    }

    pub fn contains(&self, unit_id: &str) -> bool {
        self.inner.read().handlers.contains_key(unit_id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().order.is_empty()
    }

    /// Declarations of all registered units, in registration order.
    pub fn declarations(&self) -> Vec<UnitDeclaration> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|id| inner.handlers.get(id))
            .map(|h| h.declaration())
            .collect()
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            total_units: self.len(),
            thread_safe: true,
        }
    }
}
