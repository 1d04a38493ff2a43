//! # Scheduler
//!
//! Computes a deterministic total order over a validated dependency graph.
//!
//! The order is purely static: phase ordinal is the primary bucket sort, and
//! within a phase Kahn's algorithm selects ready units with ties broken by
//! ascending priority, then by original declaration order. The scheduler never
//! consults unit outcomes, so the same graph always yields the same plan,
//! a requirement for both resumability and testability.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::orchestration::graph::DependencyGraph;
use crate::orchestration::types::WorkflowPhase;

/// Deterministic execution order for one workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    order: Vec<String>,
}

impl ExecutionPlan {
    /// Compute the plan for a validated graph.
    pub fn compute(graph: &DependencyGraph) -> Self {
        let decls = graph.declarations();
        let mut order = Vec::with_capacity(decls.len());

        for phase in WorkflowPhase::all() {
            schedule_phase(graph, phase, &mut order);
        }

        debug_assert_eq!(order.len(), decls.len(), "plan must cover every unit");
        Self { order }
    }

    /// Unit ids in execution order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Position of a unit in the plan.
    pub fn position(&self, unit_id: &str) -> Option<usize> {
        self.order.iter().position(|id| id == unit_id)
    }

    /// Restrict the plan to a subset of units, preserving order.
    pub fn restricted_to(&self, unit_ids: &[String]) -> Self {
        let order = self
            .order
            .iter()
            .filter(|id| unit_ids.contains(id))
            .cloned()
            .collect();
        Self { order }
    }
}

/// Kahn's algorithm over one phase bucket.
///
/// Only same-phase edges contribute to in-degree: cross-phase dependencies
/// always point at earlier phases (validated at graph build) and are already
/// honored by the phase-bucket ordering.
fn schedule_phase(graph: &DependencyGraph, phase: WorkflowPhase, order: &mut Vec<String>) {
    let decls = graph.declarations();

    let mut in_degree: Vec<usize> = vec![0; decls.len()];
    for decl in decls.iter().filter(|d| d.phase == phase) {
        let count = decl
            .depends_on
            .iter()
            .filter_map(|dep| graph.index_of(dep))
            .filter(|&dep_idx| decls[dep_idx].phase == phase)
            .count();
        if let Some(idx) = graph.index_of(&decl.id) {
            in_degree[idx] = count;
        }
    }

    // Min-heap keyed by (priority, declaration index).
    let mut ready: BinaryHeap<Reverse<(i32, usize)>> = decls
        .iter()
        .enumerate()
        .filter(|(_, d)| d.phase == phase)
        .filter(|(i, _)| in_degree[*i] == 0)
        .map(|(i, d)| Reverse((d.priority, i)))
        .collect();

    while let Some(Reverse((_, idx))) = ready.pop() {
        order.push(decls[idx].id.clone());

        for &dependent in graph.dependents_of(idx) {
            if decls[dependent].phase != phase {
                continue;
            }
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.push(Reverse((decls[dependent].priority, dependent)));
            }
        }
    }
}
