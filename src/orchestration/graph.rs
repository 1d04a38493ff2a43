//! # Dependency Graph Builder
//!
//! Turns a set of unit declarations into a validated dependency graph.
//! Validation collects every problem it can find (duplicate ids, unknown
//! references, later-phase dependencies, cycles) and reports them all at once;
//! a graph is only produced when the declaration set is fully consistent.

use std::collections::{HashMap, HashSet};

use crate::orchestration::errors::DefinitionError;
use crate::orchestration::types::UnitDeclaration;

/// Validated dependency graph over a set of unit declarations.
///
/// Declaration order is preserved: it is the final tie-break for the
/// scheduler, so the same input always yields the same plan.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    declarations: Vec<UnitDeclaration>,
    index: HashMap<String, usize>,
    /// For each unit, the indices of units that depend on it.
    dependents: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// Build and validate a graph from declarations.
    ///
    /// Returns the complete list of definition errors when validation fails;
    /// never partial success.
    pub fn build(declarations: &[UnitDeclaration]) -> Result<Self, Vec<DefinitionError>> {
        let mut errors = Vec::new();

        let mut index: HashMap<String, usize> = HashMap::with_capacity(declarations.len());
        for (i, decl) in declarations.iter().enumerate() {
            if index.insert(decl.id.clone(), i).is_some() {
                errors.push(DefinitionError::duplicate_unit(&decl.id));
            }
        }

        // Edge checks only make sense against a well-formed id set, but we
        // still run them on whatever resolved so all problems surface together.
        for decl in declarations {
            for dep in &decl.depends_on {
                match index.get(dep) {
                    None => {
                        errors.push(DefinitionError::unknown_dependency(&decl.id, dep));
                    }
                    Some(&dep_idx) => {
                        let dep_decl = &declarations[dep_idx];
                        if dep_decl.phase > decl.phase {
                            errors.push(DefinitionError::LaterPhaseDependency {
                                unit_id: decl.id.clone(),
                                phase: decl.phase.to_string(),
                                dependency: dep.clone(),
                                dependency_phase: dep_decl.phase.to_string(),
                            });
                        }
                    }
                }
            }
        }

        errors.extend(detect_cycles(declarations, &index));

        if !errors.is_empty() {
            return Err(errors);
        }

        let mut dependents = vec![Vec::new(); declarations.len()];
        for (i, decl) in declarations.iter().enumerate() {
            for dep in &decl.depends_on {
                dependents[index[dep]].push(i);
            }
        }

        Ok(Self {
            declarations: declarations.to_vec(),
            index,
            dependents,
        })
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn declarations(&self) -> &[UnitDeclaration] {
        &self.declarations
    }

    pub fn declaration(&self, unit_id: &str) -> Option<&UnitDeclaration> {
        self.index.get(unit_id).map(|&i| &self.declarations[i])
    }

    pub fn contains(&self, unit_id: &str) -> bool {
        self.index.contains_key(unit_id)
    }

    /// Indices of units that depend on the unit at `idx`.
    pub(crate) fn dependents_of(&self, idx: usize) -> &[usize] {
        &self.dependents[idx]
    }

    pub(crate) fn index_of(&self, unit_id: &str) -> Option<usize> {
        self.index.get(unit_id).copied()
    }
}

/// Depth-first cycle detection with a recursion-path set.
///
/// Any unit revisited while still on the path yields one error naming the
/// revisited unit; each cycle is reported once.
fn detect_cycles(
    declarations: &[UnitDeclaration],
    index: &HashMap<String, usize>,
) -> Vec<DefinitionError> {
    let mut errors = Vec::new();
    let mut visited: HashSet<usize> = HashSet::new();
    let mut on_path: HashSet<usize> = HashSet::new();

    for start in 0..declarations.len() {
        if !visited.contains(&start) {
            visit(
                start,
                declarations,
                index,
                &mut visited,
                &mut on_path,
                &mut errors,
            );
        }
    }

    errors
}

fn visit(
    node: usize,
    declarations: &[UnitDeclaration],
    index: &HashMap<String, usize>,
    visited: &mut HashSet<usize>,
    on_path: &mut HashSet<usize>,
    errors: &mut Vec<DefinitionError>,
) {
    visited.insert(node);
    on_path.insert(node);

    for dep in &declarations[node].depends_on {
        // Unknown deps are reported separately by the edge check.
        let Some(&dep_idx) = index.get(dep) else {
            continue;
        };
        if on_path.contains(&dep_idx) {
            errors.push(DefinitionError::cycle_detected(&declarations[dep_idx].id));
        } else if !visited.contains(&dep_idx) {
            visit(dep_idx, declarations, index, visited, on_path, errors);
        }
    }

    on_path.remove(&node);
}
