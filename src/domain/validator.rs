//! Structural validation: cycle detection and root check.

use std::collections::HashSet;

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::arena::{Forest, ValidatedForest};
use crate::domain::entities::PartnerId;
use crate::domain::error::{DomainError, DomainResult};

/// Detects cycles by walking `parent_id` links upward from every node.
///
/// Nodes proven acyclic by an earlier walk end later walks early, so every
/// node is entered a bounded number of times and the whole check is O(n).
#[derive(Debug, Default)]
pub struct CycleDetector {
    visited: HashSet<Index>,
}

impl CycleDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of a partner on a cycle, if any.
    #[instrument(level = "debug", skip_all)]
    pub fn find_cycle(&mut self, forest: &Forest) -> Option<PartnerId> {
        self.visited.clear();
        let mut path: HashSet<Index> = HashSet::new();

        for &start in forest.indices() {
            if self.visited.contains(&start) {
                continue;
            }
            path.clear();
            let mut current = Some(start);

            while let Some(idx) = current {
                let Some(node) = forest.get_node(idx) else {
                    break;
                };
                if !path.insert(idx) {
                    debug!("parent chain revisits partner {}", node.data.id);
                    return Some(node.data.id);
                }
                if !self.visited.insert(idx) {
                    // already proven acyclic by an earlier walk
                    break;
                }
                current = node
                    .data
                    .parent_id
                    .and_then(|parent_id| forest.index_of(parent_id));
            }
        }
        None
    }
}

/// Validates the structure of a built forest.
#[derive(Debug, Default)]
pub struct ForestValidator {
    cycle_detector: CycleDetector,
}

impl ForestValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check for cycles, then for roots.
    ///
    /// Cycles are checked first: a network made only of cycles has no roots
    /// and would otherwise be reported as rootless.
    #[instrument(level = "debug", skip_all, fields(partners = forest.len()))]
    pub fn validate(&mut self, forest: Forest) -> DomainResult<ValidatedForest> {
        if let Some(id) = self.cycle_detector.find_cycle(&forest) {
            return Err(DomainError::CycleDetected(id));
        }
        if forest.roots().is_empty() {
            return Err(DomainError::NoRoot);
        }
        Ok(ValidatedForest::new(forest))
    }
}
