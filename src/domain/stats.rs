//! Read-only statistics over a forest.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::instrument;

use crate::domain::arena::Forest;

/// Estimated memory footprint per partner in KB.
const ESTIMATED_KB_PER_PARTNER: f64 = 0.5;

/// Headline figures of a partner network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NetworkStats {
    pub total_partners: usize,
    pub root_partners: usize,
    pub leaf_partners: usize,
    /// Longest root-to-leaf path, root depth is 0
    pub max_depth: usize,
}

/// Level (root = 0) to number of partners on that level.
pub type LevelDistribution = BTreeMap<usize, usize>;

/// Rough sizing figures for a loaded network.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub total_partners: f64,
    pub max_depth: f64,
    pub estimated_memory_kb: f64,
    pub performance_score: f64,
    pub complexity_factor: f64,
}

#[derive(Debug, Default)]
pub struct TreeStatistics;

impl TreeStatistics {
    pub fn new() -> Self {
        Self
    }

    #[instrument(level = "debug", skip_all)]
    pub fn get_stats(&self, forest: &Forest) -> NetworkStats {
        NetworkStats {
            total_partners: forest.len(),
            root_partners: forest.roots().len(),
            leaf_partners: forest.leaf_count(),
            max_depth: self.max_depth(forest),
        }
    }

    pub fn max_depth(&self, forest: &Forest) -> usize {
        forest.iter().map(|(_, _, depth)| depth).max().unwrap_or(0)
    }

    #[instrument(level = "debug", skip_all)]
    pub fn get_level_distribution(&self, forest: &Forest) -> LevelDistribution {
        let mut levels = LevelDistribution::new();
        for (_, _, depth) in forest.iter() {
            *levels.entry(depth).or_default() += 1;
        }
        levels
    }

    pub fn get_performance_metrics(&self, forest: &Forest) -> PerformanceMetrics {
        let stats = self.get_stats(forest);
        let total = stats.total_partners as f64;
        let depth = stats.max_depth as f64;
        PerformanceMetrics {
            total_partners: total,
            max_depth: depth,
            estimated_memory_kb: total * ESTIMATED_KB_PER_PARTNER,
            performance_score: (10_000.0 / total.max(1.0) * 100.0).min(100.0),
            complexity_factor: depth * total,
        }
    }
}
