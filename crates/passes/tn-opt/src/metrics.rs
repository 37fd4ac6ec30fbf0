//! Per-pass rewrite counters

use serde::{Deserialize, Serialize};

/// Weight applied to the ratio of rewritten to processed nodes
pub const SPEEDUP_FACTOR: f64 = 0.1;

/// Running counters kept by a pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassMetrics {
    /// Nodes handed to the pass
    pub nodes_processed: u64,
    /// Nodes the pass rewrote
    pub nodes_optimized: u64,
    /// Expressions folded to a literal
    pub constants_folded: u64,
    /// Statements or branches deleted
    pub dead_code_removed: u64,
    /// Sugared forms expanded
    pub syntax_sugar_removed: u64,
}

impl PassMetrics {
    /// Rough, advisory gain estimate; 0 when nothing was processed
    #[must_use]
    pub fn estimated_speedup(&self) -> f64 {
        if self.nodes_processed == 0 {
            return 0.0;
        }
        let rewritten = self.constants_folded + self.dead_code_removed + self.syntax_sugar_removed;
        rewritten as f64 / self.nodes_processed as f64 * SPEEDUP_FACTOR
    }

    /// Freezes the counters under a pass name
    #[must_use]
    pub fn snapshot(&self, pass_name: &str) -> MetricsSnapshot {
        MetricsSnapshot {
            pass_name: pass_name.to_string(),
            nodes_processed: self.nodes_processed,
            nodes_optimized: self.nodes_optimized,
            constants_folded: self.constants_folded,
            dead_code_removed: self.dead_code_removed,
            syntax_sugar_removed: self.syntax_sugar_removed,
            estimated_speedup: self.estimated_speedup(),
        }
    }
}

/// Counters of one pass at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Pass name
    pub pass_name: String,
    /// Nodes handed to the pass
    pub nodes_processed: u64,
    /// Nodes the pass rewrote
    pub nodes_optimized: u64,
    /// Expressions folded to a literal
    pub constants_folded: u64,
    /// Statements or branches deleted
    pub dead_code_removed: u64,
    /// Sugared forms expanded
    pub syntax_sugar_removed: u64,
    /// Advisory score derived from the counters
    pub estimated_speedup: f64,
}
