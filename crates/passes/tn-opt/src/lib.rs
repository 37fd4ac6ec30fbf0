//! Syntax-tree rewrite passes
//!
//! Each pass looks at one node at a time and either returns it untouched,
//! returns a replacement, or asks for the node to be deleted. Traversal and
//! repetition to a fixed point belong to [`Pipeline`].

pub mod config;
pub mod const_fold;
pub mod dead_code;
pub mod desugar;
pub mod metrics;
pub mod pipeline;

pub use config::{ConfigError, PipelineConfig};
pub use const_fold::ConstantFolding;
pub use dead_code::DeadCodeElimination;
pub use desugar::SugarRemoval;
pub use metrics::{MetricsSnapshot, PassMetrics};
pub use pipeline::{Pipeline, PipelineReport};

use tn_syntax::Node;

/// Outcome of applying a pass to one node
#[derive(Debug, Clone, PartialEq)]
pub struct Rewrite {
    /// Resulting node; `None` deletes it
    pub node: Option<Node>,
    /// Whether anything was rewritten
    pub changed: bool,
}

impl Rewrite {
    /// The node is returned as it was
    #[must_use]
    pub const fn unchanged(node: Node) -> Self {
        Self {
            node: Some(node),
            changed: false,
        }
    }

    /// The node was replaced
    #[must_use]
    pub const fn replaced(node: Node) -> Self {
        Self {
            node: Some(node),
            changed: true,
        }
    }

    /// The node should be deleted
    #[must_use]
    pub const fn removed() -> Self {
        Self {
            node: None,
            changed: true,
        }
    }
}

/// A single-node rewrite rule
///
/// Passes never see a node's children first-hand; the pipeline has already
/// rewritten them by the time the parent is applied.
pub trait RewritePass {
    /// Pass name, used in metrics and logs
    fn name(&self) -> &'static str;

    /// Rewrite one node
    fn apply(&mut self, node: Node) -> Rewrite;

    /// Current counters
    fn metrics(&self) -> MetricsSnapshot;
}
