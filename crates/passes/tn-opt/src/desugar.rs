//! Compound-assignment desugaring
//!
//! `target op= value` becomes `target = target op value`. The operand copy
//! of `target` is an independent deep clone, not a shared subtree.

use tn_syntax::{Expr, ExprKind, Node};

use crate::metrics::{MetricsSnapshot, PassMetrics};
use crate::{Rewrite, RewritePass};

/// Expands compound assignments
#[derive(Debug, Default)]
pub struct SugarRemoval {
    metrics: PassMetrics,
}

impl SugarRemoval {
    /// Creates the pass with zeroed metrics
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Rewrites a compound assignment into a plain one, or hands the expression back
pub fn desugar_compound_assign(expr: Expr) -> Result<Expr, Expr> {
    let Expr { kind, span } = expr;
    match kind {
        ExprKind::CompoundAssign { op, target, value } => {
            let operand = target.clone();
            Ok(Expr {
                kind: ExprKind::Assign {
                    target,
                    value: Box::new(Expr {
                        kind: ExprKind::Binary {
                            op: op.binary_op(),
                            lhs: operand,
                            rhs: value,
                        },
                        span,
                    }),
                },
                span,
            })
        }
        kind => Err(Expr { kind, span }),
    }
}

impl RewritePass for SugarRemoval {
    fn name(&self) -> &'static str {
        "syntax-sugar-removal"
    }

    fn apply(&mut self, node: Node) -> Rewrite {
        self.metrics.nodes_processed += 1;
        let expr = match node {
            Node::Expr(expr) => expr,
            other => return Rewrite::unchanged(other),
        };
        match desugar_compound_assign(expr) {
            Ok(expr) => {
                self.metrics.syntax_sugar_removed += 1;
                self.metrics.nodes_optimized += 1;
                tracing::trace!("desugared compound assignment");
                Rewrite::replaced(Node::Expr(expr))
            }
            Err(expr) => Rewrite::unchanged(Node::Expr(expr)),
        }
    }

    fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot(self.name())
    }
}
