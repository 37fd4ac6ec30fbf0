//! Dead-code elimination
//!
//! Two rewrites: an `if` on a literal boolean collapses to the branch that
//! runs, and a block drops every statement after its first `return`.
//! `break` and `continue` do not end a block here.

use tn_syntax::{Block, ExprKind, Node, Stmt, StmtKind};

use crate::metrics::{MetricsSnapshot, PassMetrics};
use crate::{Rewrite, RewritePass};

/// Removes statements and branches that can never run
#[derive(Debug, Default)]
pub struct DeadCodeElimination {
    metrics: PassMetrics,
}

impl DeadCodeElimination {
    /// Creates the pass with zeroed metrics
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn rewrite_if(&mut self, stmt: Stmt) -> Rewrite {
        let known = match &stmt.kind {
            StmtKind::If { condition, .. } => match &condition.kind {
                ExprKind::Literal(literal) => literal.as_bool(),
                _ => None,
            },
            _ => None,
        };
        let Some(value) = known else {
            return Rewrite::unchanged(Node::Stmt(stmt));
        };

        self.metrics.dead_code_removed += 1;
        self.metrics.nodes_optimized += 1;
        tracing::trace!(condition = value, "collapsed constant if");
        match (value, stmt.kind) {
            (true, StmtKind::If { then_branch, .. }) => Rewrite::replaced(Node::Block(then_branch)),
            (
                false,
                StmtKind::If {
                    else_branch: Some(else_branch),
                    ..
                },
            ) => Rewrite::replaced(Node::Block(else_branch)),
            // `false` with no else branch
            _ => Rewrite::removed(),
        }
    }

    fn rewrite_block(&mut self, mut block: Block) -> Rewrite {
        let terminator = block
            .stmts
            .iter()
            .position(|stmt| matches!(stmt.kind, StmtKind::Return(_)));
        match terminator {
            Some(index) if index + 1 < block.stmts.len() => {
                let removed = block.stmts.len() - index - 1;
                block.stmts.truncate(index + 1);
                self.metrics.dead_code_removed += removed as u64;
                self.metrics.nodes_optimized += 1;
                tracing::trace!(removed, "pruned statements after return");
                Rewrite::replaced(Node::Block(block))
            }
            _ => Rewrite::unchanged(Node::Block(block)),
        }
    }
}

impl RewritePass for DeadCodeElimination {
    fn name(&self) -> &'static str {
        "dead-code-elimination"
    }

    fn apply(&mut self, node: Node) -> Rewrite {
        self.metrics.nodes_processed += 1;
        match node {
            Node::Stmt(stmt) => self.rewrite_if(stmt),
            Node::Block(block) => self.rewrite_block(block),
            other => Rewrite::unchanged(other),
        }
    }

    fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tn_syntax::AstBuilder;

    fn branches(b: &AstBuilder) -> (Block, Block) {
        (
            b.block(vec![b.expr_stmt(b.ident("a"))]),
            b.block(vec![b.expr_stmt(b.ident("b"))]),
        )
    }

    #[test]
    fn test_true_condition_keeps_then_branch() {
        let b = AstBuilder::new();
        let (then_branch, else_branch) = branches(&b);
        let stmt = b.if_stmt(b.bool_lit(true), then_branch.clone(), Some(else_branch));
        let rewrite = DeadCodeElimination::new().apply(Node::Stmt(stmt));
        assert!(rewrite.changed);
        assert_eq!(rewrite.node, Some(Node::Block(then_branch)));
    }

    #[test]
    fn test_false_condition_keeps_else_branch() {
        let b = AstBuilder::new();
        let (then_branch, else_branch) = branches(&b);
        let stmt = b.if_stmt(b.bool_lit(false), then_branch, Some(else_branch.clone()));
        let rewrite = DeadCodeElimination::new().apply(Node::Stmt(stmt));
        assert_eq!(rewrite.node, Some(Node::Block(else_branch)));
    }

    #[test]
    fn test_false_without_else_is_removed() {
        let b = AstBuilder::new();
        let (then_branch, _) = branches(&b);
        let rewrite =
            DeadCodeElimination::new().apply(Node::Stmt(b.if_stmt(b.bool_lit(false), then_branch, None)));
        assert!(rewrite.changed);
        assert_eq!(rewrite.node, None);
    }

    #[test]
    fn test_non_literal_condition_untouched() {
        let b = AstBuilder::new();
        let (then_branch, _) = branches(&b);
        let stmt = b.if_stmt(b.ident("flag"), then_branch, None);
        let rewrite = DeadCodeElimination::new().apply(Node::Stmt(stmt.clone()));
        assert_eq!(rewrite, Rewrite::unchanged(Node::Stmt(stmt)));
    }

    #[test]
    fn test_statements_after_return_pruned() {
        let b = AstBuilder::new();
        let block = b.block(vec![
            b.return_stmt(Some(b.int(1))),
            b.expr_stmt(b.ident("s2")),
            b.expr_stmt(b.ident("s3")),
        ]);
        let mut pass = DeadCodeElimination::new();
        let rewrite = pass.apply(Node::Block(block));
        assert_eq!(
            rewrite.node,
            Some(Node::Block(b.block(vec![b.return_stmt(Some(b.int(1)))])))
        );
        assert_eq!(pass.metrics().dead_code_removed, 2);
    }

    #[test]
    fn test_break_is_not_a_terminator() {
        let b = AstBuilder::new();
        let block = b.block(vec![b.break_stmt(), b.expr_stmt(b.ident("after"))]);
        assert!(!DeadCodeElimination::new().apply(Node::Block(block)).changed);
    }

    #[test]
    fn test_trailing_return_untouched() {
        let b = AstBuilder::new();
        let block = b.block(vec![b.expr_stmt(b.ident("x")), b.return_stmt(None)]);
        assert!(!DeadCodeElimination::new().apply(Node::Block(block)).changed);
    }
}
