//! Constant folding
//!
//! Only expressions whose operands are already literals are folded. Integer
//! arithmetic is checked: division or remainder by zero and results outside
//! `i64` are left for runtime. Folded values are written in canonical text,
//! so folding a folded literal again changes nothing.

use tn_syntax::{
    BinaryOp, Expr, ExprKind, Literal, LiteralKind, Node, UnaryOp, normalize_integer_text,
};

use crate::metrics::{MetricsSnapshot, PassMetrics};
use crate::{Rewrite, RewritePass};

/// Folds literal-only operations to literals
#[derive(Debug, Default)]
pub struct ConstantFolding {
    metrics: PassMetrics,
}

impl ConstantFolding {
    /// Creates the pass with zeroed metrics
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one expression without visiting its operands' operands
    pub fn fold_expr(&mut self, expr: Expr) -> (Expr, bool) {
        let folded = match &expr.kind {
            ExprKind::Binary { op, lhs, rhs } => match (&lhs.kind, &rhs.kind) {
                (ExprKind::Literal(lhs), ExprKind::Literal(rhs)) => fold_binary(*op, lhs, rhs),
                _ => None,
            },
            ExprKind::Unary { op, operand } => match &operand.kind {
                ExprKind::Literal(literal) => fold_unary(*op, literal),
                _ => None,
            },
            ExprKind::Literal(literal) => {
                return match normalize_literal(literal) {
                    Some(normalized) => {
                        self.metrics.nodes_optimized += 1;
                        (literal_expr(normalized, &expr), true)
                    }
                    None => (expr, false),
                };
            }
            _ => None,
        };

        match folded {
            Some(literal) => {
                tracing::trace!(kind = %literal.kind, text = %literal.text, "folded constant");
                self.metrics.constants_folded += 1;
                self.metrics.nodes_optimized += 1;
                (literal_expr(literal, &expr), true)
            }
            None => (expr, false),
        }
    }
}

impl RewritePass for ConstantFolding {
    fn name(&self) -> &'static str {
        "constant-folding"
    }

    fn apply(&mut self, node: Node) -> Rewrite {
        self.metrics.nodes_processed += 1;
        match node {
            Node::Expr(expr) => {
                let (expr, changed) = self.fold_expr(expr);
                Rewrite {
                    node: Some(Node::Expr(expr)),
                    changed,
                }
            }
            other => Rewrite::unchanged(other),
        }
    }

    fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot(self.name())
    }
}

fn literal_expr(literal: Literal, original: &Expr) -> Expr {
    Expr {
        kind: ExprKind::Literal(literal),
        span: original.span,
    }
}

fn int(value: i64) -> Literal {
    Literal::new(LiteralKind::Integer, value.to_string())
}

fn boolean(value: bool) -> Literal {
    Literal::new(LiteralKind::Boolean, if value { "true" } else { "false" })
}

/// Canonical integer text, when it differs from what is written
fn normalize_literal(literal: &Literal) -> Option<Literal> {
    if literal.kind != LiteralKind::Integer {
        return None;
    }
    let canonical = normalize_integer_text(&literal.text)?;
    (canonical != literal.text).then(|| Literal::new(LiteralKind::Integer, canonical))
}

fn fold_binary(op: BinaryOp, lhs: &Literal, rhs: &Literal) -> Option<Literal> {
    // Operands of different kinds never fold, not even `==`.
    if lhs.kind != rhs.kind {
        return None;
    }
    match lhs.kind {
        LiteralKind::Integer => fold_integers(op, lhs.as_integer()?, rhs.as_integer()?),
        LiteralKind::String => match op {
            BinaryOp::Add => Some(Literal::new(
                LiteralKind::String,
                format!("{}{}", lhs.text, rhs.text),
            )),
            BinaryOp::Eq => Some(boolean(lhs.text == rhs.text)),
            BinaryOp::Ne => Some(boolean(lhs.text != rhs.text)),
            _ => None,
        },
        LiteralKind::Boolean => {
            let (a, b) = (lhs.as_bool()?, rhs.as_bool()?);
            match op {
                BinaryOp::And => Some(boolean(a && b)),
                BinaryOp::Or => Some(boolean(a || b)),
                BinaryOp::Eq => Some(boolean(a == b)),
                BinaryOp::Ne => Some(boolean(a != b)),
                _ => None,
            }
        }
        LiteralKind::Float => {
            let a: f64 = lhs.text.replace('_', "").parse().ok()?;
            let b: f64 = rhs.text.replace('_', "").parse().ok()?;
            match op {
                BinaryOp::Eq => Some(boolean(a == b)),
                BinaryOp::Ne => Some(boolean(a != b)),
                _ => None,
            }
        }
        LiteralKind::Char => match op {
            BinaryOp::Eq => Some(boolean(lhs.text == rhs.text)),
            BinaryOp::Ne => Some(boolean(lhs.text != rhs.text)),
            _ => None,
        },
    }
}

fn fold_integers(op: BinaryOp, a: i64, b: i64) -> Option<Literal> {
    let literal = match op {
        BinaryOp::Add => int(a.checked_add(b)?),
        BinaryOp::Sub => int(a.checked_sub(b)?),
        BinaryOp::Mul => int(a.checked_mul(b)?),
        BinaryOp::Div => int(a.checked_div(b)?),
        BinaryOp::Mod => int(a.checked_rem(b)?),
        BinaryOp::Eq => boolean(a == b),
        BinaryOp::Ne => boolean(a != b),
        BinaryOp::Lt => boolean(a < b),
        BinaryOp::Gt => boolean(a > b),
        BinaryOp::Le => boolean(a <= b),
        BinaryOp::Ge => boolean(a >= b),
        BinaryOp::And | BinaryOp::Or => return None,
    };
    Some(literal)
}

fn fold_unary(op: UnaryOp, operand: &Literal) -> Option<Literal> {
    match op {
        UnaryOp::Neg => operand.as_integer()?.checked_neg().map(int),
        UnaryOp::Not => operand.as_bool().map(|value| boolean(!value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tn_syntax::AstBuilder;

    fn fold(expr: Expr) -> (Expr, bool) {
        ConstantFolding::new().fold_expr(expr)
    }

    #[test]
    fn test_integer_addition() {
        let b = AstBuilder::new();
        let (expr, changed) = fold(b.binary(BinaryOp::Add, b.int(1), b.int(2)));
        assert!(changed);
        assert_eq!(expr, b.int(3));
    }

    #[test]
    fn test_string_concatenation() {
        let b = AstBuilder::new();
        let (expr, changed) = fold(b.binary(BinaryOp::Add, b.string("a"), b.string("b")));
        assert!(changed);
        assert_eq!(expr, b.string("ab"));
    }

    #[test]
    fn test_division_by_zero_untouched() {
        let b = AstBuilder::new();
        for op in [BinaryOp::Div, BinaryOp::Mod] {
            let input = b.binary(op, b.int(7), b.int(0));
            let (expr, changed) = fold(input.clone());
            assert!(!changed);
            assert_eq!(expr, input);
        }
    }

    #[test]
    fn test_overflow_untouched() {
        let b = AstBuilder::new();
        let input = b.binary(BinaryOp::Add, b.int(i64::MAX), b.int(1));
        assert!(!fold(input).1);
        assert!(!fold(b.unary(UnaryOp::Neg, b.int(i64::MIN))).1);
    }

    #[test]
    fn test_logical_requires_both_booleans() {
        let b = AstBuilder::new();
        let (expr, changed) = fold(b.binary(BinaryOp::And, b.bool_lit(true), b.bool_lit(false)));
        assert!(changed);
        assert_eq!(expr, b.bool_lit(false));

        let partial = b.binary(BinaryOp::Or, b.bool_lit(true), b.ident("x"));
        assert!(!fold(partial).1);
    }

    #[test]
    fn test_mismatched_kinds_do_not_fold() {
        let b = AstBuilder::new();
        assert!(!fold(b.binary(BinaryOp::Eq, b.int(1), b.string("1"))).1);
        assert!(!fold(b.binary(BinaryOp::Lt, b.string("a"), b.string("b"))).1);
    }

    #[test]
    fn test_comparisons() {
        let b = AstBuilder::new();
        assert_eq!(fold(b.binary(BinaryOp::Le, b.int(2), b.int(2))).0, b.bool_lit(true));
        assert_eq!(
            fold(b.binary(BinaryOp::Ne, b.char_lit('a'), b.char_lit('b'))).0,
            b.bool_lit(true)
        );
        assert_eq!(
            fold(b.binary(BinaryOp::Eq, b.float("1.0"), b.float("1.00"))).0,
            b.bool_lit(true)
        );
    }

    #[test]
    fn test_unary() {
        let b = AstBuilder::new();
        assert_eq!(fold(b.unary(UnaryOp::Neg, b.int(5))).0, b.int(-5));
        assert_eq!(fold(b.unary(UnaryOp::Not, b.bool_lit(true))).0, b.bool_lit(false));
        assert!(!fold(b.unary(UnaryOp::Not, b.int(1))).1);
    }

    #[test]
    fn test_non_literal_operand_untouched() {
        let b = AstBuilder::new();
        let input = b.binary(BinaryOp::Mul, b.ident("x"), b.int(2));
        let (expr, changed) = fold(input.clone());
        assert!(!changed);
        assert_eq!(expr, input);
    }

    #[test]
    fn test_normalization_is_not_a_fold() {
        let b = AstBuilder::new();
        let mut pass = ConstantFolding::new();
        let (expr, changed) = pass.fold_expr(b.literal(LiteralKind::Integer, "0x10"));
        assert!(changed);
        assert_eq!(expr, b.int(16));
        let metrics = pass.metrics.snapshot("constant-folding");
        assert_eq!(metrics.constants_folded, 0);
        assert_eq!(metrics.nodes_optimized, 1);
    }

    #[test]
    fn test_idempotent() {
        let b = AstBuilder::new();
        let inputs = [
            b.binary(BinaryOp::Sub, b.int(10), b.int(4)),
            b.binary(BinaryOp::Add, b.string("x"), b.string("y")),
            b.binary(BinaryOp::Or, b.bool_lit(false), b.bool_lit(false)),
            b.unary(UnaryOp::Neg, b.int(3)),
            b.literal(LiteralKind::Integer, "007"),
        ];
        let mut pass = ConstantFolding::new();
        for input in inputs {
            let (once, changed) = pass.fold_expr(input);
            assert!(changed);
            let (twice, again) = pass.fold_expr(once.clone());
            assert!(!again);
            assert_eq!(twice, once);
        }
    }

    #[test]
    fn test_apply_counts_processed_nodes() {
        let b = AstBuilder::new();
        let mut pass = ConstantFolding::new();
        let rewrite = pass.apply(Node::Expr(b.binary(BinaryOp::Mul, b.int(3), b.int(4))));
        assert!(rewrite.changed);
        assert_eq!(rewrite.node, Some(Node::Expr(b.int(12))));
        pass.apply(Node::Stmt(b.break_stmt()));
        let metrics = pass.metrics();
        assert_eq!(metrics.nodes_processed, 2);
        assert_eq!(metrics.constants_folded, 1);
    }
}
