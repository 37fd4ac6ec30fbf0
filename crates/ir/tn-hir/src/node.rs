//! Uniform node capabilities over IR body nodes
//!
//! IR children are arena indices, so replacing a child rewires an index
//! rather than moving a subtree.

use derive_more::Display;
use thiserror::Error;
use tn_span::FileSpan;

use crate::body::{Expr, ExprId, Pattern, PatternId, Stmt, StmtId};

/// Kind tag of an IR body node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum HirNodeKind {
    /// Literal expression
    Literal,
    /// Variable reference
    Variable,
    /// Binary expression
    Binary,
    /// Unary expression
    Unary,
    /// Call expression
    Call,
    /// Field access
    Field,
    /// Block expression
    Block,
    /// Lowering placeholder
    Missing,
    /// `let`
    Let,
    /// Expression statement
    ExprStmt,
    /// Assignment
    Assign,
    /// `return`
    Return,
    /// `break`
    Break,
    /// `continue`
    Continue,
    /// `if`
    If,
    /// `while`
    While,
    /// `for`
    For,
    /// Binding pattern
    Binding,
    /// Wildcard pattern
    Wildcard,
}

/// Reference to a child node inside the same body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HirChild {
    /// Expression child
    Expr(ExprId),
    /// Statement child
    Stmt(StmtId),
    /// Pattern child
    Pattern(PatternId),
}

impl HirChild {
    const fn family(self) -> &'static str {
        match self {
            Self::Expr(_) => "expression",
            Self::Stmt(_) => "statement",
            Self::Pattern(_) => "pattern",
        }
    }
}

/// Failure to rewire a child index
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HirChildError {
    /// The index names no child
    #[error("{kind} node has {len} children, index {index} is out of bounds")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Number of children
        len: usize,
        /// Parent kind
        kind: HirNodeKind,
    },
    /// The replacement is a different node family than the slot
    #[error("child {index} expects a {expected}, found a {found}")]
    FamilyMismatch {
        /// Requested index
        index: usize,
        /// Family the slot holds
        expected: &'static str,
        /// Family offered
        found: &'static str,
    },
}

/// Capabilities shared by IR body nodes
pub trait HirNode: Clone + PartialEq {
    /// Kind tag
    fn kind(&self) -> HirNodeKind;

    /// Source location
    fn span(&self) -> FileSpan;

    /// Direct children in slot order
    fn children(&self) -> Vec<HirChild>;

    /// Points child slot `index` at `child`
    fn replace_child(&mut self, index: usize, child: HirChild) -> Result<(), HirChildError>;
}

fn check_slot(
    children: &[HirChild],
    index: usize,
    child: HirChild,
    kind: HirNodeKind,
) -> Result<(), HirChildError> {
    let Some(existing) = children.get(index) else {
        return Err(HirChildError::IndexOutOfBounds {
            index,
            len: children.len(),
            kind,
        });
    };
    if existing.family() != child.family() {
        return Err(HirChildError::FamilyMismatch {
            index,
            expected: existing.family(),
            found: child.family(),
        });
    }
    Ok(())
}

impl HirNode for Expr {
    fn kind(&self) -> HirNodeKind {
        match self {
            Self::Literal { .. } => HirNodeKind::Literal,
            Self::Variable { .. } => HirNodeKind::Variable,
            Self::Binary { .. } => HirNodeKind::Binary,
            Self::Unary { .. } => HirNodeKind::Unary,
            Self::Call { .. } => HirNodeKind::Call,
            Self::Field { .. } => HirNodeKind::Field,
            Self::Block { .. } => HirNodeKind::Block,
            Self::Missing { .. } => HirNodeKind::Missing,
        }
    }

    fn span(&self) -> FileSpan {
        match self {
            Self::Literal { span, .. }
            | Self::Variable { span, .. }
            | Self::Binary { span, .. }
            | Self::Unary { span, .. }
            | Self::Call { span, .. }
            | Self::Field { span, .. }
            | Self::Block { span, .. }
            | Self::Missing { span } => *span,
        }
    }

    fn children(&self) -> Vec<HirChild> {
        match self {
            Self::Binary { lhs, rhs, .. } => vec![HirChild::Expr(*lhs), HirChild::Expr(*rhs)],
            Self::Unary { operand, .. } => vec![HirChild::Expr(*operand)],
            Self::Call { callee, args, .. } => std::iter::once(*callee)
                .chain(args.iter().copied())
                .map(HirChild::Expr)
                .collect(),
            Self::Field { base, .. } => vec![HirChild::Expr(*base)],
            Self::Block { stmts, tail, .. } => stmts
                .iter()
                .copied()
                .map(HirChild::Stmt)
                .chain(tail.map(HirChild::Expr))
                .collect(),
            Self::Literal { .. } | Self::Variable { .. } | Self::Missing { .. } => Vec::new(),
        }
    }

    fn replace_child(&mut self, index: usize, child: HirChild) -> Result<(), HirChildError> {
        check_slot(&self.children(), index, child, self.kind())?;
        match (self, child) {
            (Self::Binary { lhs, .. }, HirChild::Expr(id)) if index == 0 => *lhs = id,
            (Self::Binary { rhs, .. }, HirChild::Expr(id)) => *rhs = id,
            (Self::Unary { operand, .. }, HirChild::Expr(id)) => *operand = id,
            (Self::Call { callee, .. }, HirChild::Expr(id)) if index == 0 => *callee = id,
            (Self::Call { args, .. }, HirChild::Expr(id)) => args[index - 1] = id,
            (Self::Field { base, .. }, HirChild::Expr(id)) => *base = id,
            (Self::Block { stmts, .. }, HirChild::Stmt(id)) => stmts[index] = id,
            (Self::Block { tail, .. }, HirChild::Expr(id)) => *tail = Some(id),
            _ => {}
        }
        Ok(())
    }
}

impl HirNode for Stmt {
    fn kind(&self) -> HirNodeKind {
        match self {
            Self::Let { .. } => HirNodeKind::Let,
            Self::Expr { .. } => HirNodeKind::ExprStmt,
            Self::Assign { .. } => HirNodeKind::Assign,
            Self::Return { .. } => HirNodeKind::Return,
            Self::Break { .. } => HirNodeKind::Break,
            Self::Continue { .. } => HirNodeKind::Continue,
            Self::If { .. } => HirNodeKind::If,
            Self::While { .. } => HirNodeKind::While,
            Self::For { .. } => HirNodeKind::For,
        }
    }

    fn span(&self) -> FileSpan {
        match self {
            Self::Let { span, .. }
            | Self::Expr { span, .. }
            | Self::Assign { span, .. }
            | Self::Return { span, .. }
            | Self::Break { span }
            | Self::Continue { span }
            | Self::If { span, .. }
            | Self::While { span, .. }
            | Self::For { span, .. } => *span,
        }
    }

    fn children(&self) -> Vec<HirChild> {
        match self {
            Self::Let { pattern, init, .. } => std::iter::once(HirChild::Pattern(*pattern))
                .chain(init.map(HirChild::Expr))
                .collect(),
            Self::Expr { expr, .. } => vec![HirChild::Expr(*expr)],
            Self::Assign { target, value, .. } => {
                vec![HirChild::Expr(*target), HirChild::Expr(*value)]
            }
            Self::Return { value, .. } => value.map(HirChild::Expr).into_iter().collect(),
            Self::Break { .. } | Self::Continue { .. } => Vec::new(),
            Self::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => [Some(*condition), Some(*then_branch), *else_branch]
                .into_iter()
                .flatten()
                .map(HirChild::Expr)
                .collect(),
            Self::While {
                condition, body, ..
            } => vec![HirChild::Expr(*condition), HirChild::Expr(*body)],
            Self::For {
                binding,
                iterable,
                body,
                ..
            } => vec![
                HirChild::Pattern(*binding),
                HirChild::Expr(*iterable),
                HirChild::Expr(*body),
            ],
        }
    }

    fn replace_child(&mut self, index: usize, child: HirChild) -> Result<(), HirChildError> {
        check_slot(&self.children(), index, child, self.kind())?;
        match (self, child) {
            (Self::Let { pattern, .. } | Self::For { binding: pattern, .. }, HirChild::Pattern(id)) => {
                *pattern = id;
            }
            (Self::Let { init, .. }, HirChild::Expr(id)) => *init = Some(id),
            (Self::Expr { expr, .. }, HirChild::Expr(id)) => *expr = id,
            (Self::Assign { target, .. }, HirChild::Expr(id)) if index == 0 => *target = id,
            (Self::Assign { value, .. }, HirChild::Expr(id)) => *value = id,
            (Self::Return { value, .. }, HirChild::Expr(id)) => *value = Some(id),
            (Self::If { condition, .. } | Self::While { condition, .. }, HirChild::Expr(id))
                if index == 0 =>
            {
                *condition = id;
            }
            (Self::If { then_branch, .. }, HirChild::Expr(id)) if index == 1 => *then_branch = id,
            (Self::If { else_branch, .. }, HirChild::Expr(id)) => *else_branch = Some(id),
            (Self::While { body, .. }, HirChild::Expr(id)) => *body = id,
            (Self::For { iterable, .. }, HirChild::Expr(id)) if index == 1 => *iterable = id,
            (Self::For { body, .. }, HirChild::Expr(id)) => *body = id,
            _ => {}
        }
        Ok(())
    }
}

impl HirNode for Pattern {
    fn kind(&self) -> HirNodeKind {
        match self {
            Self::Binding { .. } => HirNodeKind::Binding,
            Self::Wildcard { .. } => HirNodeKind::Wildcard,
        }
    }

    fn span(&self) -> FileSpan {
        match self {
            Self::Binding { span, .. } | Self::Wildcard { span } => *span,
        }
    }

    fn children(&self) -> Vec<HirChild> {
        Vec::new()
    }

    fn replace_child(&mut self, index: usize, child: HirChild) -> Result<(), HirChildError> {
        check_slot(&[], index, child, self.kind())
    }
}
