//! Uniform node capabilities over the syntax tree
//!
//! Rewrite passes never look at concrete node types to traverse: they use
//! [`AstNode::children`] to enumerate and [`AstNode::replace_child`] /
//! [`AstNode::remove_child`] to splice in results. Child `i` reported by
//! `children()` is always the slot `replace_child(i, _)` writes.

use crate::ast::{Block, Decl, DeclKind, Expr, ExprKind, Stmt, StmtKind};
use derive_more::Display;
use std::fmt;
use thiserror::Error;
use tn_span::FileSpan;

/// Fine-grained node kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum NodeKind {
    /// Function declaration
    Function,
    /// Struct declaration
    Struct,
    /// Enum declaration
    Enum,
    /// Trait declaration
    Trait,
    /// Impl block
    Impl,
    /// Import declaration
    Import,
    /// Export declaration
    Export,
    /// Type alias
    TypeAlias,
    /// Newtype
    Newtype,
    /// Module-level variable
    Variable,
    /// `let` statement
    Let,
    /// Expression statement
    ExprStmt,
    /// `return`
    Return,
    /// `break`
    Break,
    /// `continue`
    Continue,
    /// Block, either standalone or as a statement
    Block,
    /// `if`
    If,
    /// `while`
    While,
    /// `for`
    For,
    /// Literal
    Literal,
    /// Identifier
    Identifier,
    /// Binary expression
    Binary,
    /// Unary expression
    Unary,
    /// Call
    Call,
    /// Field access
    Field,
    /// Assignment
    Assign,
    /// Compound assignment
    CompoundAssign,
    /// Unrecognized syntax in any position
    Unknown,
}

/// Coarse node family, used for child-slot compatibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum NodeCategory {
    /// Declarations
    #[display("declaration")]
    Decl,
    /// Statements
    #[display("statement")]
    Stmt,
    /// Blocks
    #[display("block")]
    Block,
    /// Expressions
    #[display("expression")]
    Expr,
}

/// Failure to splice a child into a node
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplaceChildError {
    /// The index names no child
    #[error("{kind} node has {len} children, index {index} is out of bounds")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Number of children
        len: usize,
        /// Parent kind
        kind: NodeKind,
    },

    /// The replacement cannot occupy the slot
    #[error("child {index} expects a {expected}, found a {found}")]
    CategoryMismatch {
        /// Requested index
        index: usize,
        /// Category the slot holds
        expected: NodeCategory,
        /// Category offered
        found: NodeCategory,
    },

    /// The slot is mandatory and cannot be deleted
    #[error("child {index} of a {kind} node cannot be removed")]
    NotRemovable {
        /// Requested index
        index: usize,
        /// Parent kind
        kind: NodeKind,
    },
}

/// An owned node of any family
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Declaration
    Decl(Decl),
    /// Statement
    Stmt(Stmt),
    /// Block
    Block(Block),
    /// Expression
    Expr(Expr),
}

/// A borrowed node of any family
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeRef<'a> {
    /// Declaration
    Decl(&'a Decl),
    /// Statement
    Stmt(&'a Stmt),
    /// Block
    Block(&'a Block),
    /// Expression
    Expr(&'a Expr),
}

/// Capabilities shared by every syntax-tree node
///
/// Deep clone and structural equality come from the `Clone` and
/// `PartialEq` supertraits.
pub trait AstNode: Clone + PartialEq + fmt::Debug {
    /// Kind tag of this node
    fn kind(&self) -> NodeKind;

    /// Source location
    fn span(&self) -> FileSpan;

    /// Direct children, in slot order
    fn children(&self) -> Vec<NodeRef<'_>>;

    /// Replaces child `index` with `node`.
    ///
    /// A statement slot accepts a block (it becomes a block statement) and a
    /// block slot accepts a statement (it is wrapped in a block). On error
    /// `self` is left untouched.
    fn replace_child(&mut self, index: usize, node: Node) -> Result<(), ReplaceChildError>;

    /// Deletes child `index` from a list-shaped slot, returning it.
    fn remove_child(&mut self, index: usize) -> Result<Node, ReplaceChildError> {
        let len = self.children().len();
        if index >= len {
            return Err(ReplaceChildError::IndexOutOfBounds {
                index,
                len,
                kind: self.kind(),
            });
        }
        Err(ReplaceChildError::NotRemovable {
            index,
            kind: self.kind(),
        })
    }

    /// Number of direct children
    fn child_count(&self) -> usize {
        self.children().len()
    }
}

impl Node {
    /// Family of this node
    #[must_use]
    pub const fn category(&self) -> NodeCategory {
        match self {
            Self::Decl(_) => NodeCategory::Decl,
            Self::Stmt(_) => NodeCategory::Stmt,
            Self::Block(_) => NodeCategory::Block,
            Self::Expr(_) => NodeCategory::Expr,
        }
    }

    /// Borrows this node
    #[must_use]
    pub const fn as_ref(&self) -> NodeRef<'_> {
        match self {
            Self::Decl(decl) => NodeRef::Decl(decl),
            Self::Stmt(stmt) => NodeRef::Stmt(stmt),
            Self::Block(block) => NodeRef::Block(block),
            Self::Expr(expr) => NodeRef::Expr(expr),
        }
    }

    /// Converts into an expression, or reports the actual category
    pub fn into_expr(self) -> Result<Expr, NodeCategory> {
        match self {
            Self::Expr(expr) => Ok(expr),
            other => Err(other.category()),
        }
    }

    /// Converts into a declaration, or reports the actual category
    pub fn into_decl(self) -> Result<Decl, NodeCategory> {
        match self {
            Self::Decl(decl) => Ok(decl),
            other => Err(other.category()),
        }
    }

    /// Converts into a statement; a block becomes a block statement
    pub fn into_stmt(self) -> Result<Stmt, NodeCategory> {
        match self {
            Self::Stmt(stmt) => Ok(stmt),
            Self::Block(block) => Ok(Stmt {
                span: block.span,
                kind: StmtKind::Block(block),
            }),
            other => Err(other.category()),
        }
    }

    /// Converts into a block; a block statement is unwrapped and any other
    /// statement becomes a one-statement block
    pub fn into_block(self) -> Result<Block, NodeCategory> {
        match self {
            Self::Block(block) => Ok(block),
            Self::Stmt(Stmt {
                kind: StmtKind::Block(block),
                ..
            }) => Ok(block),
            Self::Stmt(stmt) => {
                let span = stmt.span;
                Ok(Block::new(vec![stmt], span))
            }
            other => Err(other.category()),
        }
    }
}

impl NodeRef<'_> {
    /// Deep-clones the referenced node
    #[must_use]
    pub fn to_node(self) -> Node {
        match self {
            Self::Decl(decl) => Node::Decl(decl.clone()),
            Self::Stmt(stmt) => Node::Stmt(stmt.clone()),
            Self::Block(block) => Node::Block(block.clone()),
            Self::Expr(expr) => Node::Expr(expr.clone()),
        }
    }

    /// Node family
    #[must_use]
    pub const fn category(self) -> NodeCategory {
        match self {
            Self::Decl(_) => NodeCategory::Decl,
            Self::Stmt(_) => NodeCategory::Stmt,
            Self::Block(_) => NodeCategory::Block,
            Self::Expr(_) => NodeCategory::Expr,
        }
    }

    /// Kind of the referenced node
    #[must_use]
    pub fn kind(self) -> NodeKind {
        match self {
            Self::Decl(decl) => decl.kind(),
            Self::Stmt(stmt) => stmt.kind(),
            Self::Block(block) => block.kind(),
            Self::Expr(expr) => expr.kind(),
        }
    }

    /// Location of the referenced node
    #[must_use]
    pub fn span(self) -> FileSpan {
        match self {
            Self::Decl(decl) => decl.span,
            Self::Stmt(stmt) => stmt.span,
            Self::Block(block) => block.span,
            Self::Expr(expr) => expr.span,
        }
    }
}

fn out_of_bounds(index: usize, len: usize, kind: NodeKind) -> ReplaceChildError {
    ReplaceChildError::IndexOutOfBounds { index, len, kind }
}

fn mismatch(index: usize, expected: NodeCategory, found: NodeCategory) -> ReplaceChildError {
    ReplaceChildError::CategoryMismatch {
        index,
        expected,
        found,
    }
}

impl AstNode for Expr {
    fn kind(&self) -> NodeKind {
        match &self.kind {
            ExprKind::Literal(_) => NodeKind::Literal,
            ExprKind::Identifier(_) => NodeKind::Identifier,
            ExprKind::Binary { .. } => NodeKind::Binary,
            ExprKind::Unary { .. } => NodeKind::Unary,
            ExprKind::Call { .. } => NodeKind::Call,
            ExprKind::Field { .. } => NodeKind::Field,
            ExprKind::Assign { .. } => NodeKind::Assign,
            ExprKind::CompoundAssign { .. } => NodeKind::CompoundAssign,
            ExprKind::Unknown(_) => NodeKind::Unknown,
        }
    }

    fn span(&self) -> FileSpan {
        self.span
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        match &self.kind {
            ExprKind::Binary { lhs, rhs, .. } => vec![NodeRef::Expr(lhs), NodeRef::Expr(rhs)],
            ExprKind::Unary { operand, .. } => vec![NodeRef::Expr(operand)],
            ExprKind::Call { callee, args } => std::iter::once(NodeRef::Expr(&**callee))
                .chain(args.iter().map(NodeRef::Expr))
                .collect(),
            ExprKind::Field { base, .. } => vec![NodeRef::Expr(base)],
            ExprKind::Assign { target, value } | ExprKind::CompoundAssign { target, value, .. } => {
                vec![NodeRef::Expr(target), NodeRef::Expr(value)]
            }
            ExprKind::Literal(_) | ExprKind::Identifier(_) | ExprKind::Unknown(_) => Vec::new(),
        }
    }

    fn replace_child(&mut self, index: usize, node: Node) -> Result<(), ReplaceChildError> {
        let kind = self.kind();
        let len = self.child_count();
        if index >= len {
            return Err(out_of_bounds(index, len, kind));
        }
        let replacement = node
            .into_expr()
            .map_err(|found| mismatch(index, NodeCategory::Expr, found))?;

        let slot = match (&mut self.kind, index) {
            (ExprKind::Binary { lhs, .. }, 0) => lhs,
            (ExprKind::Binary { rhs, .. }, _) => rhs,
            (ExprKind::Unary { operand, .. }, _) => operand,
            (ExprKind::Call { callee, .. }, 0) => callee,
            (ExprKind::Call { args, .. }, _) => {
                args[index - 1] = replacement;
                return Ok(());
            }
            (ExprKind::Field { base, .. }, _) => base,
            (
                ExprKind::Assign { target, .. } | ExprKind::CompoundAssign { target, .. },
                0,
            ) => target,
            (ExprKind::Assign { value, .. } | ExprKind::CompoundAssign { value, .. }, _) => value,
            (ExprKind::Literal(_) | ExprKind::Identifier(_) | ExprKind::Unknown(_), _) => {
                return Err(out_of_bounds(index, 0, kind));
            }
        };
        **slot = replacement;
        Ok(())
    }
}

impl Stmt {
    /// Category of the slot at `index`, if it exists
    fn slot_category(&self, index: usize) -> Option<NodeCategory> {
        self.children().get(index).map(|child| child.category())
    }
}

impl AstNode for Stmt {
    fn kind(&self) -> NodeKind {
        match &self.kind {
            StmtKind::Let { .. } => NodeKind::Let,
            StmtKind::Expr(_) => NodeKind::ExprStmt,
            StmtKind::Return(_) => NodeKind::Return,
            StmtKind::Break => NodeKind::Break,
            StmtKind::Continue => NodeKind::Continue,
            StmtKind::Block(_) => NodeKind::Block,
            StmtKind::If { .. } => NodeKind::If,
            StmtKind::While { .. } => NodeKind::While,
            StmtKind::For { .. } => NodeKind::For,
            StmtKind::Unknown(_) => NodeKind::Unknown,
        }
    }

    fn span(&self) -> FileSpan {
        self.span
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        match &self.kind {
            StmtKind::Let { init, .. } => init.iter().map(NodeRef::Expr).collect(),
            StmtKind::Expr(expr) => vec![NodeRef::Expr(expr)],
            StmtKind::Return(value) => value.iter().map(NodeRef::Expr).collect(),
            StmtKind::Block(block) => vec![NodeRef::Block(block)],
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut children = vec![NodeRef::Expr(condition), NodeRef::Block(then_branch)];
                children.extend(else_branch.iter().map(NodeRef::Block));
                children
            }
            StmtKind::While { condition, body } => {
                vec![NodeRef::Expr(condition), NodeRef::Block(body)]
            }
            StmtKind::For { iterable, body, .. } => {
                vec![NodeRef::Expr(iterable), NodeRef::Block(body)]
            }
            StmtKind::Break | StmtKind::Continue | StmtKind::Unknown(_) => Vec::new(),
        }
    }

    fn replace_child(&mut self, index: usize, node: Node) -> Result<(), ReplaceChildError> {
        let Some(expected) = self.slot_category(index) else {
            return Err(out_of_bounds(index, self.child_count(), self.kind()));
        };

        if expected == NodeCategory::Block {
            let block = node
                .into_block()
                .map_err(|found| mismatch(index, expected, found))?;
            match (&mut self.kind, index) {
                (StmtKind::Block(slot), _) => *slot = block,
                (StmtKind::If { then_branch, .. }, 1) => *then_branch = block,
                (StmtKind::If { else_branch, .. }, _) => *else_branch = Some(block),
                (StmtKind::While { body, .. } | StmtKind::For { body, .. }, _) => *body = block,
                _ => return Err(mismatch(index, NodeCategory::Expr, NodeCategory::Block)),
            }
            return Ok(());
        }

        let expr = node
            .into_expr()
            .map_err(|found| mismatch(index, expected, found))?;
        match &mut self.kind {
            StmtKind::Let { init, .. } => *init = Some(expr),
            StmtKind::Return(value) => *value = Some(expr),
            StmtKind::Expr(slot)
            | StmtKind::If {
                condition: slot, ..
            }
            | StmtKind::While {
                condition: slot, ..
            }
            | StmtKind::For { iterable: slot, .. } => *slot = expr,
            StmtKind::Block(_) | StmtKind::Break | StmtKind::Continue | StmtKind::Unknown(_) => {
                return Err(mismatch(index, NodeCategory::Block, NodeCategory::Expr));
            }
        }
        Ok(())
    }

    fn remove_child(&mut self, index: usize) -> Result<Node, ReplaceChildError> {
        let kind = self.kind();
        let len = self.child_count();
        if index >= len {
            return Err(out_of_bounds(index, len, kind));
        }
        match &mut self.kind {
            StmtKind::If { else_branch, .. } if index == 2 => else_branch
                .take()
                .map(Node::Block)
                .ok_or_else(|| out_of_bounds(index, len, kind)),
            _ => Err(ReplaceChildError::NotRemovable { index, kind }),
        }
    }
}

impl AstNode for Block {
    fn kind(&self) -> NodeKind {
        NodeKind::Block
    }

    fn span(&self) -> FileSpan {
        self.span
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        self.stmts.iter().map(NodeRef::Stmt).collect()
    }

    fn replace_child(&mut self, index: usize, node: Node) -> Result<(), ReplaceChildError> {
        let len = self.stmts.len();
        if index >= len {
            return Err(out_of_bounds(index, len, NodeKind::Block));
        }
        self.stmts[index] = node
            .into_stmt()
            .map_err(|found| mismatch(index, NodeCategory::Stmt, found))?;
        Ok(())
    }

    fn remove_child(&mut self, index: usize) -> Result<Node, ReplaceChildError> {
        let len = self.stmts.len();
        if index >= len {
            return Err(out_of_bounds(index, len, NodeKind::Block));
        }
        Ok(Node::Stmt(self.stmts.remove(index)))
    }
}

impl AstNode for Decl {
    fn kind(&self) -> NodeKind {
        match &self.kind {
            DeclKind::Function(_) => NodeKind::Function,
            DeclKind::Struct(_) => NodeKind::Struct,
            DeclKind::Enum(_) => NodeKind::Enum,
            DeclKind::Trait(_) => NodeKind::Trait,
            DeclKind::Impl(_) => NodeKind::Impl,
            DeclKind::Import(_) => NodeKind::Import,
            DeclKind::Export(_) => NodeKind::Export,
            DeclKind::TypeAlias(_) => NodeKind::TypeAlias,
            DeclKind::Newtype(_) => NodeKind::Newtype,
            DeclKind::Variable(_) => NodeKind::Variable,
            DeclKind::Unknown(_) => NodeKind::Unknown,
        }
    }

    fn span(&self) -> FileSpan {
        self.span
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        match &self.kind {
            DeclKind::Function(function) => vec![NodeRef::Block(&function.body)],
            DeclKind::Impl(imp) => imp.methods.iter().map(NodeRef::Decl).collect(),
            DeclKind::Variable(var) => var.init.iter().map(NodeRef::Expr).collect(),
            _ => Vec::new(),
        }
    }

    fn replace_child(&mut self, index: usize, node: Node) -> Result<(), ReplaceChildError> {
        let kind = self.kind();
        let len = self.child_count();
        if index >= len {
            return Err(out_of_bounds(index, len, kind));
        }
        match &mut self.kind {
            DeclKind::Function(function) => {
                function.body = node
                    .into_block()
                    .map_err(|found| mismatch(index, NodeCategory::Block, found))?;
            }
            DeclKind::Impl(imp) => {
                imp.methods[index] = node
                    .into_decl()
                    .map_err(|found| mismatch(index, NodeCategory::Decl, found))?;
            }
            DeclKind::Variable(var) => {
                var.init = Some(
                    node.into_expr()
                        .map_err(|found| mismatch(index, NodeCategory::Expr, found))?,
                );
            }
            _ => return Err(out_of_bounds(index, 0, kind)),
        }
        Ok(())
    }

    fn remove_child(&mut self, index: usize) -> Result<Node, ReplaceChildError> {
        let kind = self.kind();
        let len = self.child_count();
        if index >= len {
            return Err(out_of_bounds(index, len, kind));
        }
        match &mut self.kind {
            DeclKind::Impl(imp) => Ok(Node::Decl(imp.methods.remove(index))),
            _ => Err(ReplaceChildError::NotRemovable { index, kind }),
        }
    }
}

impl AstNode for Node {
    fn kind(&self) -> NodeKind {
        self.as_ref().kind()
    }

    fn span(&self) -> FileSpan {
        self.as_ref().span()
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        match self {
            Self::Decl(decl) => decl.children(),
            Self::Stmt(stmt) => stmt.children(),
            Self::Block(block) => block.children(),
            Self::Expr(expr) => expr.children(),
        }
    }

    fn replace_child(&mut self, index: usize, node: Node) -> Result<(), ReplaceChildError> {
        match self {
            Self::Decl(decl) => decl.replace_child(index, node),
            Self::Stmt(stmt) => stmt.replace_child(index, node),
            Self::Block(block) => block.replace_child(index, node),
            Self::Expr(expr) => expr.replace_child(index, node),
        }
    }

    fn remove_child(&mut self, index: usize) -> Result<Node, ReplaceChildError> {
        match self {
            Self::Decl(decl) => decl.remove_child(index),
            Self::Stmt(stmt) => stmt.remove_child(index),
            Self::Block(block) => block.remove_child(index),
            Self::Expr(expr) => expr.remove_child(index),
        }
    }
}
