//! Function and initializer bodies
//!
//! Expressions, statements and patterns live in per-body arenas and refer
//! to each other by index.

use derive_more::Display;
use la_arena::{Arena, Idx, RawIdx};
use tn_intern::Symbol;
use tn_span::FileSpan;

use crate::node::{HirChild, HirNode};
use crate::scope::ScopeId;
use crate::ty::{PrimitiveType, Type};
use crate::{DefId, LocalId};

/// Expression index
pub type ExprId = Idx<Expr>;
/// Statement index
pub type StmtId = Idx<Stmt>;
/// Pattern index
pub type PatternId = Idx<Pattern>;

/// Literal values
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Integer literal
    Integer(i64),
    /// Float literal
    Float(f64),
    /// String literal
    String(String),
    /// Character literal
    Char(char),
    /// Boolean literal
    Bool(bool),
}

impl LiteralValue {
    /// Primitive type a literal of this kind has
    #[must_use]
    pub const fn primitive(&self) -> PrimitiveType {
        match self {
            Self::Integer(_) => PrimitiveType::I64,
            Self::Float(_) => PrimitiveType::F64,
            Self::String(_) => PrimitiveType::String,
            Self::Char(_) => PrimitiveType::Char,
            Self::Bool(_) => PrimitiveType::Bool,
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum BinaryOp {
    /// `+`
    #[display("+")]
    Add,
    /// `-`
    #[display("-")]
    Sub,
    /// `*`
    #[display("*")]
    Mul,
    /// `/`
    #[display("/")]
    Div,
    /// `%`
    #[display("%")]
    Mod,
    /// `==`
    #[display("==")]
    Eq,
    /// `!=`
    #[display("!=")]
    Ne,
    /// `<`
    #[display("<")]
    Lt,
    /// `>`
    #[display(">")]
    Gt,
    /// `<=`
    #[display("<=")]
    Le,
    /// `>=`
    #[display(">=")]
    Ge,
    /// `&&`
    #[display("&&")]
    And,
    /// `||`
    #[display("||")]
    Or,
}

impl BinaryOp {
    /// Whether the result is always `bool`
    #[must_use]
    pub const fn yields_bool(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Ne | Self::Lt | Self::Gt | Self::Le | Self::Ge | Self::And | Self::Or
        )
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum UnaryOp {
    /// `-`
    #[display("-")]
    Neg,
    /// `!`
    #[display("!")]
    Not,
}

/// IR expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value
    Literal {
        /// Value
        value: LiteralValue,
        /// Literal type
        ty: Type,
        /// Source location
        span: FileSpan,
    },
    /// Variable reference
    Variable {
        /// Referenced name
        name: Symbol,
        /// Resolved definition
        def: Option<DefId>,
        /// Type of the referenced binding
        ty: Type,
        /// Source location
        span: FileSpan,
    },
    /// Binary operation
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        lhs: ExprId,
        /// Right operand
        rhs: ExprId,
        /// Result type
        ty: Type,
        /// Source location
        span: FileSpan,
    },
    /// Unary operation
    Unary {
        /// Operator
        op: UnaryOp,
        /// Operand
        operand: ExprId,
        /// Result type
        ty: Type,
        /// Source location
        span: FileSpan,
    },
    /// Function call
    Call {
        /// Callee
        callee: ExprId,
        /// Arguments
        args: Vec<ExprId>,
        /// Return type of the callee
        ty: Type,
        /// Source location
        span: FileSpan,
    },
    /// Field access
    Field {
        /// Accessed expression
        base: ExprId,
        /// Field name
        field: Symbol,
        /// Field type
        ty: Type,
        /// Source location
        span: FileSpan,
    },
    /// Block with optional trailing value
    Block {
        /// Statements
        stmts: Vec<StmtId>,
        /// Value the block evaluates to
        tail: Option<ExprId>,
        /// Scope introduced by the block
        scope: ScopeId,
        /// Block type
        ty: Type,
        /// Source location
        span: FileSpan,
    },
    /// Placeholder left where lowering failed
    Missing {
        /// Source location
        span: FileSpan,
    },
}

impl Expr {
    /// Type of the expression
    #[must_use]
    pub fn ty(&self) -> Type {
        match self {
            Self::Literal { ty, .. }
            | Self::Variable { ty, .. }
            | Self::Binary { ty, .. }
            | Self::Unary { ty, .. }
            | Self::Call { ty, .. }
            | Self::Field { ty, .. }
            | Self::Block { ty, .. } => ty.clone(),
            Self::Missing { .. } => Type::Inferred,
        }
    }
}

/// IR statements
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Local binding
    Let {
        /// Bound pattern
        pattern: PatternId,
        /// Binding type
        ty: Type,
        /// Initializer
        init: Option<ExprId>,
        /// Source location
        span: FileSpan,
    },
    /// Expression evaluated for effect
    Expr {
        /// Expression
        expr: ExprId,
        /// Source location
        span: FileSpan,
    },
    /// Assignment to a place
    Assign {
        /// Assigned place
        target: ExprId,
        /// Assigned value
        value: ExprId,
        /// Source location
        span: FileSpan,
    },
    /// Return from the enclosing function
    Return {
        /// Returned value
        value: Option<ExprId>,
        /// Source location
        span: FileSpan,
    },
    /// Leave the enclosing loop
    Break {
        /// Source location
        span: FileSpan,
    },
    /// Next iteration of the enclosing loop
    Continue {
        /// Source location
        span: FileSpan,
    },
    /// Conditional; branches are block expressions
    If {
        /// Condition
        condition: ExprId,
        /// Then block
        then_branch: ExprId,
        /// Else block
        else_branch: Option<ExprId>,
        /// Source location
        span: FileSpan,
    },
    /// Conditional loop
    While {
        /// Condition
        condition: ExprId,
        /// Body block
        body: ExprId,
        /// Source location
        span: FileSpan,
    },
    /// Iteration loop
    For {
        /// Loop variable
        binding: PatternId,
        /// Iterated expression
        iterable: ExprId,
        /// Body block
        body: ExprId,
        /// Source location
        span: FileSpan,
    },
}

/// Binding patterns
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// Named binding
    Binding {
        /// Bound name
        name: Symbol,
        /// Local the name refers to
        local: LocalId,
        /// Mutable binding
        mutable: bool,
        /// Binding type
        ty: Type,
        /// Source location
        span: FileSpan,
    },
    /// `_`
    Wildcard {
        /// Source location
        span: FileSpan,
    },
}

/// Function or initializer body
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Expression arena
    pub exprs: Arena<Expr>,
    /// Statement arena
    pub stmts: Arena<Stmt>,
    /// Pattern arena
    pub patterns: Arena<Pattern>,
    /// Root expression
    pub root_expr: ExprId,
}

impl Body {
    /// Builds a body whose root is the expression `build` allocates
    pub fn with_root(build: impl FnOnce(&mut Self) -> ExprId) -> Self {
        let mut body = Self {
            exprs: Arena::new(),
            stmts: Arena::new(),
            patterns: Arena::new(),
            // Not read before `build` returns the real root.
            root_expr: Idx::from_raw(RawIdx::from(0u32)),
        };
        body.root_expr = build(&mut body);
        body
    }

    /// Statements of the root block, or nothing if the root is not a block
    #[must_use]
    pub fn root_stmts(&self) -> &[StmtId] {
        match &self.exprs[self.root_expr] {
            Expr::Block { stmts, .. } => stmts,
            _ => &[],
        }
    }

    /// Copies the expression tree rooted at `id`, returning the new root.
    ///
    /// Statements and patterns under a block are copied too, so the copy
    /// shares no index with the original. A copied block keeps its scope.
    pub fn deep_clone_expr(&mut self, id: ExprId) -> ExprId {
        let copy = match self.exprs[id].clone() {
            Expr::Binary {
                op,
                lhs,
                rhs,
                ty,
                span,
            } => {
                let lhs = self.deep_clone_expr(lhs);
                let rhs = self.deep_clone_expr(rhs);
                Expr::Binary {
                    op,
                    lhs,
                    rhs,
                    ty,
                    span,
                }
            }
            Expr::Unary {
                op,
                operand,
                ty,
                span,
            } => Expr::Unary {
                op,
                operand: self.deep_clone_expr(operand),
                ty,
                span,
            },
            Expr::Call {
                callee,
                args,
                ty,
                span,
            } => {
                let callee = self.deep_clone_expr(callee);
                let args = args.into_iter().map(|arg| self.deep_clone_expr(arg)).collect();
                Expr::Call {
                    callee,
                    args,
                    ty,
                    span,
                }
            }
            Expr::Field {
                base,
                field,
                ty,
                span,
            } => Expr::Field {
                base: self.deep_clone_expr(base),
                field,
                ty,
                span,
            },
            Expr::Block {
                stmts,
                tail,
                scope,
                ty,
                span,
            } => {
                let stmts = stmts.into_iter().map(|stmt| self.deep_clone_stmt(stmt)).collect();
                let tail = tail.map(|tail| self.deep_clone_expr(tail));
                Expr::Block {
                    stmts,
                    tail,
                    scope,
                    ty,
                    span,
                }
            }
            leaf @ (Expr::Literal { .. } | Expr::Variable { .. } | Expr::Missing { .. }) => leaf,
        };
        self.exprs.alloc(copy)
    }

    /// Copies a statement with everything under it
    pub fn deep_clone_stmt(&mut self, id: StmtId) -> StmtId {
        let copy = match self.stmts[id].clone() {
            Stmt::Let {
                pattern,
                ty,
                init,
                span,
            } => Stmt::Let {
                pattern: self.clone_pattern(pattern),
                ty,
                init: init.map(|init| self.deep_clone_expr(init)),
                span,
            },
            Stmt::Expr { expr, span } => Stmt::Expr {
                expr: self.deep_clone_expr(expr),
                span,
            },
            Stmt::Assign {
                target,
                value,
                span,
            } => {
                let target = self.deep_clone_expr(target);
                let value = self.deep_clone_expr(value);
                Stmt::Assign {
                    target,
                    value,
                    span,
                }
            }
            Stmt::Return { value, span } => Stmt::Return {
                value: value.map(|value| self.deep_clone_expr(value)),
                span,
            },
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                span,
            } => {
                let condition = self.deep_clone_expr(condition);
                let then_branch = self.deep_clone_expr(then_branch);
                let else_branch = else_branch.map(|branch| self.deep_clone_expr(branch));
                Stmt::If {
                    condition,
                    then_branch,
                    else_branch,
                    span,
                }
            }
            Stmt::While {
                condition,
                body,
                span,
            } => {
                let condition = self.deep_clone_expr(condition);
                let body = self.deep_clone_expr(body);
                Stmt::While {
                    condition,
                    body,
                    span,
                }
            }
            Stmt::For {
                binding,
                iterable,
                body,
                span,
            } => {
                let binding = self.clone_pattern(binding);
                let iterable = self.deep_clone_expr(iterable);
                let body = self.deep_clone_expr(body);
                Stmt::For {
                    binding,
                    iterable,
                    body,
                    span,
                }
            }
            jump @ (Stmt::Break { .. } | Stmt::Continue { .. }) => jump,
        };
        self.stmts.alloc(copy)
    }

    fn clone_pattern(&mut self, id: PatternId) -> PatternId {
        let copy = self.patterns[id].clone();
        self.patterns.alloc(copy)
    }

    /// Every expression reachable from `root`, in pre-order
    #[must_use]
    pub fn descendants(&self, root: ExprId) -> Vec<ExprId> {
        let mut out = Vec::new();
        let mut stack = vec![HirChild::Expr(root)];
        while let Some(child) = stack.pop() {
            let children = match child {
                HirChild::Expr(id) => {
                    out.push(id);
                    self.exprs[id].children()
                }
                HirChild::Stmt(id) => self.stmts[id].children(),
                HirChild::Pattern(_) => Vec::new(),
            };
            stack.extend(children.into_iter().rev());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::ScopeTree;

    fn make_span() -> FileSpan {
        FileSpan::dummy()
    }

    fn int(body: &mut Body, value: i64) -> ExprId {
        body.exprs.alloc(Expr::Literal {
            value: LiteralValue::Integer(value),
            ty: Type::Primitive(PrimitiveType::I64),
            span: make_span(),
        })
    }

    fn sum(body: &mut Body, op: BinaryOp) -> ExprId {
        let lhs = int(body, 1);
        let rhs = int(body, 2);
        body.exprs.alloc(Expr::Binary {
            op,
            lhs,
            rhs,
            ty: Type::Primitive(PrimitiveType::I64),
            span: make_span(),
        })
    }

    #[test]
    fn test_with_root_allocates_only_what_is_built() {
        let body = Body::with_root(|body| int(body, 7));
        assert_eq!(body.exprs.len(), 1);
        assert!(body.root_stmts().is_empty());
        assert_eq!(
            body.exprs[body.root_expr],
            Expr::Literal {
                value: LiteralValue::Integer(7),
                ty: Type::Primitive(PrimitiveType::I64),
                span: make_span(),
            }
        );
    }

    #[test]
    fn test_deep_clone_allocates_new_nodes() {
        let mut body = Body::with_root(|body| sum(body, BinaryOp::Add));
        let root = body.root_expr;
        let Expr::Binary { lhs, .. } = body.exprs[root] else {
            panic!("expected binary");
        };

        let before = body.exprs.len();
        let copy = body.deep_clone_expr(root);
        assert_ne!(copy, root);
        assert_eq!(body.exprs.len(), before + 3);
        let Expr::Binary { lhs: copy_lhs, .. } = body.exprs[copy] else {
            panic!("expected binary");
        };
        assert_ne!(copy_lhs, lhs);
        assert_eq!(body.exprs[copy_lhs], body.exprs[lhs]);
    }

    #[test]
    fn test_deep_clone_copies_block_statements() {
        let mut scopes = ScopeTree::new();
        let scope = scopes.create_root(make_span());
        let mut body = Body::with_root(|body| {
            let target = int(body, 1);
            let value = int(body, 2);
            let assign = body.stmts.alloc(Stmt::Assign {
                target,
                value,
                span: make_span(),
            });
            let tail = int(body, 1);
            body.exprs.alloc(Expr::Block {
                stmts: vec![assign],
                tail: Some(tail),
                scope,
                ty: Type::Primitive(PrimitiveType::I64),
                span: make_span(),
            })
        });
        let root = body.root_expr;
        let copy = body.deep_clone_expr(root);

        let (Expr::Block { stmts: original, .. }, Expr::Block { stmts: copied, .. }) =
            (&body.exprs[root], &body.exprs[copy])
        else {
            panic!("expected blocks");
        };
        assert_ne!(original, copied);
        assert_ne!(original[0], copied[0]);
        assert!(matches!(body.stmts[copied[0]], Stmt::Assign { .. }));
        assert_eq!(body.stmts.len(), 2);

        let mut seen = Vec::new();
        for id in body.descendants(root).into_iter().chain(body.descendants(copy)) {
            assert!(!seen.contains(&id), "expression reached twice");
            seen.push(id);
        }
    }

    #[test]
    fn test_descendants_preorder() {
        let body = Body::with_root(|body| sum(body, BinaryOp::Mul));
        let root = body.root_expr;
        let Expr::Binary { lhs, rhs, .. } = body.exprs[root] else {
            panic!("expected binary");
        };
        assert_eq!(body.descendants(root), vec![root, lhs, rhs]);
    }

    #[test]
    fn test_literal_primitive() {
        assert_eq!(LiteralValue::Bool(true).primitive(), PrimitiveType::Bool);
        assert_eq!(LiteralValue::String(String::new()).primitive(), PrimitiveType::String);
        assert!(BinaryOp::Lt.yields_bool());
        assert!(!BinaryOp::Add.yields_bool());
    }
}
