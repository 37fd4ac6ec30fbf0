//! Statement and expression lowering
//!
//! Every function takes the scope to resolve in and the body to allocate
//! into. An expression that cannot be lowered yields `None`; callers that
//! need an operand substitute [`Expr::Missing`] so the surrounding shape
//! survives.

use tn_hir::{
    BinaryOp, Body, DefId, Expr, ExprId, LiteralValue, Pattern, PatternId, ScopeId, ScopeKind,
    Stmt, StmtId, SymbolKind, Type, UnaryOp,
};
use tn_span::FileSpan;
use tn_syntax::{self as ast, ExprKind, LiteralKind, StmtKind};

use crate::context::LoweringContext;
use crate::error::LoweringError;
use crate::ty::lower_type_or;

/// Lower a block into a fresh child scope of `parent`
pub fn lower_block(
    ctx: &mut LoweringContext,
    parent: ScopeId,
    body: &mut Body,
    block: &ast::Block,
) -> ExprId {
    let scope = ctx
        .scopes
        .create_child(parent, ScopeKind::Block, block.span);
    let stmts = block
        .stmts
        .iter()
        .filter_map(|stmt| lower_stmt(ctx, scope, body, stmt))
        .collect();
    body.exprs.alloc(Expr::Block {
        stmts,
        tail: None,
        scope,
        ty: Type::Unit,
        span: block.span,
    })
}

/// Lower a statement; `None` when it was dropped
pub fn lower_stmt(
    ctx: &mut LoweringContext,
    scope: ScopeId,
    body: &mut Body,
    stmt: &ast::Stmt,
) -> Option<StmtId> {
    let span = stmt.span;
    let lowered = match &stmt.kind {
        StmtKind::Let {
            name,
            mutable,
            ty,
            init,
        } => {
            // The initializer cannot see the binding it initializes.
            let init = init
                .as_ref()
                .map(|init| lower_expr_or_missing(ctx, scope, body, init));
            let inferred = init.map_or(Type::Inferred, |id| body.exprs[id].ty());
            let ty = lower_type_or(ctx, scope, ty.as_ref(), inferred);
            let pattern = bind_pattern(ctx, scope, body, name, *mutable, ty.clone(), span);
            Stmt::Let {
                pattern,
                ty,
                init,
                span,
            }
        }
        StmtKind::Expr(expr) => Stmt::Expr {
            expr: lower_expr(ctx, scope, body, expr)?,
            span,
        },
        StmtKind::Return(value) => Stmt::Return {
            value: value
                .as_ref()
                .map(|value| lower_expr_or_missing(ctx, scope, body, value)),
            span,
        },
        StmtKind::Break => Stmt::Break { span },
        StmtKind::Continue => Stmt::Continue { span },
        StmtKind::Block(block) => Stmt::Expr {
            expr: lower_block(ctx, scope, body, block),
            span,
        },
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let condition = lower_expr_or_missing(ctx, scope, body, condition);
            let then_branch = lower_block(ctx, scope, body, then_branch);
            let else_branch = else_branch
                .as_ref()
                .map(|block| lower_block(ctx, scope, body, block));
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                span,
            }
        }
        StmtKind::While {
            condition,
            body: loop_body,
        } => {
            let condition = lower_expr_or_missing(ctx, scope, body, condition);
            Stmt::While {
                condition,
                body: lower_block(ctx, scope, body, loop_body),
                span,
            }
        }
        StmtKind::For {
            binding,
            iterable,
            body: loop_body,
        } => {
            let iterable = lower_expr_or_missing(ctx, scope, body, iterable);
            let loop_scope = ctx.scopes.create_child(scope, ScopeKind::Loop, span);
            let binding = bind_pattern(ctx, loop_scope, body, binding, false, Type::Inferred, span);
            Stmt::For {
                binding,
                iterable,
                body: lower_block(ctx, loop_scope, body, loop_body),
                span,
            }
        }
        StmtKind::Unknown(text) => {
            ctx.report(LoweringError::UnsupportedNode {
                context: "statement",
                description: text.clone(),
                span,
            });
            return None;
        }
    };
    Some(body.stmts.alloc(lowered))
}

/// Allocate a binding pattern and bind its name in `scope`; `_` binds nothing
fn bind_pattern(
    ctx: &mut LoweringContext,
    scope: ScopeId,
    body: &mut Body,
    name: &str,
    mutable: bool,
    ty: Type,
    span: FileSpan,
) -> PatternId {
    if name == "_" {
        return body.patterns.alloc(Pattern::Wildcard { span });
    }
    let local = ctx.alloc_local_id();
    let symbol = ctx.intern(name);
    ctx.declare(
        scope,
        symbol,
        SymbolKind::Local,
        Some(DefId::Local(local)),
        ty.clone(),
        span,
    );
    body.patterns.alloc(Pattern::Binding {
        name: symbol,
        local,
        mutable,
        ty,
        span,
    })
}

/// Lower an expression, substituting a placeholder on failure
pub fn lower_expr_or_missing(
    ctx: &mut LoweringContext,
    scope: ScopeId,
    body: &mut Body,
    expr: &ast::Expr,
) -> ExprId {
    lower_expr(ctx, scope, body, expr)
        .unwrap_or_else(|| body.exprs.alloc(Expr::Missing { span: expr.span }))
}

/// Lower an expression; `None` after an unresolved name or unsupported syntax
pub fn lower_expr(
    ctx: &mut LoweringContext,
    scope: ScopeId,
    body: &mut Body,
    expr: &ast::Expr,
) -> Option<ExprId> {
    let span = expr.span;
    let lowered = match &expr.kind {
        ExprKind::Literal(literal) => {
            let value = lower_literal(ctx, literal, span)?;
            Expr::Literal {
                ty: Type::Primitive(value.primitive()),
                value,
                span,
            }
        }
        ExprKind::Identifier(name) => {
            let symbol = ctx.intern(name);
            let Some(id) = ctx.scopes.resolve_value(scope, symbol) else {
                ctx.report(LoweringError::UnresolvedName {
                    name: name.clone(),
                    span,
                });
                return None;
            };
            let info = ctx.symbols.get(id);
            Expr::Variable {
                name: symbol,
                def: info.def,
                ty: info.ty.clone(),
                span,
            }
        }
        ExprKind::Binary { op, lhs, rhs } => {
            let op = binary_op(*op);
            let lhs = lower_expr_or_missing(ctx, scope, body, lhs);
            let rhs = lower_expr_or_missing(ctx, scope, body, rhs);
            Expr::Binary {
                op,
                lhs,
                rhs,
                ty: binary_type(body, op, lhs, rhs),
                span,
            }
        }
        ExprKind::Unary { op, operand } => {
            let operand = lower_expr_or_missing(ctx, scope, body, operand);
            let (op, ty) = match op {
                ast::UnaryOp::Neg => (UnaryOp::Neg, body.exprs[operand].ty()),
                ast::UnaryOp::Not => (UnaryOp::Not, Type::BOOL),
            };
            Expr::Unary {
                op,
                operand,
                ty,
                span,
            }
        }
        ExprKind::Call { callee, args } => {
            let callee = lower_expr_or_missing(ctx, scope, body, callee);
            let args = args
                .iter()
                .map(|arg| lower_expr_or_missing(ctx, scope, body, arg))
                .collect();
            let ty = match body.exprs[callee].ty() {
                Type::Function { ret, .. } => *ret,
                _ => Type::Inferred,
            };
            Expr::Call {
                callee,
                args,
                ty,
                span,
            }
        }
        ExprKind::Field { base, field } => {
            let base = lower_expr_or_missing(ctx, scope, body, base);
            let field_name = ctx.intern(field);
            let ty = field_type(ctx, &body.exprs[base].ty(), field);
            Expr::Field {
                base,
                field: field_name,
                ty,
                span,
            }
        }
        ExprKind::Assign { target, value } => {
            let target = lower_expr_or_missing(ctx, scope, body, target);
            let value = lower_expr_or_missing(ctx, scope, body, value);
            return Some(lower_assignment(ctx, scope, body, target, value, span));
        }
        ExprKind::CompoundAssign { op, target, value } => {
            // Desugar `t op= v` into `t = t op v`; the second `t` is a copy.
            let target = lower_expr_or_missing(ctx, scope, body, target);
            let rhs = lower_expr_or_missing(ctx, scope, body, value);
            let lhs = body.deep_clone_expr(target);
            let op = binary_op(op.binary_op());
            let ty = binary_type(body, op, lhs, rhs);
            let value = body.exprs.alloc(Expr::Binary {
                op,
                lhs,
                rhs,
                ty,
                span,
            });
            return Some(lower_assignment(ctx, scope, body, target, value, span));
        }
        ExprKind::Unknown(text) => {
            ctx.report(LoweringError::UnsupportedNode {
                context: "expression",
                description: text.clone(),
                span,
            });
            return None;
        }
    };
    Some(body.exprs.alloc(lowered))
}

/// `{ target = value; target }`: an assignment as a block with a trailing value
fn lower_assignment(
    ctx: &mut LoweringContext,
    scope: ScopeId,
    body: &mut Body,
    target: ExprId,
    value: ExprId,
    span: FileSpan,
) -> ExprId {
    let block_scope = ctx.scopes.create_child(scope, ScopeKind::Block, span);
    let assign = body.stmts.alloc(Stmt::Assign {
        target,
        value,
        span,
    });
    let tail = body.deep_clone_expr(target);
    let ty = body.exprs[target].ty();
    body.exprs.alloc(Expr::Block {
        stmts: vec![assign],
        tail: Some(tail),
        scope: block_scope,
        ty,
        span,
    })
}

fn lower_literal(
    ctx: &mut LoweringContext,
    literal: &ast::Literal,
    span: FileSpan,
) -> Option<LiteralValue> {
    let value = match literal.kind {
        LiteralKind::Integer => literal.as_integer().map(LiteralValue::Integer),
        LiteralKind::Float => literal
            .text
            .replace('_', "")
            .parse::<f64>()
            .ok()
            .map(LiteralValue::Float),
        LiteralKind::String => Some(LiteralValue::String(literal.text.clone())),
        LiteralKind::Char => {
            let mut chars = literal.text.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => Some(LiteralValue::Char(ch)),
                _ => None,
            }
        }
        LiteralKind::Boolean => literal.as_bool().map(LiteralValue::Bool),
    };
    if value.is_none() {
        ctx.report(LoweringError::InvalidLiteral {
            kind: literal.kind.to_string(),
            text: literal.text.clone(),
            span,
        });
    }
    value
}

fn binary_op(op: ast::BinaryOp) -> BinaryOp {
    match op {
        ast::BinaryOp::Add => BinaryOp::Add,
        ast::BinaryOp::Sub => BinaryOp::Sub,
        ast::BinaryOp::Mul => BinaryOp::Mul,
        ast::BinaryOp::Div => BinaryOp::Div,
        ast::BinaryOp::Mod => BinaryOp::Mod,
        ast::BinaryOp::Eq => BinaryOp::Eq,
        ast::BinaryOp::Ne => BinaryOp::Ne,
        ast::BinaryOp::Lt => BinaryOp::Lt,
        ast::BinaryOp::Gt => BinaryOp::Gt,
        ast::BinaryOp::Le => BinaryOp::Le,
        ast::BinaryOp::Ge => BinaryOp::Ge,
        ast::BinaryOp::And => BinaryOp::And,
        ast::BinaryOp::Or => BinaryOp::Or,
    }
}

/// Comparisons and logic give `bool`; arithmetic takes the first known operand type
fn binary_type(body: &Body, op: BinaryOp, lhs: ExprId, rhs: ExprId) -> Type {
    if op.yields_bool() {
        return Type::BOOL;
    }
    match body.exprs[lhs].ty() {
        Type::Inferred => body.exprs[rhs].ty(),
        ty => ty,
    }
}

/// Declared type of `field` on a struct value, looking through references
fn field_type(ctx: &LoweringContext, base: &Type, field: &str) -> Type {
    match base {
        Type::Reference { inner, .. } => field_type(ctx, inner, field),
        Type::Named { def: Some(def), .. } => ctx
            .struct_fields
            .get(def)
            .and_then(|fields| {
                fields
                    .iter()
                    .find(|candidate| ctx.interner.resolve(&candidate.name) == field)
            })
            .map_or(Type::Inferred, |candidate| candidate.ty.clone()),
        _ => Type::Inferred,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tn_hir::{HirChild, HirNode, PrimitiveType};
    use tn_syntax::{AstBuilder, CompoundOp};

    fn setup() -> (LoweringContext, ScopeId, Body) {
        let mut ctx = LoweringContext::new();
        let root = ctx.scopes.create_root(FileSpan::dummy());
        let body = Body::with_root(|body| {
            body.exprs.alloc(Expr::Missing {
                span: FileSpan::dummy(),
            })
        });
        (ctx, root, body)
    }

    /// Statements reachable from `root`, once per path that reaches them
    fn reachable_stmts(body: &Body, root: ExprId) -> Vec<StmtId> {
        let mut out = Vec::new();
        let mut stack = vec![HirChild::Expr(root)];
        while let Some(child) = stack.pop() {
            let children = match child {
                HirChild::Expr(id) => body.exprs[id].children(),
                HirChild::Stmt(id) => {
                    out.push(id);
                    body.stmts[id].children()
                }
                HirChild::Pattern(_) => Vec::new(),
            };
            stack.extend(children);
        }
        out
    }

    #[test]
    fn test_let_binding_visible_to_later_statements() {
        let (mut ctx, root, mut body) = setup();
        let b = AstBuilder::new();
        let block = b.block(vec![
            b.let_stmt("x", Some(b.int(1))),
            b.expr_stmt(b.binary(ast::BinaryOp::Add, b.ident("x"), b.int(2))),
        ]);
        let root_expr = lower_block(&mut ctx, root, &mut body, &block);
        assert!(ctx.errors.is_empty());
        let Expr::Block { stmts, .. } = &body.exprs[root_expr] else {
            panic!("expected block");
        };
        assert_eq!(stmts.len(), 2);
        let Stmt::Let { ty, .. } = &body.stmts[stmts[0]] else {
            panic!("expected let");
        };
        assert_eq!(*ty, Type::Primitive(PrimitiveType::I64));
    }

    #[test]
    fn test_unresolved_identifier_yields_none() {
        let (mut ctx, root, mut body) = setup();
        let b = AstBuilder::new();
        assert_eq!(lower_expr(&mut ctx, root, &mut body, &b.ident("ghost")), None);
        assert_eq!(ctx.errors.len(), 1);
        assert!(ctx.errors[0].to_string().contains("ghost"));
    }

    #[test]
    fn test_missing_operand_keeps_shape() {
        let (mut ctx, root, mut body) = setup();
        let b = AstBuilder::new();
        let expr = b.binary(ast::BinaryOp::Lt, b.ident("ghost"), b.int(1));
        let id = lower_expr(&mut ctx, root, &mut body, &expr).unwrap();
        let Expr::Binary { lhs, ty, .. } = &body.exprs[id] else {
            panic!("expected binary");
        };
        assert!(matches!(body.exprs[*lhs], Expr::Missing { .. }));
        assert_eq!(*ty, Type::BOOL);
    }

    #[test]
    fn test_assignment_lowers_to_block_with_tail() {
        let (mut ctx, root, mut body) = setup();
        let b = AstBuilder::new();
        let block = b.block(vec![
            b.let_stmt("a", Some(b.int(0))),
            b.expr_stmt(b.assign(b.ident("a"), b.int(5))),
        ]);
        let root_expr = lower_block(&mut ctx, root, &mut body, &block);
        let Expr::Block { stmts, .. } = &body.exprs[root_expr] else {
            panic!("expected block");
        };
        let Stmt::Expr { expr, .. } = &body.stmts[stmts[1]] else {
            panic!("expected expression statement");
        };
        let Expr::Block {
            stmts: inner,
            tail: Some(tail),
            ..
        } = &body.exprs[*expr]
        else {
            panic!("expected assignment block");
        };
        let Stmt::Assign { target, .. } = &body.stmts[inner[0]] else {
            panic!("expected assign");
        };
        assert_ne!(target, tail);
        assert_eq!(body.exprs[*target], body.exprs[*tail]);
    }

    #[test]
    fn test_compound_assignment_desugars() {
        let (mut ctx, root, mut body) = setup();
        let b = AstBuilder::new();
        let block = b.block(vec![
            b.let_stmt("n", Some(b.int(1))),
            b.expr_stmt(b.compound_assign(CompoundOp::Mul, b.ident("n"), b.int(3))),
        ]);
        lower_block(&mut ctx, root, &mut body, &block);
        assert!(ctx.errors.is_empty());
        let assign = body
            .stmts
            .iter()
            .find_map(|(_, stmt)| match stmt {
                Stmt::Assign { value, .. } => Some(*value),
                _ => None,
            })
            .unwrap();
        assert!(matches!(
            body.exprs[assign],
            Expr::Binary {
                op: BinaryOp::Mul,
                ..
            }
        ));
    }

    #[test]
    fn test_compound_assignment_on_assignment_shares_nothing() {
        let (mut ctx, root, mut body) = setup();
        let b = AstBuilder::new();
        let target = b.field(b.assign(b.ident("a"), b.int(2)), "x");
        let block = b.block(vec![
            b.let_stmt("a", Some(b.int(1))),
            b.expr_stmt(b.compound_assign(CompoundOp::Add, target, b.int(3))),
        ]);
        let root_expr = lower_block(&mut ctx, root, &mut body, &block);
        assert!(ctx.errors.is_empty());

        let stmts = reachable_stmts(&body, root_expr);
        let mut unique = stmts.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(stmts.len(), unique.len());
        // let, outer statement, outer assign, plus the inner assign three times
        assert_eq!(stmts.len(), 6);

        let exprs = body.descendants(root_expr);
        let mut unique_exprs = exprs.clone();
        unique_exprs.sort();
        unique_exprs.dedup();
        assert_eq!(exprs.len(), unique_exprs.len());
    }

    #[test]
    fn test_invalid_literal_reports() {
        let (mut ctx, root, mut body) = setup();
        let b = AstBuilder::new();
        let expr = b.literal(LiteralKind::Char, "ab");
        assert_eq!(lower_expr(&mut ctx, root, &mut body, &expr), None);
        assert!(matches!(ctx.errors[0], LoweringError::InvalidLiteral { .. }));
    }

    #[test]
    fn test_unknown_statement_dropped() {
        let (mut ctx, root, mut body) = setup();
        let b = AstBuilder::new();
        let block = b.block(vec![b.unknown_stmt("defer"), b.break_stmt()]);
        let root_expr = lower_block(&mut ctx, root, &mut body, &block);
        let Expr::Block { stmts, .. } = &body.exprs[root_expr] else {
            panic!("expected block");
        };
        assert_eq!(stmts.len(), 1);
        assert_eq!(ctx.errors.len(), 1);
    }

    #[test]
    fn test_for_binding_scoped_to_loop() {
        let (mut ctx, root, mut body) = setup();
        let b = AstBuilder::new();
        let block = b.block(vec![
            b.let_stmt("items", Some(b.int(3))),
            b.for_stmt("i", b.ident("items"), b.block(vec![b.expr_stmt(b.ident("i"))])),
            b.expr_stmt(b.ident("i")),
        ]);
        lower_block(&mut ctx, root, &mut body, &block);
        // `i` resolves inside the loop only.
        assert_eq!(ctx.errors.len(), 1);
    }
}
