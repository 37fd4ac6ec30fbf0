//! Validation rules over function bodies and module-level names

use tn_hir::{Body, Expr, ExprId, Function, HirNode, Stmt, StmtId, Visibility};

use crate::cfg::ControlFlowGraph;
use crate::context::ValidationContext;
use crate::diagnostic::{ErrorCode, WarningCode};

/// A check run by the validator
///
/// `check_module` runs once per module, `check_function` once for every
/// free function and impl method.
pub trait ValidationRule {
    /// Rule name
    fn name(&self) -> &'static str;

    /// Module-wide checks
    fn check_module(&self, _ctx: &mut ValidationContext<'_>) {}

    /// Checks one function or method
    fn check_function(&self, _function: &Function, _ctx: &mut ValidationContext<'_>) {}
}

/// Rule: a function with a non-unit return type must return on every path
pub struct MissingReturnRule;

impl ValidationRule for MissingReturnRule {
    fn name(&self) -> &'static str {
        "missing-return"
    }

    fn check_function(&self, function: &Function, ctx: &mut ValidationContext<'_>) {
        if function.return_type.is_unit() || block_returns(&function.body, function.body.root_expr) {
            return;
        }
        let name = ctx.name(function.name);
        let ty = function.return_type.display(&ctx.module.interner);
        ctx.error(
            function.span,
            ErrorCode::MissingReturn,
            format!("function `{name}` returns `{ty}` but not every path has a return"),
        );
    }
}

/// Whether some statement of the block is guaranteed to return
fn block_returns(body: &Body, block: ExprId) -> bool {
    match &body.exprs[block] {
        Expr::Block { stmts, .. } => stmts.iter().any(|stmt| stmt_returns(body, *stmt)),
        _ => false,
    }
}

fn stmt_returns(body: &Body, stmt: StmtId) -> bool {
    match &body.stmts[stmt] {
        Stmt::Return { .. } => true,
        Stmt::If {
            then_branch,
            else_branch: Some(else_branch),
            ..
        } => block_returns(body, *then_branch) && block_returns(body, *else_branch),
        Stmt::Expr { expr, .. } => block_returns(body, *expr),
        // Loops may run zero times.
        _ => false,
    }
}

/// Rule: parameters whose name never appears in the body
///
/// A plain name scan: an inner binding that shadows the parameter still
/// counts as a use. Names starting with `_` and `self` are skipped.
pub struct UnusedParameterRule;

impl ValidationRule for UnusedParameterRule {
    fn name(&self) -> &'static str {
        "unused-parameter"
    }

    fn check_function(&self, function: &Function, ctx: &mut ValidationContext<'_>) {
        let body = &function.body;
        let reachable = body.descendants(body.root_expr);
        for param in &function.params {
            let name = ctx.name(param.name);
            if name.starts_with('_') || name == "self" {
                continue;
            }
            let used = reachable.iter().any(
                |id| matches!(&body.exprs[*id], Expr::Variable { name, .. } if *name == param.name),
            );
            if !used {
                ctx.warning(
                    param.span,
                    WarningCode::UnusedParameter,
                    format!("parameter `{name}` is never used"),
                );
            }
        }
    }
}

/// Rule: top-level statements the control-flow graph never reaches
pub struct UnreachableCodeRule;

impl ValidationRule for UnreachableCodeRule {
    fn name(&self) -> &'static str {
        "unreachable-code"
    }

    fn check_function(&self, function: &Function, ctx: &mut ValidationContext<'_>) {
        let graph = ControlFlowGraph::build(&function.body);
        for stmt in graph.unreachable_statements() {
            ctx.warning(
                function.body.stmts[stmt].span(),
                WarningCode::UnreachableCode,
                "unreachable statement",
            );
        }
    }
}

/// Rule: unused module-level functions and variables
///
/// No use sites are tracked. Every private function other than `main` and
/// every module-level variable is reported.
pub struct UnusedSymbolRule;

impl ValidationRule for UnusedSymbolRule {
    fn name(&self) -> &'static str {
        "unused-symbol"
    }

    fn check_module(&self, ctx: &mut ValidationContext<'_>) {
        let module = ctx.module;
        for function in &module.functions {
            let name = ctx.name(function.name);
            if function.visibility == Visibility::Public || name == "main" {
                continue;
            }
            ctx.warning(
                function.span,
                WarningCode::UnusedFunction,
                format!("function `{name}` is never used"),
            );
        }
        for variable in &module.variables {
            let name = ctx.name(variable.name);
            ctx.warning(
                variable.span,
                WarningCode::UnusedVariable,
                format!("variable `{name}` is never used"),
            );
        }
    }
}
