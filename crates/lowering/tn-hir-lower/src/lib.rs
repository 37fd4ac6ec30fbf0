//! Lowering from the syntax tree to the IR
//!
//! [`lower_program`] never stops at the first problem. Each failure is
//! recorded as a [`LoweringError`] and the offending node is skipped or
//! replaced by a placeholder, so the returned [`Module`] is always usable.

mod body;
mod context;
pub mod error;
mod item;
pub mod ty;

pub use context::LoweringContext;
pub use error::LoweringError;

use tn_hir::Module;
use tn_syntax::Program;

/// Lower a whole program into a module
pub fn lower_program(program: &Program) -> (Module, Vec<LoweringError>) {
    lower_program_with(LoweringContext::new(), program)
}

/// Lower a program using a caller-provided context
///
/// Useful when names must be interned into an interner shared with other
/// stages.
pub fn lower_program_with(
    mut ctx: LoweringContext,
    program: &Program,
) -> (Module, Vec<LoweringError>) {
    let root = ctx.scopes.create_root(program.span);
    item::collect_type_names(&mut ctx, root, program);
    item::collect_signatures(&mut ctx, root, program);

    let mut module = Module::new(ctx.interner.clone(), program.span);
    item::lower_declarations(&mut ctx, root, program, &mut module);

    tracing::debug!(
        functions = module.functions.len(),
        types = module.types.len(),
        errors = ctx.errors.len(),
        "lowered program"
    );

    module.scopes = ctx.scopes;
    module.symbols = ctx.symbols;
    (module, ctx.errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tn_syntax::AstBuilder;

    #[test]
    fn test_unresolved_identifier_single_error() {
        let b = AstBuilder::new();
        let program = b.program(vec![b.function(
            "main",
            vec![],
            None,
            b.block(vec![b.expr_stmt(b.call(b.ident("undefined_fn"), vec![b.int(1)]))]),
        )]);
        let (module, errors) = lower_program(&program);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("undefined_fn"));
        assert_eq!(module.functions.len(), 1);
    }

    #[test]
    fn test_duplicate_functions_both_lowered() {
        let b = AstBuilder::new();
        let program = b.program(vec![
            b.function("dup", vec![], None, b.block(vec![])),
            b.function("dup", vec![], None, b.block(vec![])),
        ]);
        let (module, errors) = lower_program(&program);
        assert!(errors.is_empty());
        assert_eq!(module.functions.len(), 2);
        assert_ne!(module.functions[0].id, module.functions[1].id);
    }

    #[test]
    fn test_parameter_scope() {
        let b = AstBuilder::new();
        let program = b.program(vec![
            b.function(
                "id",
                vec![b.param("value", None)],
                None,
                b.block(vec![b.expr_stmt(b.ident("value"))]),
            ),
            b.function(
                "other",
                vec![],
                None,
                b.block(vec![b.expr_stmt(b.ident("value"))]),
            ),
        ]);
        let (module, errors) = lower_program(&program);
        assert_eq!(errors.len(), 1);
        assert_eq!(module.functions[0].params[0].ty, tn_hir::Type::Inferred);
        assert!(module.scopes.len() > 1);
    }
}
