//! Type expression lowering

use tn_hir::{GenericParam, PrimitiveType, ScopeId, SymbolKind, Type};
use tn_syntax::{GenericParam as AstGenericParam, TypeExpr, TypeExprKind};

use crate::context::LoweringContext;
use crate::error::LoweringError;

/// Lower a type expression in `scope`.
///
/// Names that resolve to nothing become `Type::Named` with no definition;
/// reporting them is left to validation. Unrecognized syntax is reported
/// and replaced by `Type::Inferred`.
pub fn lower_type(ctx: &mut LoweringContext, scope: ScopeId, ty: &TypeExpr) -> Type {
    match &ty.kind {
        TypeExprKind::Named { name, args } => {
            if args.is_empty() {
                if let Some(prim) = PrimitiveType::from_name(name) {
                    return Type::Primitive(prim);
                }
            }
            let args: Vec<Type> = args.iter().map(|arg| lower_type(ctx, scope, arg)).collect();
            let symbol = ctx.intern(name);
            match ctx.scopes.resolve_type(scope, symbol) {
                Some(id) => match ctx.symbols.get(id).ty.clone() {
                    Type::Named { name, def, .. } => Type::Named { name, def, args },
                    other => other,
                },
                None => Type::Named {
                    name: symbol,
                    def: None,
                    args,
                },
            }
        }
        TypeExprKind::Tuple(elements) => Type::Tuple(
            elements
                .iter()
                .map(|element| lower_type(ctx, scope, element))
                .collect(),
        ),
        TypeExprKind::Reference { mutable, inner } => Type::Reference {
            mutable: *mutable,
            inner: Box::new(lower_type(ctx, scope, inner)),
        },
        TypeExprKind::Function { params, ret } => Type::Function {
            params: params
                .iter()
                .map(|param| lower_type(ctx, scope, param))
                .collect(),
            ret: Box::new(lower_type(ctx, scope, ret)),
        },
        TypeExprKind::Unit => Type::Unit,
        TypeExprKind::Unknown(text) => {
            ctx.report(LoweringError::UnsupportedNode {
                context: "type",
                description: text.clone(),
                span: ty.span,
            });
            Type::Inferred
        }
    }
}

/// Lower an optional annotation, defaulting to `fallback`
pub fn lower_type_or(
    ctx: &mut LoweringContext,
    scope: ScopeId,
    ty: Option<&TypeExpr>,
    fallback: Type,
) -> Type {
    ty.map_or(fallback, |ty| lower_type(ctx, scope, ty))
}

/// Bind generic parameters in `scope`, then lower their bounds.
///
/// All names are bound first so a bound may mention a later parameter.
pub fn lower_generics(
    ctx: &mut LoweringContext,
    scope: ScopeId,
    generics: &[AstGenericParam],
) -> Vec<GenericParam> {
    let names: Vec<_> = generics
        .iter()
        .map(|param| {
            let name = ctx.intern(&param.name);
            ctx.declare(
                scope,
                name,
                SymbolKind::GenericParam,
                None,
                Type::Generic { name },
                param.span,
            );
            name
        })
        .collect();

    generics
        .iter()
        .zip(names)
        .map(|(param, name)| GenericParam {
            name,
            bounds: param
                .bounds
                .iter()
                .map(|bound| lower_type(ctx, scope, bound))
                .collect(),
            span: param.span,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tn_hir::ScopeKind;
    use tn_span::FileSpan;
    use tn_syntax::AstBuilder;

    fn setup() -> (LoweringContext, ScopeId) {
        let mut ctx = LoweringContext::new();
        let root = ctx.scopes.create_root(FileSpan::dummy());
        (ctx, root)
    }

    #[test]
    fn test_primitive_and_unit() {
        let (mut ctx, root) = setup();
        let b = AstBuilder::new();
        assert_eq!(
            lower_type(&mut ctx, root, &b.named_ty("bool")),
            Type::Primitive(PrimitiveType::Bool)
        );
        assert_eq!(lower_type(&mut ctx, root, &b.unit_ty()), Type::Unit);
    }

    #[test]
    fn test_unresolved_name_has_no_def() {
        let (mut ctx, root) = setup();
        let b = AstBuilder::new();
        let ty = lower_type(&mut ctx, root, &b.named_ty("Missing"));
        assert!(matches!(ty, Type::Named { def: None, .. }));
        assert!(ctx.errors.is_empty());
    }

    #[test]
    fn test_generic_resolves_in_scope() {
        let (mut ctx, root) = setup();
        let b = AstBuilder::new();
        let scope = ctx.scopes.create_child(root, ScopeKind::Function, FileSpan::dummy());
        let generics = lower_generics(&mut ctx, scope, &[b.generic_param("T", vec![])]);
        assert_eq!(generics.len(), 1);

        let ty = lower_type(&mut ctx, scope, &b.ref_ty(b.named_ty("T"), false));
        let t = ctx.intern("T");
        assert_eq!(
            ty,
            Type::Reference {
                mutable: false,
                inner: Box::new(Type::Generic { name: t }),
            }
        );
        // Not visible from the parent scope.
        assert!(matches!(
            lower_type(&mut ctx, root, &b.named_ty("T")),
            Type::Named { def: None, .. }
        ));
    }

    #[test]
    fn test_unknown_type_reports() {
        let (mut ctx, root) = setup();
        let span = FileSpan::dummy();
        let ty = TypeExpr {
            kind: TypeExprKind::Unknown("impl Trait".to_string()),
            span,
        };
        assert_eq!(lower_type(&mut ctx, root, &ty), Type::Inferred);
        assert_eq!(ctx.errors.len(), 1);
    }
}
