//! Type validity and self-containment checks
//!
//! Every type written in a signature, field, alias, impl header, bound or
//! `let` must name a definition of the module or an imported name. Traits
//! may only appear as bounds and trait references; everything else must be
//! a value type.

use rustc_hash::FxHashSet;
use tn_hir::{Function, GenericParam, Stmt, Type, TypeDef, TypeDefId, TypeDefKind};
use tn_intern::Symbol;
use tn_span::FileSpan;

use crate::context::ValidationContext;
use crate::diagnostic::{ErrorCode, WarningCode};
use crate::rules::ValidationRule;
use crate::table::Declared;

/// Where a type is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    /// A type a value can have
    Value,
    /// Target of an impl block
    ImplTarget,
    /// Trait bound or implemented trait
    Bound,
}

/// Outcome of looking a named type up
enum Lookup<'m> {
    Defined(&'m TypeDef),
    Imported,
    Undefined,
}

/// Checks one item's types, reporting each undefined name once
struct TypeChecker<'c, 'a> {
    ctx: &'c mut ValidationContext<'a>,
    reported: FxHashSet<Symbol>,
}

impl<'c, 'a> TypeChecker<'c, 'a> {
    fn new(ctx: &'c mut ValidationContext<'a>) -> Self {
        Self {
            ctx,
            reported: FxHashSet::default(),
        }
    }

    fn lookup(&self, name: Symbol, def: Option<TypeDefId>) -> Lookup<'a> {
        let module = self.ctx.module;
        let id = match def {
            Some(id) => Some(id),
            None => match self.ctx.table().ty(name).map(|entry| entry.declared) {
                Some(Declared::Type(id)) => Some(id),
                _ => None,
            },
        };
        match id.and_then(|id| module.type_def(id)) {
            Some(def) => Lookup::Defined(def),
            None if def.is_none() && self.ctx.table().is_imported(name) => Lookup::Imported,
            None => Lookup::Undefined,
        }
    }

    fn check(&mut self, ty: &Type, span: FileSpan, position: Position) {
        match ty {
            Type::Named { name, def, args } => {
                match self.lookup(*name, *def) {
                    Lookup::Defined(def) => self.check_kind(def, span, position),
                    Lookup::Imported => {}
                    Lookup::Undefined => {
                        if self.reported.insert(*name) {
                            let text = self.ctx.name(*name);
                            self.ctx.error(
                                span,
                                ErrorCode::UndefinedType,
                                format!("undefined type `{text}`"),
                            );
                        }
                    }
                }
                for arg in args {
                    self.check(arg, span, Position::Value);
                }
            }
            Type::Generic { .. } | Type::Inferred => {}
            other if position == Position::Bound => {
                let text = other.display(&self.ctx.module.interner);
                self.ctx.error(
                    span,
                    ErrorCode::InvalidTypeUsage,
                    format!("`{text}` is not a trait"),
                );
            }
            Type::Primitive(_) | Type::Unit => {}
            Type::Tuple(elements) => {
                for element in elements {
                    self.check(element, span, Position::Value);
                }
            }
            Type::Reference { inner, .. } => self.check(inner, span, Position::Value),
            Type::Function { params, ret } => {
                for param in params {
                    self.check(param, span, Position::Value);
                }
                self.check(ret, span, Position::Value);
            }
        }
    }

    fn check_kind(&mut self, def: &TypeDef, span: FileSpan, position: Position) {
        let name = self.ctx.name(def.name);
        let message = match position {
            Position::Value if def.is_trait() => format!("trait `{name}` used as a type"),
            Position::ImplTarget if def.is_trait() => {
                format!("trait `{name}` cannot be the target of an impl")
            }
            Position::Bound if !def.is_trait() => {
                format!("{} `{name}` is not a trait", def.kind_name())
            }
            _ => return,
        };
        self.ctx.error(span, ErrorCode::InvalidTypeUsage, message);
    }

    fn check_generics(&mut self, generics: &[GenericParam]) {
        for param in generics {
            for bound in &param.bounds {
                self.check(bound, param.span, Position::Bound);
            }
        }
    }

    fn check_function(&mut self, function: &Function) {
        self.check_generics(&function.generics);
        for param in &function.params {
            self.check(&param.ty, param.span, Position::Value);
        }
        self.check(&function.return_type, function.span, Position::Value);
        for (_, stmt) in function.body.stmts.iter() {
            if let Stmt::Let { ty, span, .. } = stmt {
                self.check(ty, *span, Position::Value);
            }
        }
    }

    fn check_type_def(&mut self, def: &TypeDef) {
        self.check_generics(&def.generics);
        match &def.kind {
            TypeDefKind::Struct { fields } => {
                for field in fields {
                    self.check(&field.ty, field.span, Position::Value);
                }
            }
            TypeDefKind::Enum { variants } => {
                for variant in variants {
                    for ty in &variant.fields {
                        self.check(ty, variant.span, Position::Value);
                    }
                }
            }
            TypeDefKind::Trait {
                methods,
                associated_types,
            } => {
                for assoc in associated_types {
                    for bound in &assoc.bounds {
                        self.check(bound, assoc.span, Position::Bound);
                    }
                }
                for method in methods {
                    self.check_generics(&method.generics);
                    for (_, ty) in &method.params {
                        self.check(ty, method.span, Position::Value);
                    }
                    self.check(&method.return_type, method.span, Position::Value);
                }
            }
            TypeDefKind::Alias { target } => self.check(target, def.span, Position::Value),
            TypeDefKind::Newtype { base } => self.check(base, def.span, Position::Value),
        }
    }
}

/// Rule: undefined type names and traits in the wrong position
pub struct TypeValidityRule;

impl ValidationRule for TypeValidityRule {
    fn name(&self) -> &'static str {
        "type-validity"
    }

    fn check_module(&self, ctx: &mut ValidationContext<'_>) {
        let module = ctx.module;
        for def in &module.types {
            TypeChecker::new(ctx).check_type_def(def);
        }
        for variable in &module.variables {
            TypeChecker::new(ctx).check(&variable.ty, variable.span, Position::Value);
        }
        for imp in &module.impls {
            let mut checker = TypeChecker::new(ctx);
            checker.check_generics(&imp.generics);
            checker.check(&imp.self_ty, imp.span, Position::ImplTarget);
            if let Some(trait_ref) = &imp.trait_ref {
                checker.check(trait_ref, imp.span, Position::Bound);
            }
            for clause in &imp.where_clauses {
                checker.check(&clause.ty, clause.span, Position::Value);
                checker.check(&clause.bound, clause.span, Position::Bound);
            }
        }
    }

    fn check_function(&self, function: &Function, ctx: &mut ValidationContext<'_>) {
        TypeChecker::new(ctx).check_function(function);
    }
}

/// Rule: a struct or enum that holds itself by value
///
/// Only direct containment is seen, through tuples but not through
/// references or generic arguments.
pub struct RecursiveTypeRule;

impl ValidationRule for RecursiveTypeRule {
    fn name(&self) -> &'static str {
        "recursive-type"
    }

    fn check_module(&self, ctx: &mut ValidationContext<'_>) {
        let module = ctx.module;
        for def in &module.types {
            let recursive = match &def.kind {
                TypeDefKind::Struct { fields } => {
                    fields.iter().any(|field| contains_by_value(&field.ty, def.id))
                }
                TypeDefKind::Enum { variants } => variants
                    .iter()
                    .flat_map(|variant| &variant.fields)
                    .any(|ty| contains_by_value(ty, def.id)),
                _ => false,
            };
            if recursive {
                let name = ctx.name(def.name);
                ctx.warning(
                    def.span,
                    WarningCode::RecursiveType,
                    format!("{} `{name}` contains itself and may have infinite size", def.kind_name()),
                );
            }
        }
    }
}

fn contains_by_value(ty: &Type, id: TypeDefId) -> bool {
    match ty {
        Type::Named { def, .. } => *def == Some(id),
        Type::Tuple(elements) => elements.iter().any(|element| contains_by_value(element, id)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValidationReport;
    use tn_hir::Module;
    use tn_hir_lower::lower_program;
    use tn_syntax::{AstBuilder, Decl, DeclKind};

    fn lower(b: &AstBuilder, decls: Vec<Decl>) -> Module {
        lower_program(&b.program(decls)).0
    }

    fn run(rule: &dyn ValidationRule, module: &Module) -> ValidationReport {
        let mut ctx = ValidationContext::new(module);
        rule.check_module(&mut ctx);
        for function in module.all_functions() {
            rule.check_function(function, &mut ctx);
        }
        ctx.into_report()
    }

    #[test]
    fn test_undefined_type_in_signature() {
        let b = AstBuilder::new();
        let module = lower(
            &b,
            vec![b.function(
                "f",
                vec![b.param("a", Some(b.named_ty("Missing")))],
                Some(b.named_ty("Missing")),
                b.block(vec![]),
            )],
        );
        let report = run(&TypeValidityRule, &module);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].message, "undefined type `Missing`");
    }

    #[test]
    fn test_defined_imported_and_builtin_accepted() {
        let b = AstBuilder::new();
        let module = lower(
            &b,
            vec![
                b.import(&["std", "collections", "HashMap"], None),
                b.struct_decl(
                    "Point",
                    vec![
                        ("x", b.named_ty("i64")),
                        ("table", b.generic_ty("HashMap", vec![b.named_ty("string"), b.named_ty("Point")])),
                    ],
                ),
                b.function(
                    "origin",
                    vec![b.param("p", Some(b.ref_ty(b.named_ty("Point"), false)))],
                    None,
                    b.block(vec![]),
                ),
            ],
        );
        assert!(run(&TypeValidityRule, &module).errors.is_empty());
    }

    #[test]
    fn test_trait_used_as_value_type() {
        let b = AstBuilder::new();
        let module = lower(
            &b,
            vec![
                b.trait_decl("Shape", vec![], vec![]),
                b.variable("current", Some(b.named_ty("Shape")), None),
            ],
        );
        let report = run(&TypeValidityRule, &module);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].code, ErrorCode::InvalidTypeUsage);
        assert_eq!(report.errors[0].message, "trait `Shape` used as a type");
    }

    #[test]
    fn test_impl_of_non_trait() {
        let b = AstBuilder::new();
        let module = lower(
            &b,
            vec![
                b.struct_decl("Circle", vec![]),
                b.struct_decl("Square", vec![]),
                b.impl_decl(b.named_ty("Circle"), Some(b.named_ty("Square")), vec![]),
            ],
        );
        let report = run(&TypeValidityRule, &module);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].message, "struct `Square` is not a trait");
    }

    #[test]
    fn test_impl_targeting_trait() {
        let b = AstBuilder::new();
        let module = lower(
            &b,
            vec![
                b.trait_decl("Shape", vec![], vec![]),
                b.impl_decl(b.named_ty("Shape"), None, vec![]),
            ],
        );
        let report = run(&TypeValidityRule, &module);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors[0].message,
            "trait `Shape` cannot be the target of an impl"
        );
    }

    #[test]
    fn test_primitive_bound_rejected() {
        let b = AstBuilder::new();
        let mut function = b.function_decl("f", vec![], None, b.block(vec![]));
        function.generics = vec![b.generic_param("T", vec![b.named_ty("i32")])];
        let module = lower(&b, vec![Decl::new(DeclKind::Function(function), b.span())]);
        let report = run(&TypeValidityRule, &module);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].message, "`i32` is not a trait");
    }

    #[test]
    fn test_primitive_trait_ref_and_bound() {
        let b = AstBuilder::new();
        let mut function = b.function_decl("f", vec![], None, b.block(vec![]));
        function.generics = vec![b.generic_param("T", vec![b.named_ty("i32")])];
        let module = lower(
            &b,
            vec![
                b.struct_decl("Circle", vec![]),
                b.impl_decl(b.named_ty("Circle"), Some(b.named_ty("i32")), vec![]),
                Decl::new(DeclKind::Function(function), b.span()),
            ],
        );
        let report = run(&TypeValidityRule, &module);
        let codes: Vec<_> = report.errors.iter().map(|e| e.code).collect();
        assert_eq!(codes, [ErrorCode::InvalidTypeUsage, ErrorCode::InvalidTypeUsage]);
        assert!(report.errors.iter().all(|e| e.message == "`i32` is not a trait"));
    }

    #[test]
    fn test_primitive_value_types_accepted() {
        let b = AstBuilder::new();
        let module = lower(
            &b,
            vec![b.function(
                "f",
                vec![b.param("a", Some(b.named_ty("i32")))],
                Some(b.tuple_ty(vec![b.named_ty("bool"), b.named_ty("f64")])),
                b.block(vec![]),
            )],
        );
        assert!(run(&TypeValidityRule, &module).errors.is_empty());
    }

    #[test]
    fn test_undefined_local_annotation() {
        let b = AstBuilder::new();
        let body = b.block(vec![b.let_typed("x", b.named_ty("Ghost"), None)]);
        let module = lower(&b, vec![b.function("f", vec![], None, body)]);
        let report = run(&TypeValidityRule, &module);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].code, ErrorCode::UndefinedType);
    }

    #[test]
    fn test_recursive_struct_and_enum() {
        let b = AstBuilder::new();
        let module = lower(
            &b,
            vec![
                b.struct_decl("Node", vec![("next", b.named_ty("Node"))]),
                b.struct_decl("Link", vec![("next", b.ref_ty(b.named_ty("Link"), false))]),
                b.enum_decl(
                    "Expr",
                    vec![("Pair", vec![b.tuple_ty(vec![b.named_ty("Expr"), b.named_ty("i64")])])],
                ),
            ],
        );
        let report = run(&RecursiveTypeRule, &module);
        let messages: Vec<_> = report.warnings.iter().map(|w| w.message.as_str()).collect();
        assert_eq!(
            messages,
            [
                "struct `Node` contains itself and may have infinite size",
                "enum `Expr` contains itself and may have infinite size",
            ]
        );
    }
}
