//! Declaration lowering
//!
//! Top-level declarations are walked three times. The first walk binds every
//! type name and import, the second resolves function signatures and global
//! types, and the third lowers definitions and bodies. A body can therefore
//! name anything declared in the module, whatever the source order.

use tn_hir::{
    AssociatedType, Body, DefId, Export, FieldDef, Function, GenericParam, Import, Impl, ImplKind,
    MethodOwner, Module, Param, ScopeId, ScopeKind, SymbolKind, TraitMethod, Type, TypeDef, TypeDefId,
    TypeDefKind, Variable, VariantDef, Visibility, WhereClause,
};
use tn_span::FileSpan;
use tn_syntax::{self as ast, DeclKind};

use crate::body::{lower_block, lower_expr_or_missing};
use crate::context::{Collected, LoweringContext, Signature};
use crate::error::LoweringError;
use crate::ty::{lower_generics, lower_type, lower_type_or};

pub(crate) fn lower_visibility(visibility: ast::Visibility) -> Visibility {
    match visibility {
        ast::Visibility::Public => Visibility::Public,
        ast::Visibility::Private => Visibility::Private,
    }
}

/// First walk: type names and imports
pub(crate) fn collect_type_names(ctx: &mut LoweringContext, root: ScopeId, program: &ast::Program) {
    for (index, decl) in program.declarations.iter().enumerate() {
        let (name, kind) = match &decl.kind {
            DeclKind::Struct(def) => (&def.name, SymbolKind::Struct),
            DeclKind::Enum(def) => (&def.name, SymbolKind::Enum),
            DeclKind::Trait(def) => (&def.name, SymbolKind::Trait),
            DeclKind::TypeAlias(def) => (&def.name, SymbolKind::TypeAlias),
            DeclKind::Newtype(def) => (&def.name, SymbolKind::Newtype),
            DeclKind::Import(import) => {
                if let Some(local) = import.alias.as_ref().or(import.path.last()) {
                    let name = ctx.intern(local);
                    ctx.declare(root, name, SymbolKind::Import, None, Type::Inferred, decl.span);
                }
                continue;
            }
            _ => continue,
        };
        let id = ctx.alloc_type_id();
        let name = ctx.intern(name);
        ctx.declare(
            root,
            name,
            kind,
            Some(DefId::Type(id)),
            Type::Named {
                name,
                def: Some(id),
                args: Vec::new(),
            },
            decl.span,
        );
        ctx.collected.insert(index, Collected::Type(id));
    }
}

/// Second walk: function signatures and global variable types
pub(crate) fn collect_signatures(ctx: &mut LoweringContext, root: ScopeId, program: &ast::Program) {
    for (index, decl) in program.declarations.iter().enumerate() {
        match &decl.kind {
            DeclKind::Function(function) => {
                let signature = lower_signature(ctx, root, function, decl.span);
                let name = ctx.intern(&function.name);
                // Last registration wins; duplicates are for validation to find.
                ctx.declare(
                    root,
                    name,
                    SymbolKind::Function,
                    Some(DefId::Function(signature.id)),
                    signature_type(&signature),
                    decl.span,
                );
                ctx.collected.insert(index, Collected::Function(signature));
            }
            DeclKind::Variable(variable) => {
                let Some(name) = &variable.name else {
                    continue;
                };
                let id = ctx.alloc_variable_id();
                let ty = lower_type_or(ctx, root, variable.ty.as_ref(), Type::Inferred);
                let name = ctx.intern(name);
                let symbol = ctx.declare(
                    root,
                    name,
                    SymbolKind::Global,
                    Some(DefId::Global(id)),
                    ty,
                    decl.span,
                );
                ctx.collected.insert(index, Collected::Variable { id, symbol });
            }
            _ => {}
        }
    }
}

/// Third walk: definitions and bodies, routed into the module
pub(crate) fn lower_declarations(
    ctx: &mut LoweringContext,
    root: ScopeId,
    program: &ast::Program,
    module: &mut Module,
) {
    // Type definitions go first so field accesses in bodies can be typed.
    for (index, decl) in program.declarations.iter().enumerate() {
        if let Some(Collected::Type(id)) = ctx.collected.get(&index).cloned() {
            if let Some(def) = lower_type_def(ctx, root, id, decl) {
                tracing::debug!(
                    name = %ctx.interner.resolve(&def.name),
                    kind = def.kind_name(),
                    "lowered type definition"
                );
                module.types.push(def);
            }
        }
    }

    for (index, decl) in program.declarations.iter().enumerate() {
        let visibility = lower_visibility(decl.visibility);
        match &decl.kind {
            DeclKind::Function(function) => {
                let Some(Collected::Function(signature)) = ctx.collected.remove(&index) else {
                    continue;
                };
                let lowered = lower_function(ctx, signature, function, visibility, decl.span, None);
                tracing::debug!(name = %function.name, "lowered function");
                module.functions.push(lowered);
            }
            DeclKind::Variable(variable) => {
                if let Some(lowered) = lower_variable(ctx, root, index, variable, decl) {
                    module.variables.push(lowered);
                }
            }
            DeclKind::Impl(imp) => {
                let lowered = lower_impl(ctx, root, imp, decl.span);
                tracing::debug!(methods = lowered.methods.len(), "lowered impl block");
                module.impls.push(lowered);
            }
            DeclKind::Import(import) => module.imports.push(Import {
                path: import.path.iter().map(|segment| ctx.intern(segment)).collect(),
                alias: import.alias.as_ref().map(|alias| ctx.intern(alias)),
                span: decl.span,
            }),
            DeclKind::Export(export) => module.exports.push(Export {
                names: export.names.iter().map(|name| ctx.intern(name)).collect(),
                span: decl.span,
            }),
            DeclKind::Unknown(text) => ctx.report(LoweringError::UnsupportedNode {
                context: "declaration",
                description: text.clone(),
                span: decl.span,
            }),
            DeclKind::Struct(_)
            | DeclKind::Enum(_)
            | DeclKind::Trait(_)
            | DeclKind::TypeAlias(_)
            | DeclKind::Newtype(_) => {}
        }
    }
}

fn signature_type(signature: &Signature) -> Type {
    Type::Function {
        params: signature.params.clone(),
        ret: Box::new(signature.return_type.clone()),
    }
}

/// Opens the function scope and lowers generics, parameter types and return type
fn lower_signature(
    ctx: &mut LoweringContext,
    parent: ScopeId,
    function: &ast::FunctionDecl,
    span: FileSpan,
) -> Signature {
    let id = ctx.alloc_function_id();
    let scope = ctx.scopes.create_child(parent, ScopeKind::Function, span);
    let generics = lower_generics(ctx, scope, &function.generics);
    let params = function
        .params
        .iter()
        .map(|param| lower_type_or(ctx, scope, param.ty.as_ref(), Type::Inferred))
        .collect();
    let return_type = lower_type_or(ctx, scope, function.return_type.as_ref(), Type::Unit);
    Signature {
        id,
        scope,
        generics,
        params,
        return_type,
    }
}

/// Binds parameters in the signature scope and lowers the body
fn lower_function(
    ctx: &mut LoweringContext,
    signature: Signature,
    function: &ast::FunctionDecl,
    visibility: Visibility,
    span: FileSpan,
    owner: Option<MethodOwner>,
) -> Function {
    let params = function
        .params
        .iter()
        .zip(&signature.params)
        .map(|(param, ty)| {
            let local = ctx.alloc_local_id();
            let name = ctx.intern(&param.name);
            ctx.declare(
                signature.scope,
                name,
                SymbolKind::Parameter,
                Some(DefId::Local(local)),
                ty.clone(),
                param.span,
            );
            Param {
                name,
                local,
                ty: ty.clone(),
                span: param.span,
            }
        })
        .collect();

    let body = Body::with_root(|body| lower_block(ctx, signature.scope, body, &function.body));

    Function {
        id: signature.id,
        name: ctx.intern(&function.name),
        visibility,
        generics: signature.generics,
        params,
        return_type: signature.return_type,
        body,
        owner,
        scope: signature.scope,
        span,
    }
}

fn lower_variable(
    ctx: &mut LoweringContext,
    root: ScopeId,
    index: usize,
    variable: &ast::VariableDecl,
    decl: &ast::Decl,
) -> Option<Variable> {
    let Some(name) = &variable.name else {
        ctx.report(LoweringError::MalformedNode {
            what: "variable declaration without a name".to_string(),
            span: decl.span,
        });
        return None;
    };
    let Some(Collected::Variable { id, symbol }) = ctx.collected.remove(&index) else {
        return None;
    };

    let initializer = variable
        .init
        .as_ref()
        .map(|init| Body::with_root(|body| lower_expr_or_missing(ctx, root, body, init)));

    let mut ty = ctx.symbols.get(symbol).ty.clone();
    if ty == Type::Inferred {
        if let Some(body) = &initializer {
            ty = body.exprs[body.root_expr].ty();
            ctx.symbols.get_mut(symbol).ty = ty.clone();
        }
    }

    tracing::debug!(%name, "lowered global variable");
    Some(Variable {
        id,
        name: ctx.intern(name),
        visibility: lower_visibility(decl.visibility),
        mutable: variable.mutable,
        ty,
        initializer,
        span: decl.span,
    })
}

fn lower_type_def(
    ctx: &mut LoweringContext,
    root: ScopeId,
    id: TypeDefId,
    decl: &ast::Decl,
) -> Option<TypeDef> {
    let span = decl.span;
    let (name, generics, kind) = match &decl.kind {
        DeclKind::Struct(def) => {
            let scope = ctx.scopes.create_child(root, ScopeKind::TypeDef, span);
            let generics = lower_generics(ctx, scope, &def.generics);
            let fields: Vec<FieldDef> = def
                .fields
                .iter()
                .map(|field| FieldDef {
                    name: ctx.intern(&field.name),
                    ty: lower_type(ctx, scope, &field.ty),
                    span: field.span,
                })
                .collect();
            ctx.struct_fields.insert(id, fields.clone());
            (&def.name, generics, TypeDefKind::Struct { fields })
        }
        DeclKind::Enum(def) => {
            let scope = ctx.scopes.create_child(root, ScopeKind::TypeDef, span);
            let generics = lower_generics(ctx, scope, &def.generics);
            let variants = def
                .variants
                .iter()
                .map(|variant| VariantDef {
                    name: ctx.intern(&variant.name),
                    fields: variant
                        .fields
                        .iter()
                        .map(|field| lower_type(ctx, scope, field))
                        .collect(),
                    span: variant.span,
                })
                .collect();
            (&def.name, generics, TypeDefKind::Enum { variants })
        }
        DeclKind::Trait(def) => {
            let (generics, kind) = lower_trait(ctx, root, def, span);
            (&def.name, generics, kind)
        }
        DeclKind::TypeAlias(def) => {
            let scope = ctx.scopes.create_child(root, ScopeKind::TypeDef, span);
            let generics = lower_generics(ctx, scope, &def.generics);
            let target = lower_type(ctx, scope, &def.target);
            (&def.name, generics, TypeDefKind::Alias { target })
        }
        DeclKind::Newtype(def) => {
            let scope = ctx.scopes.create_child(root, ScopeKind::TypeDef, span);
            let generics = lower_generics(ctx, scope, &def.generics);
            let base = lower_type(ctx, scope, &def.base);
            (&def.name, generics, TypeDefKind::Newtype { base })
        }
        _ => return None,
    };

    Some(TypeDef {
        id,
        name: ctx.intern(name),
        visibility: lower_visibility(decl.visibility),
        generics,
        kind,
        span,
    })
}

fn lower_trait(
    ctx: &mut LoweringContext,
    root: ScopeId,
    def: &ast::TraitDecl,
    span: FileSpan,
) -> (Vec<GenericParam>, TypeDefKind) {
    let scope = ctx.scopes.create_child(root, ScopeKind::Trait, span);
    let self_name = ctx.intern("Self");
    ctx.declare(
        scope,
        self_name,
        SymbolKind::SelfType,
        None,
        Type::Generic { name: self_name },
        span,
    );
    let generics = lower_generics(ctx, scope, &def.generics);

    // Associated types are bound before any bound or method mentions them.
    let names: Vec<_> = def
        .associated_types
        .iter()
        .map(|assoc| {
            let name = ctx.intern(&assoc.name);
            ctx.declare(
                scope,
                name,
                SymbolKind::AssociatedType,
                None,
                Type::Generic { name },
                assoc.span,
            );
            name
        })
        .collect();
    let associated_types = def
        .associated_types
        .iter()
        .zip(names)
        .map(|(assoc, name)| AssociatedType {
            name,
            bounds: assoc
                .bounds
                .iter()
                .map(|bound| lower_type(ctx, scope, bound))
                .collect(),
            span: assoc.span,
        })
        .collect();

    let methods = def
        .methods
        .iter()
        .map(|method| {
            let method_scope = ctx
                .scopes
                .create_child(scope, ScopeKind::Function, method.span);
            let generics = lower_generics(ctx, method_scope, &method.generics);
            let params = method
                .params
                .iter()
                .map(|param| {
                    (
                        ctx.intern(&param.name),
                        lower_type_or(ctx, method_scope, param.ty.as_ref(), Type::Inferred),
                    )
                })
                .collect();
            let return_type =
                lower_type_or(ctx, method_scope, method.return_type.as_ref(), Type::Unit);
            TraitMethod {
                name: ctx.intern(&method.name),
                generics,
                params,
                return_type,
                span: method.span,
            }
        })
        .collect();

    (
        generics,
        TypeDefKind::Trait {
            methods,
            associated_types,
        },
    )
}

fn lower_impl(
    ctx: &mut LoweringContext,
    root: ScopeId,
    imp: &ast::ImplDecl,
    span: FileSpan,
) -> Impl {
    let id = ctx.alloc_impl_id();
    let scope = ctx.scopes.create_child(root, ScopeKind::Impl, span);
    let generics = lower_generics(ctx, scope, &imp.generics);
    let self_ty = lower_type(ctx, scope, &imp.self_ty);
    let trait_ref = imp
        .trait_ref
        .as_ref()
        .map(|trait_ref| lower_type(ctx, scope, trait_ref));

    let self_name = ctx.intern("Self");
    ctx.declare(
        scope,
        self_name,
        SymbolKind::SelfType,
        None,
        self_ty.clone(),
        span,
    );

    let where_clauses = imp
        .where_clauses
        .iter()
        .filter_map(|predicate| {
            // Only the first bound of a predicate is kept.
            let bound = predicate.bounds.first()?;
            Some(WhereClause {
                ty: lower_type(ctx, scope, &predicate.ty),
                bound: lower_type(ctx, scope, bound),
                span: predicate.span,
            })
        })
        .collect();

    let owner = MethodOwner {
        impl_id: id,
        self_ty: self_ty.clone(),
        trait_ref: trait_ref.clone(),
    };
    let mut methods = Vec::new();
    for member in &imp.methods {
        let DeclKind::Function(function) = &member.kind else {
            ctx.report(LoweringError::UnsupportedNode {
                context: "impl member",
                description: member.name().unwrap_or("declaration").to_string(),
                span: member.span,
            });
            continue;
        };
        // Methods stay out of the module-wide function table.
        let signature = lower_signature(ctx, scope, function, member.span);
        methods.push(lower_function(
            ctx,
            signature,
            function,
            lower_visibility(member.visibility),
            member.span,
            Some(owner.clone()),
        ));
    }

    Impl {
        id,
        kind: if trait_ref.is_some() {
            ImplKind::Trait
        } else {
            ImplKind::Inherent
        },
        self_ty,
        trait_ref,
        generics,
        where_clauses,
        methods,
        span,
    }
}
