//! Convenience constructors for syntax trees
//!
//! Used by tests and by tools that synthesize programs without a parser.
//! Declarations get distinct, increasing spans so diagnostics about them can
//! be told apart; every other node shares the builder's base span, which
//! keeps structurally identical subtrees equal.

use crate::ast::*;
use std::cell::Cell;
use tn_span::{FileId, FileSpan, Span};

/// Builds syntax-tree nodes for a single file
#[derive(Debug, Default)]
pub struct AstBuilder {
    file: FileId,
    next_offset: Cell<u32>,
}

impl AstBuilder {
    /// Creates a builder for file 0
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for the given file
    #[must_use]
    pub fn for_file(file: FileId) -> Self {
        Self {
            file,
            next_offset: Cell::new(0),
        }
    }

    /// Span shared by non-declaration nodes
    #[must_use]
    pub fn span(&self) -> FileSpan {
        FileSpan::new(self.file, Span::new(0, 0))
    }

    fn decl_span(&self) -> FileSpan {
        let start = self.next_offset.get() + 1;
        self.next_offset.set(start + 10);
        FileSpan::new(self.file, Span::new(start, start + 10))
    }

    fn expr(&self, kind: ExprKind) -> Expr {
        Expr {
            kind,
            span: self.span(),
        }
    }

    fn stmt(&self, kind: StmtKind) -> Stmt {
        Stmt {
            kind,
            span: self.span(),
        }
    }

    fn ty(&self, kind: TypeExprKind) -> TypeExpr {
        TypeExpr {
            kind,
            span: self.span(),
        }
    }

    fn decl(&self, kind: DeclKind) -> Decl {
        Decl::new(kind, self.decl_span())
    }

    // Expressions

    /// Literal with its source text kept as written
    #[must_use]
    pub fn literal(&self, kind: LiteralKind, text: &str) -> Expr {
        self.expr(ExprKind::Literal(Literal::new(kind, text)))
    }

    /// Integer literal
    #[must_use]
    pub fn int(&self, value: i64) -> Expr {
        self.literal(LiteralKind::Integer, &value.to_string())
    }

    /// Float literal from source text
    #[must_use]
    pub fn float(&self, text: &str) -> Expr {
        self.literal(LiteralKind::Float, text)
    }

    /// String literal
    #[must_use]
    pub fn string(&self, text: &str) -> Expr {
        self.literal(LiteralKind::String, text)
    }

    /// Character literal
    #[must_use]
    pub fn char_lit(&self, ch: char) -> Expr {
        self.literal(LiteralKind::Char, &ch.to_string())
    }

    /// `true` or `false`
    #[must_use]
    pub fn bool_lit(&self, value: bool) -> Expr {
        self.literal(LiteralKind::Boolean, if value { "true" } else { "false" })
    }

    /// Identifier reference
    #[must_use]
    pub fn ident(&self, name: &str) -> Expr {
        self.expr(ExprKind::Identifier(name.to_string()))
    }

    /// Binary operation
    #[must_use]
    pub fn binary(&self, op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        self.expr(ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    /// Unary operation
    #[must_use]
    pub fn unary(&self, op: UnaryOp, operand: Expr) -> Expr {
        self.expr(ExprKind::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    /// Call with positional arguments
    #[must_use]
    pub fn call(&self, callee: Expr, args: Vec<Expr>) -> Expr {
        self.expr(ExprKind::Call {
            callee: Box::new(callee),
            args,
        })
    }

    /// `base.field`
    #[must_use]
    pub fn field(&self, base: Expr, field: &str) -> Expr {
        self.expr(ExprKind::Field {
            base: Box::new(base),
            field: field.to_string(),
        })
    }

    /// `target = value`
    #[must_use]
    pub fn assign(&self, target: Expr, value: Expr) -> Expr {
        self.expr(ExprKind::Assign {
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    /// `target op= value`
    #[must_use]
    pub fn compound_assign(&self, op: CompoundOp, target: Expr, value: Expr) -> Expr {
        self.expr(ExprKind::CompoundAssign {
            op,
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    /// Expression the parser could not classify
    #[must_use]
    pub fn unknown_expr(&self, text: &str) -> Expr {
        self.expr(ExprKind::Unknown(text.to_string()))
    }

    // Statements

    /// Untyped `let`
    #[must_use]
    pub fn let_stmt(&self, name: &str, init: Option<Expr>) -> Stmt {
        self.stmt(StmtKind::Let {
            name: name.to_string(),
            mutable: false,
            ty: None,
            init,
        })
    }

    /// `let` with a type annotation
    #[must_use]
    pub fn let_typed(&self, name: &str, ty: TypeExpr, init: Option<Expr>) -> Stmt {
        self.stmt(StmtKind::Let {
            name: name.to_string(),
            mutable: false,
            ty: Some(ty),
            init,
        })
    }

    /// Expression statement
    #[must_use]
    pub fn expr_stmt(&self, expr: Expr) -> Stmt {
        self.stmt(StmtKind::Expr(expr))
    }

    /// `return`, with or without a value
    #[must_use]
    pub fn return_stmt(&self, value: Option<Expr>) -> Stmt {
        self.stmt(StmtKind::Return(value))
    }

    /// `break`
    #[must_use]
    pub fn break_stmt(&self) -> Stmt {
        self.stmt(StmtKind::Break)
    }

    /// `continue`
    #[must_use]
    pub fn continue_stmt(&self) -> Stmt {
        self.stmt(StmtKind::Continue)
    }

    /// Nested block as a statement
    #[must_use]
    pub fn block_stmt(&self, block: Block) -> Stmt {
        self.stmt(StmtKind::Block(block))
    }

    /// `if`, optionally with an else block
    #[must_use]
    pub fn if_stmt(&self, condition: Expr, then_branch: Block, else_branch: Option<Block>) -> Stmt {
        self.stmt(StmtKind::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    /// `while` loop
    #[must_use]
    pub fn while_stmt(&self, condition: Expr, body: Block) -> Stmt {
        self.stmt(StmtKind::While { condition, body })
    }

    /// `for binding in iterable`
    #[must_use]
    pub fn for_stmt(&self, binding: &str, iterable: Expr, body: Block) -> Stmt {
        self.stmt(StmtKind::For {
            binding: binding.to_string(),
            iterable,
            body,
        })
    }

    /// Statement the parser could not classify
    #[must_use]
    pub fn unknown_stmt(&self, text: &str) -> Stmt {
        self.stmt(StmtKind::Unknown(text.to_string()))
    }

    /// Block of statements
    #[must_use]
    pub fn block(&self, stmts: Vec<Stmt>) -> Block {
        Block::new(stmts, self.span())
    }

    // Types

    /// Type named without arguments
    #[must_use]
    pub fn named_ty(&self, name: &str) -> TypeExpr {
        self.generic_ty(name, Vec::new())
    }

    /// Named type with arguments
    #[must_use]
    pub fn generic_ty(&self, name: &str, args: Vec<TypeExpr>) -> TypeExpr {
        self.ty(TypeExprKind::Named {
            name: name.to_string(),
            args,
        })
    }

    /// Tuple type
    #[must_use]
    pub fn tuple_ty(&self, elements: Vec<TypeExpr>) -> TypeExpr {
        self.ty(TypeExprKind::Tuple(elements))
    }

    /// Reference type
    #[must_use]
    pub fn ref_ty(&self, inner: TypeExpr, mutable: bool) -> TypeExpr {
        self.ty(TypeExprKind::Reference {
            mutable,
            inner: Box::new(inner),
        })
    }

    /// Function type
    #[must_use]
    pub fn fn_ty(&self, params: Vec<TypeExpr>, ret: TypeExpr) -> TypeExpr {
        self.ty(TypeExprKind::Function {
            params,
            ret: Box::new(ret),
        })
    }

    /// `()`
    #[must_use]
    pub fn unit_ty(&self) -> TypeExpr {
        self.ty(TypeExprKind::Unit)
    }

    /// Parameter; `None` leaves the type to inference
    #[must_use]
    pub fn param(&self, name: &str, ty: Option<TypeExpr>) -> Param {
        Param {
            name: name.to_string(),
            ty,
            span: self.span(),
        }
    }

    /// Generic parameter with trait bounds
    #[must_use]
    pub fn generic_param(&self, name: &str, bounds: Vec<TypeExpr>) -> GenericParam {
        GenericParam {
            name: name.to_string(),
            bounds,
            span: self.span(),
        }
    }

    // Declarations

    /// Function body and signature without the surrounding declaration
    #[must_use]
    pub fn function_decl(
        &self,
        name: &str,
        params: Vec<Param>,
        return_type: Option<TypeExpr>,
        body: Block,
    ) -> FunctionDecl {
        FunctionDecl {
            name: name.to_string(),
            generics: Vec::new(),
            params,
            return_type,
            body,
        }
    }

    /// Private function declaration
    #[must_use]
    pub fn function(
        &self,
        name: &str,
        params: Vec<Param>,
        return_type: Option<TypeExpr>,
        body: Block,
    ) -> Decl {
        self.decl(DeclKind::Function(
            self.function_decl(name, params, return_type, body),
        ))
    }

    /// Struct with named fields in order
    #[must_use]
    pub fn struct_decl(&self, name: &str, fields: Vec<(&str, TypeExpr)>) -> Decl {
        let fields = fields
            .into_iter()
            .map(|(field, ty)| FieldDecl {
                name: field.to_string(),
                ty,
                span: self.span(),
            })
            .collect();
        self.decl(DeclKind::Struct(StructDecl {
            name: name.to_string(),
            generics: Vec::new(),
            fields,
        }))
    }

    /// Enum whose variants carry positional payloads
    #[must_use]
    pub fn enum_decl(&self, name: &str, variants: Vec<(&str, Vec<TypeExpr>)>) -> Decl {
        let variants = variants
            .into_iter()
            .map(|(variant, fields)| VariantDecl {
                name: variant.to_string(),
                fields,
                span: self.span(),
            })
            .collect();
        self.decl(DeclKind::Enum(EnumDecl {
            name: name.to_string(),
            generics: Vec::new(),
            variants,
        }))
    }

    /// Trait method signature
    #[must_use]
    pub fn method_sig(
        &self,
        name: &str,
        params: Vec<Param>,
        return_type: Option<TypeExpr>,
    ) -> MethodSig {
        MethodSig {
            name: name.to_string(),
            generics: Vec::new(),
            params,
            return_type,
            span: self.span(),
        }
    }

    /// Trait with method signatures and associated types
    #[must_use]
    pub fn trait_decl(
        &self,
        name: &str,
        methods: Vec<MethodSig>,
        associated_types: Vec<&str>,
    ) -> Decl {
        let associated_types = associated_types
            .into_iter()
            .map(|assoc| AssociatedTypeDecl {
                name: assoc.to_string(),
                bounds: Vec::new(),
                span: self.span(),
            })
            .collect();
        self.decl(DeclKind::Trait(TraitDecl {
            name: name.to_string(),
            generics: Vec::new(),
            methods,
            associated_types,
        }))
    }

    /// Impl block, inherent when `trait_ref` is `None`
    #[must_use]
    pub fn impl_decl(
        &self,
        self_ty: TypeExpr,
        trait_ref: Option<TypeExpr>,
        methods: Vec<Decl>,
    ) -> Decl {
        self.decl(DeclKind::Impl(ImplDecl {
            generics: Vec::new(),
            self_ty,
            trait_ref,
            where_clauses: Vec::new(),
            methods,
        }))
    }

    /// `ty: bounds` in a where clause
    #[must_use]
    pub fn where_predicate(&self, ty: TypeExpr, bounds: Vec<TypeExpr>) -> WherePredicate {
        WherePredicate {
            ty,
            bounds,
            span: self.span(),
        }
    }

    /// Import of a path, optionally renamed
    #[must_use]
    pub fn import(&self, path: &[&str], alias: Option<&str>) -> Decl {
        self.decl(DeclKind::Import(ImportDecl {
            path: path.iter().map(ToString::to_string).collect(),
            alias: alias.map(ToString::to_string),
        }))
    }

    /// Export of the given names
    #[must_use]
    pub fn export(&self, names: &[&str]) -> Decl {
        self.decl(DeclKind::Export(ExportDecl {
            names: names.iter().map(ToString::to_string).collect(),
        }))
    }

    /// `type name = target`
    #[must_use]
    pub fn type_alias(&self, name: &str, target: TypeExpr) -> Decl {
        self.decl(DeclKind::TypeAlias(TypeAliasDecl {
            name: name.to_string(),
            generics: Vec::new(),
            target,
        }))
    }

    /// Newtype over `base`
    #[must_use]
    pub fn newtype(&self, name: &str, base: TypeExpr) -> Decl {
        self.decl(DeclKind::Newtype(NewtypeDecl {
            name: name.to_string(),
            generics: Vec::new(),
            base,
        }))
    }

    /// Module-level variable
    #[must_use]
    pub fn variable(&self, name: &str, ty: Option<TypeExpr>, init: Option<Expr>) -> Decl {
        self.decl(DeclKind::Variable(VariableDecl {
            name: Some(name.to_string()),
            mutable: false,
            ty,
            init,
        }))
    }

    /// Declaration the parser could not classify
    #[must_use]
    pub fn unknown_decl(&self, text: &str) -> Decl {
        self.decl(DeclKind::Unknown(text.to_string()))
    }

    /// Wraps declarations into a program
    #[must_use]
    pub fn program(&self, declarations: Vec<Decl>) -> Program {
        let end = self.next_offset.get();
        Program::new(declarations, FileSpan::new(self.file, Span::new(0, end)))
    }
}
