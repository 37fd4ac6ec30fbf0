//! Syntax tree node definitions
//!
//! Children are boxed or held in vectors directly, so `Clone` is a deep
//! clone and the derived `PartialEq` is structural equality.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use tn_span::FileSpan;

/// Identifier text as written in source
pub type Name = String;

/// A parsed compilation unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Top-level declarations in source order
    pub declarations: Vec<Decl>,
    /// Source location
    pub span: FileSpan,
}

impl Program {
    /// Creates a program from its declarations
    #[must_use]
    pub fn new(declarations: Vec<Decl>, span: FileSpan) -> Self {
        Self { declarations, span }
    }
}

/// Declaration visibility
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    /// Visible outside the module
    Public,
    /// Module-private
    #[default]
    Private,
}

/// A top-level (or impl-level) declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decl {
    /// Declaration payload
    pub kind: DeclKind,
    /// Declared visibility
    pub visibility: Visibility,
    /// Source location
    pub span: FileSpan,
}

impl Decl {
    /// Creates a private declaration
    #[must_use]
    pub fn new(kind: DeclKind, span: FileSpan) -> Self {
        Self {
            kind,
            visibility: Visibility::Private,
            span,
        }
    }

    /// Marks the declaration public
    #[must_use]
    pub fn public(mut self) -> Self {
        self.visibility = Visibility::Public;
        self
    }

    /// Declared name, for the forms that have one
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            DeclKind::Function(decl) => Some(&decl.name),
            DeclKind::Struct(decl) => Some(&decl.name),
            DeclKind::Enum(decl) => Some(&decl.name),
            DeclKind::Trait(decl) => Some(&decl.name),
            DeclKind::TypeAlias(decl) => Some(&decl.name),
            DeclKind::Newtype(decl) => Some(&decl.name),
            DeclKind::Variable(decl) => decl.name.as_deref(),
            DeclKind::Impl(_) | DeclKind::Import(_) | DeclKind::Export(_) | DeclKind::Unknown(_) => {
                None
            }
        }
    }
}

/// Declaration forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeclKind {
    /// `fn name(params) -> ret { body }`
    Function(FunctionDecl),
    /// `struct Name { fields }`
    Struct(StructDecl),
    /// `enum Name { variants }`
    Enum(EnumDecl),
    /// `trait Name { methods; types }`
    Trait(TraitDecl),
    /// `impl [Trait for] Type { methods }`
    Impl(ImplDecl),
    /// `import a.b.c [as d]`
    Import(ImportDecl),
    /// `export a, b`
    Export(ExportDecl),
    /// `type Name = Target`
    TypeAlias(TypeAliasDecl),
    /// `newtype Name = Base`
    Newtype(NewtypeDecl),
    /// Module-level variable
    Variable(VariableDecl),
    /// Construct the parser could not classify
    Unknown(String),
}

/// Generic parameter with optional trait bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericParam {
    /// Parameter name
    pub name: Name,
    /// Trait bounds (`T: A + B`)
    pub bounds: Vec<TypeExpr>,
    /// Source location
    pub span: FileSpan,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name
    pub name: Name,
    /// Declared type; `None` when unannotated
    pub ty: Option<TypeExpr>,
    /// Source location
    pub span: FileSpan,
}

/// Function declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    /// Function name
    pub name: Name,
    /// Generic parameters
    pub generics: Vec<GenericParam>,
    /// Parameters in order
    pub params: Vec<Param>,
    /// Return type; `None` means unit
    pub return_type: Option<TypeExpr>,
    /// Function body
    pub body: Block,
}

/// Struct field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Field name
    pub name: Name,
    /// Field type
    pub ty: TypeExpr,
    /// Source location
    pub span: FileSpan,
}

/// Struct declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructDecl {
    /// Struct name
    pub name: Name,
    /// Generic parameters
    pub generics: Vec<GenericParam>,
    /// Fields in declaration order
    pub fields: Vec<FieldDecl>,
}

/// Enum variant with positional payload types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantDecl {
    /// Variant name
    pub name: Name,
    /// Payload types
    pub fields: Vec<TypeExpr>,
    /// Source location
    pub span: FileSpan,
}

/// Enum declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDecl {
    /// Enum name
    pub name: Name,
    /// Generic parameters
    pub generics: Vec<GenericParam>,
    /// Variants in declaration order
    pub variants: Vec<VariantDecl>,
}

/// Method signature inside a trait
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSig {
    /// Method name
    pub name: Name,
    /// Generic parameters
    pub generics: Vec<GenericParam>,
    /// Parameters
    pub params: Vec<Param>,
    /// Return type; `None` means unit
    pub return_type: Option<TypeExpr>,
    /// Source location
    pub span: FileSpan,
}

/// Associated type declared by a trait
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociatedTypeDecl {
    /// Associated type name
    pub name: Name,
    /// Required bounds
    pub bounds: Vec<TypeExpr>,
    /// Source location
    pub span: FileSpan,
}

/// Trait declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitDecl {
    /// Trait name
    pub name: Name,
    /// Generic parameters
    pub generics: Vec<GenericParam>,
    /// Required methods
    pub methods: Vec<MethodSig>,
    /// Associated types
    pub associated_types: Vec<AssociatedTypeDecl>,
}

/// `where Ty: Bound + Bound`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WherePredicate {
    /// Constrained type
    pub ty: TypeExpr,
    /// Bounds on `ty`
    pub bounds: Vec<TypeExpr>,
    /// Source location
    pub span: FileSpan,
}

/// Impl block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplDecl {
    /// Generic parameters
    pub generics: Vec<GenericParam>,
    /// Implementing type
    pub self_ty: TypeExpr,
    /// Implemented trait, if any
    pub trait_ref: Option<TypeExpr>,
    /// Where-clause predicates
    pub where_clauses: Vec<WherePredicate>,
    /// Method declarations; each is expected to be a function
    pub methods: Vec<Decl>,
}

/// Import declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDecl {
    /// Path segments
    pub path: Vec<Name>,
    /// Optional local alias
    pub alias: Option<Name>,
}

/// Export declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDecl {
    /// Exported names
    pub names: Vec<Name>,
}

/// Type alias declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeAliasDecl {
    /// Alias name
    pub name: Name,
    /// Generic parameters
    pub generics: Vec<GenericParam>,
    /// Aliased type
    pub target: TypeExpr,
}

/// Newtype declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewtypeDecl {
    /// Newtype name
    pub name: Name,
    /// Generic parameters
    pub generics: Vec<GenericParam>,
    /// Wrapped type
    pub base: TypeExpr,
}

/// Module-level variable declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDecl {
    /// Variable name; `None` when the parser recovered from a malformed binding
    pub name: Option<Name>,
    /// Whether the binding is mutable
    pub mutable: bool,
    /// Declared type
    pub ty: Option<TypeExpr>,
    /// Initializer
    pub init: Option<Expr>,
}

/// Type expression as written in source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeExpr {
    /// Type form
    pub kind: TypeExprKind,
    /// Source location
    pub span: FileSpan,
}

/// Type expression forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeExprKind {
    /// `Name` or `Name<Args>`
    Named {
        /// Type name
        name: Name,
        /// Generic arguments
        args: Vec<TypeExpr>,
    },
    /// `(A, B)`
    Tuple(Vec<TypeExpr>),
    /// `&T` / `&mut T`
    Reference {
        /// Mutable reference
        mutable: bool,
        /// Referenced type
        inner: Box<TypeExpr>,
    },
    /// `fn(A) -> B`
    Function {
        /// Parameter types
        params: Vec<TypeExpr>,
        /// Return type
        ret: Box<TypeExpr>,
    },
    /// `()`
    Unit,
    /// Unclassified type syntax
    Unknown(String),
}

/// Braced statement list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Statements in order
    pub stmts: Vec<Stmt>,
    /// Source location
    pub span: FileSpan,
}

impl Block {
    /// Creates a block
    #[must_use]
    pub fn new(stmts: Vec<Stmt>, span: FileSpan) -> Self {
        Self { stmts, span }
    }
}

/// A statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    /// Statement form
    pub kind: StmtKind,
    /// Source location
    pub span: FileSpan,
}

/// Statement forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    /// `let [mut] name[: ty] [= init]`
    Let {
        /// Bound name
        name: Name,
        /// Mutable binding
        mutable: bool,
        /// Declared type
        ty: Option<TypeExpr>,
        /// Initializer
        init: Option<Expr>,
    },
    /// Expression statement
    Expr(Expr),
    /// `return [value]`
    Return(Option<Expr>),
    /// `break`
    Break,
    /// `continue`
    Continue,
    /// Nested block
    Block(Block),
    /// `if cond { .. } [else { .. }]`
    If {
        /// Condition
        condition: Expr,
        /// Taken when the condition holds
        then_branch: Block,
        /// Taken otherwise
        else_branch: Option<Block>,
    },
    /// `while cond { .. }`
    While {
        /// Loop condition
        condition: Expr,
        /// Loop body
        body: Block,
    },
    /// `for binding in iterable { .. }`
    For {
        /// Loop variable
        binding: Name,
        /// Iterated expression
        iterable: Expr,
        /// Loop body
        body: Block,
    },
    /// Unclassified statement syntax
    Unknown(String),
}

/// An expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    /// Expression form
    pub kind: ExprKind,
    /// Source location
    pub span: FileSpan,
}

/// Expression forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    /// Literal value
    Literal(Literal),
    /// Name reference
    Identifier(Name),
    /// `lhs op rhs`
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        lhs: Box<Expr>,
        /// Right operand
        rhs: Box<Expr>,
    },
    /// `op operand`
    Unary {
        /// Operator
        op: UnaryOp,
        /// Operand
        operand: Box<Expr>,
    },
    /// `callee(args)`
    Call {
        /// Called expression
        callee: Box<Expr>,
        /// Arguments
        args: Vec<Expr>,
    },
    /// `base.field`
    Field {
        /// Accessed expression
        base: Box<Expr>,
        /// Field name
        field: Name,
    },
    /// `target = value`
    Assign {
        /// Assigned place
        target: Box<Expr>,
        /// Assigned value
        value: Box<Expr>,
    },
    /// `target op= value`
    CompoundAssign {
        /// Underlying arithmetic operator
        op: CompoundOp,
        /// Assigned place
        target: Box<Expr>,
        /// Right-hand operand
        value: Box<Expr>,
    },
    /// Unclassified expression syntax
    Unknown(String),
}

/// Literal with its source text
///
/// Integer text may carry radix prefixes, separators or leading zeros until
/// normalized. String and char text is stored without quotes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Literal {
    /// Literal kind
    pub kind: LiteralKind,
    /// Source text
    pub text: String,
}

impl Literal {
    /// Creates a literal
    #[must_use]
    pub fn new(kind: LiteralKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Integer value, if this is a well-formed integer literal
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self.kind {
            LiteralKind::Integer => crate::literal::parse_integer_text(&self.text),
            _ => None,
        }
    }

    /// Value of a boolean literal
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match (self.kind, self.text.as_str()) {
            (LiteralKind::Boolean, "true") => Some(true),
            (LiteralKind::Boolean, "false") => Some(false),
            _ => None,
        }
    }

    /// Contents of a string literal
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self.kind {
            LiteralKind::String => Some(&self.text),
            _ => None,
        }
    }
}

/// Literal kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum LiteralKind {
    /// Integer literal
    #[display("integer")]
    Integer,
    /// Floating-point literal
    #[display("float")]
    Float,
    /// String literal
    #[display("string")]
    String,
    /// Character literal
    #[display("char")]
    Char,
    /// `true` / `false`
    #[display("boolean")]
    Boolean,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
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
    /// Whether the operator produces a boolean
    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Ne | Self::Lt | Self::Gt | Self::Le | Self::Ge
        )
    }

    /// `&&` or `||`
    #[must_use]
    pub const fn is_logical(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum UnaryOp {
    /// `-`
    #[display("-")]
    Neg,
    /// `!`
    #[display("!")]
    Not,
}

/// Compound assignment operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum CompoundOp {
    /// `+=`
    #[display("+=")]
    Add,
    /// `-=`
    #[display("-=")]
    Sub,
    /// `*=`
    #[display("*=")]
    Mul,
    /// `/=`
    #[display("/=")]
    Div,
    /// `%=`
    #[display("%=")]
    Mod,
}

impl CompoundOp {
    /// The binary operator this compound form applies
    #[must_use]
    pub const fn binary_op(self) -> BinaryOp {
        match self {
            Self::Add => BinaryOp::Add,
            Self::Sub => BinaryOp::Sub,
            Self::Mul => BinaryOp::Mul,
            Self::Div => BinaryOp::Div,
            Self::Mod => BinaryOp::Mod,
        }
    }
}
