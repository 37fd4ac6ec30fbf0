//! High-level intermediate representation
//!
//! A [`Module`] is what lowering produces and what validation reads. Every
//! declaration lowers to exactly one of its lists. Function and initializer
//! bodies use arena storage (see [`body`]); names are interned symbols
//! resolved against the module's [`ScopeTree`].

pub mod body;
pub mod node;
pub mod scope;
pub mod symbol;
pub mod ty;

pub use body::{
    BinaryOp, Body, Expr, ExprId, LiteralValue, Pattern, PatternId, Stmt, StmtId, UnaryOp,
};
pub use node::{HirChild, HirChildError, HirNode, HirNodeKind};
pub use scope::{ScopeData, ScopeId, ScopeKind, ScopeTree};
pub use symbol::{SymbolId, SymbolInfo, SymbolKind, SymbolTable};
pub use ty::{PrimitiveType, Type};

use serde::{Deserialize, Serialize};
use tn_intern::{Interner, Symbol};
use tn_span::FileSpan;

/// Unique identifier for a function or method
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct FunctionId(pub u32);

/// Unique identifier for a module-level variable
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct VariableId(pub u32);

/// Unique identifier for a type definition
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TypeDefId(pub u32);

/// Unique identifier for an impl block
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ImplId(pub u32);

/// Unique identifier for a local binding or parameter
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct LocalId(pub u32);

/// What a resolved name refers to
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum DefId {
    /// Function
    Function(FunctionId),
    /// Module-level variable
    Global(VariableId),
    /// Local binding or parameter
    Local(LocalId),
    /// Type definition
    Type(TypeDefId),
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

/// Lowered generic parameter
#[derive(Debug, Clone, PartialEq)]
pub struct GenericParam {
    /// Parameter name
    pub name: Symbol,
    /// Trait bounds
    pub bounds: Vec<Type>,
    /// Source location
    pub span: FileSpan,
}

/// Lowered function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Parameter name
    pub name: Symbol,
    /// Local the parameter binds
    pub local: LocalId,
    /// Parameter type; `Type::Inferred` when unannotated
    pub ty: Type,
    /// Source location
    pub span: FileSpan,
}

/// Impl a method belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct MethodOwner {
    /// Owning impl block
    pub impl_id: ImplId,
    /// Implementing type
    pub self_ty: Type,
    /// Implemented trait, for trait impls
    pub trait_ref: Option<Type>,
}

/// Lowered function or method
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// Function ID
    pub id: FunctionId,
    /// Function name
    pub name: Symbol,
    /// Visibility
    pub visibility: Visibility,
    /// Generic parameters
    pub generics: Vec<GenericParam>,
    /// Parameters
    pub params: Vec<Param>,
    /// Return type
    pub return_type: Type,
    /// Body; its root is the function's block
    pub body: Body,
    /// Set for methods lowered from an impl block
    pub owner: Option<MethodOwner>,
    /// Scope holding generics and parameters
    pub scope: ScopeId,
    /// Source location
    pub span: FileSpan,
}

impl Function {
    /// Whether the function belongs to an impl
    #[must_use]
    pub fn is_method(&self) -> bool {
        self.owner.is_some()
    }
}

/// Lowered module-level variable
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Variable ID
    pub id: VariableId,
    /// Variable name
    pub name: Symbol,
    /// Visibility
    pub visibility: Visibility,
    /// Mutable binding
    pub mutable: bool,
    /// Declared or initializer type
    pub ty: Type,
    /// Initializer body; its root is the initializer expression
    pub initializer: Option<Body>,
    /// Source location
    pub span: FileSpan,
}

/// Struct field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    /// Field name
    pub name: Symbol,
    /// Field type
    pub ty: Type,
    /// Source location
    pub span: FileSpan,
}

/// Enum variant
#[derive(Debug, Clone, PartialEq)]
pub struct VariantDef {
    /// Variant name
    pub name: Symbol,
    /// Positional payload types
    pub fields: Vec<Type>,
    /// Source location
    pub span: FileSpan,
}

/// Method signature required by a trait
#[derive(Debug, Clone, PartialEq)]
pub struct TraitMethod {
    /// Method name
    pub name: Symbol,
    /// Generic parameters
    pub generics: Vec<GenericParam>,
    /// Parameter names and types
    pub params: Vec<(Symbol, Type)>,
    /// Return type
    pub return_type: Type,
    /// Source location
    pub span: FileSpan,
}

/// Associated type declared by a trait
#[derive(Debug, Clone, PartialEq)]
pub struct AssociatedType {
    /// Name
    pub name: Symbol,
    /// Bounds
    pub bounds: Vec<Type>,
    /// Source location
    pub span: FileSpan,
}

/// Kind-specific payload of a type definition
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefKind {
    /// Struct with named fields
    Struct {
        /// Fields in declaration order
        fields: Vec<FieldDef>,
    },
    /// Enum with variants
    Enum {
        /// Variants in declaration order
        variants: Vec<VariantDef>,
    },
    /// Trait
    Trait {
        /// Required methods
        methods: Vec<TraitMethod>,
        /// Associated types
        associated_types: Vec<AssociatedType>,
    },
    /// Type alias
    Alias {
        /// Aliased type
        target: Type,
    },
    /// Newtype
    Newtype {
        /// Wrapped type
        base: Type,
    },
}

/// Lowered type definition
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    /// Type ID
    pub id: TypeDefId,
    /// Type name
    pub name: Symbol,
    /// Visibility
    pub visibility: Visibility,
    /// Generic parameters
    pub generics: Vec<GenericParam>,
    /// Definition payload
    pub kind: TypeDefKind,
    /// Source location
    pub span: FileSpan,
}

impl TypeDef {
    /// Whether this is a trait definition
    #[must_use]
    pub const fn is_trait(&self) -> bool {
        matches!(self.kind, TypeDefKind::Trait { .. })
    }

    /// Short description of the definition kind
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self.kind {
            TypeDefKind::Struct { .. } => "struct",
            TypeDefKind::Enum { .. } => "enum",
            TypeDefKind::Trait { .. } => "trait",
            TypeDefKind::Alias { .. } => "type alias",
            TypeDefKind::Newtype { .. } => "newtype",
        }
    }
}

/// Inherent or trait impl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImplKind {
    /// `impl Type`
    Inherent,
    /// `impl Trait for Type`
    Trait,
}

/// Where-clause constraint; only the first bound of a predicate is kept
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    /// Constrained type
    pub ty: Type,
    /// Required bound
    pub bound: Type,
    /// Source location
    pub span: FileSpan,
}

/// Lowered impl block
#[derive(Debug, Clone, PartialEq)]
pub struct Impl {
    /// Impl ID
    pub id: ImplId,
    /// Inherent or trait impl
    pub kind: ImplKind,
    /// Implementing type
    pub self_ty: Type,
    /// Implemented trait
    pub trait_ref: Option<Type>,
    /// Generic parameters
    pub generics: Vec<GenericParam>,
    /// Where-clause constraints
    pub where_clauses: Vec<WhereClause>,
    /// Methods; these are not part of [`Module::functions`]
    pub methods: Vec<Function>,
    /// Source location
    pub span: FileSpan,
}

/// Import recorded on the module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Path segments
    pub path: Vec<Symbol>,
    /// Local alias
    pub alias: Option<Symbol>,
    /// Source location
    pub span: FileSpan,
}

/// Export recorded on the module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    /// Exported names
    pub names: Vec<Symbol>,
    /// Source location
    pub span: FileSpan,
}

/// A lowered compilation unit
#[derive(Debug, Clone)]
pub struct Module {
    /// Free functions
    pub functions: Vec<Function>,
    /// Module-level variables
    pub variables: Vec<Variable>,
    /// Type definitions
    pub types: Vec<TypeDef>,
    /// Impl blocks
    pub impls: Vec<Impl>,
    /// Imports
    pub imports: Vec<Import>,
    /// Exports
    pub exports: Vec<Export>,
    /// Scope tree built during lowering
    pub scopes: ScopeTree,
    /// Symbols the scope tree refers to
    pub symbols: SymbolTable,
    /// Interner for every name in the module
    pub interner: Interner,
    /// Source location
    pub span: FileSpan,
}

impl Module {
    /// Creates an empty module using `interner` for its names
    #[must_use]
    pub fn new(interner: Interner, span: FileSpan) -> Self {
        Self {
            functions: Vec::new(),
            variables: Vec::new(),
            types: Vec::new(),
            impls: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
            scopes: ScopeTree::new(),
            symbols: SymbolTable::new(),
            interner,
            span,
        }
    }

    /// Resolves an interned name
    #[must_use]
    pub fn name(&self, symbol: &Symbol) -> String {
        self.interner.resolve(symbol)
    }

    /// First free function with the given name
    #[must_use]
    pub fn function_named(&self, name: &str) -> Option<&Function> {
        self.functions
            .iter()
            .find(|function| self.interner.resolve(&function.name) == name)
    }

    /// First type definition with the given name
    #[must_use]
    pub fn type_named(&self, name: &str) -> Option<&TypeDef> {
        self.types
            .iter()
            .find(|def| self.interner.resolve(&def.name) == name)
    }

    /// Definition with the given id
    #[must_use]
    pub fn type_def(&self, id: TypeDefId) -> Option<&TypeDef> {
        self.types.iter().find(|def| def.id == id)
    }

    /// Free functions followed by every impl method
    pub fn all_functions(&self) -> impl Iterator<Item = &Function> {
        self.functions
            .iter()
            .chain(self.impls.iter().flat_map(|imp| imp.methods.iter()))
    }
}
