//! Scope tree shared by name resolution and the lowered module
//!
//! A single tree serves both purposes: lowering resolves names through it
//! and the finished [`Module`](crate::Module) keeps it. Each scope has a
//! value namespace and a type namespace.

use rustc_hash::FxHashMap;
use la_arena::{Arena, Idx};
use tn_intern::Symbol;
use tn_span::FileSpan;

use crate::symbol::SymbolId;

/// Unique identifier for a scope
pub type ScopeId = Idx<ScopeData>;

/// What introduced a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Module root
    Module,
    /// Function parameters and generics
    Function,
    /// Braced block
    Block,
    /// `for` loop binding
    Loop,
    /// Type definition generics
    TypeDef,
    /// Trait generics, `Self` and associated types
    Trait,
    /// Impl generics and `Self`
    Impl,
}

/// A lexical scope
#[derive(Debug, Clone)]
pub struct ScopeData {
    /// Parent scope (None for the module root)
    pub parent: Option<ScopeId>,
    /// Child scopes, in creation order
    pub children: Vec<ScopeId>,
    /// Scope kind
    pub kind: ScopeKind,
    /// Variables, parameters and functions
    pub values: FxHashMap<Symbol, SymbolId>,
    /// Types, generics and associated types
    pub types: FxHashMap<Symbol, SymbolId>,
    /// Source span of this scope
    pub span: FileSpan,
}

impl ScopeData {
    fn new(parent: Option<ScopeId>, kind: ScopeKind, span: FileSpan) -> Self {
        Self {
            parent,
            children: Vec::new(),
            kind,
            values: FxHashMap::default(),
            types: FxHashMap::default(),
            span,
        }
    }
}

/// Tree of all scopes in a module
#[derive(Debug, Clone, Default)]
pub struct ScopeTree {
    scopes: Arena<ScopeData>,
    /// Root scope for the module
    root: Option<ScopeId>,
}

impl ScopeTree {
    /// Create a new empty scope tree
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the root module scope
    pub fn create_root(&mut self, span: FileSpan) -> ScopeId {
        let id = self
            .scopes
            .alloc(ScopeData::new(None, ScopeKind::Module, span));
        self.root = Some(id);
        id
    }

    /// Create a new child scope
    pub fn create_child(&mut self, parent: ScopeId, kind: ScopeKind, span: FileSpan) -> ScopeId {
        let id = self
            .scopes
            .alloc(ScopeData::new(Some(parent), kind, span));
        self.scopes[parent].children.push(id);
        id
    }

    /// Data of one scope
    #[must_use]
    pub fn get(&self, id: ScopeId) -> &ScopeData {
        &self.scopes[id]
    }

    /// Get the root scope
    #[must_use]
    pub fn root(&self) -> Option<ScopeId> {
        self.root
    }

    /// Number of scopes
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Whether no scope exists
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.len() == 0
    }

    /// `scope` followed by each of its ancestors up to the root
    pub fn ancestors(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(scope), |id| self.scopes[*id].parent)
    }

    /// Resolve a value name, walking up parent scopes
    #[must_use]
    pub fn resolve_value(&self, scope: ScopeId, name: Symbol) -> Option<SymbolId> {
        self.ancestors(scope)
            .find_map(|id| self.scopes[id].values.get(&name).copied())
    }

    /// Resolve a type name, walking up parent scopes
    #[must_use]
    pub fn resolve_type(&self, scope: ScopeId, name: Symbol) -> Option<SymbolId> {
        self.ancestors(scope)
            .find_map(|id| self.scopes[id].types.get(&name).copied())
    }

    /// Binds a value name, returning the binding it replaced in this scope
    pub fn define_value(&mut self, scope: ScopeId, name: Symbol, symbol: SymbolId) -> Option<SymbolId> {
        self.scopes[scope].values.insert(name, symbol)
    }

    /// Binds a type name, returning the binding it replaced in this scope
    pub fn define_type(&mut self, scope: ScopeId, name: Symbol, symbol: SymbolId) -> Option<SymbolId> {
        self.scopes[scope].types.insert(name, symbol)
    }
}
