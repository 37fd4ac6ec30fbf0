//! Symbol table for name resolution

use la_arena::{Arena, Idx};
use tn_intern::Symbol as InternedString;
use tn_span::FileSpan;

use crate::scope::ScopeId;
use crate::ty::Type;
use crate::DefId;

/// Unique identifier for a symbol
pub type SymbolId = Idx<SymbolInfo>;

/// A declared name
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolInfo {
    /// Symbol name
    pub name: InternedString,
    /// Symbol kind
    pub kind: SymbolKind,
    /// Definition the name refers to, if it has one
    pub def: Option<DefId>,
    /// Type of a value symbol, or the type a type symbol denotes
    pub ty: Type,
    /// Source span
    pub span: FileSpan,
    /// Scope where this symbol is defined
    pub scope: ScopeId,
}

/// Kind of symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// Free function
    Function,
    /// Module-level variable
    Global,
    /// Local variable (let binding)
    Local,
    /// Function parameter
    Parameter,
    /// Imported name
    Import,
    /// Struct definition
    Struct,
    /// Enum definition
    Enum,
    /// Trait definition
    Trait,
    /// Type alias
    TypeAlias,
    /// Newtype
    Newtype,
    /// Generic parameter
    GenericParam,
    /// Associated type of a trait
    AssociatedType,
    /// `Self` inside a trait or impl
    SelfType,
}

impl SymbolKind {
    /// Whether the symbol lives in the type namespace
    #[must_use]
    pub const fn is_type(self) -> bool {
        matches!(
            self,
            Self::Struct
                | Self::Enum
                | Self::Trait
                | Self::TypeAlias
                | Self::Newtype
                | Self::GenericParam
                | Self::AssociatedType
                | Self::SelfType
        )
    }
}

/// Arena of every symbol declared in a module
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Arena<SymbolInfo>,
}

impl SymbolTable {
    /// Create a new empty symbol table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a symbol to the table
    pub fn add(&mut self, symbol: SymbolInfo) -> SymbolId {
        self.symbols.alloc(symbol)
    }

    /// Symbol by id
    #[must_use]
    pub fn get(&self, id: SymbolId) -> &SymbolInfo {
        &self.symbols[id]
    }

    /// Mutable symbol by id
    pub fn get_mut(&mut self, id: SymbolId) -> &mut SymbolInfo {
        &mut self.symbols[id]
    }

    /// Number of symbols
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.len() == 0
    }

    /// Symbols in definition order
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &SymbolInfo)> {
        self.symbols.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::{ScopeKind, ScopeTree};
    use tn_intern::Interner;

    fn make_symbol(name: InternedString, kind: SymbolKind, scope: ScopeId) -> SymbolInfo {
        SymbolInfo {
            name,
            kind,
            def: None,
            ty: Type::Inferred,
            span: FileSpan::dummy(),
            scope,
        }
    }

    #[test]
    fn test_resolve_walks_parents() {
        let interner = Interner::new();
        let mut scopes = ScopeTree::new();
        let mut symbols = SymbolTable::new();
        let root = scopes.create_root(FileSpan::dummy());
        let inner = scopes.create_child(root, ScopeKind::Block, FileSpan::dummy());

        let x = interner.intern("x");
        let global = symbols.add(make_symbol(x, SymbolKind::Global, root));
        scopes.define_value(root, x, global);

        assert_eq!(scopes.resolve_value(inner, x), Some(global));
        assert_eq!(scopes.resolve_type(inner, x), None);
        assert_eq!(scopes.get(root).children, vec![inner]);
    }

    #[test]
    fn test_shadowing_in_child_scope() {
        let interner = Interner::new();
        let mut scopes = ScopeTree::new();
        let mut symbols = SymbolTable::new();
        let root = scopes.create_root(FileSpan::dummy());
        let inner = scopes.create_child(root, ScopeKind::Block, FileSpan::dummy());

        let x = interner.intern("x");
        let outer = symbols.add(make_symbol(x, SymbolKind::Global, root));
        let local = symbols.add(make_symbol(x, SymbolKind::Local, inner));
        scopes.define_value(root, x, outer);
        scopes.define_value(inner, x, local);

        assert_eq!(scopes.resolve_value(inner, x), Some(local));
        assert_eq!(scopes.resolve_value(root, x), Some(outer));
        assert_eq!(scopes.ancestors(inner).collect::<Vec<_>>(), vec![inner, root]);
    }

    #[test]
    fn test_redefinition_returns_previous() {
        let interner = Interner::new();
        let mut scopes = ScopeTree::new();
        let mut symbols = SymbolTable::new();
        let root = scopes.create_root(FileSpan::dummy());
        let name = interner.intern("f");
        let first = symbols.add(make_symbol(name, SymbolKind::Function, root));
        let second = symbols.add(make_symbol(name, SymbolKind::Function, root));

        assert_eq!(scopes.define_value(root, name, first), None);
        assert_eq!(scopes.define_value(root, name, second), Some(first));
        assert_eq!(scopes.resolve_value(root, name), Some(second));
        assert_eq!(symbols.len(), 2);
    }
}
