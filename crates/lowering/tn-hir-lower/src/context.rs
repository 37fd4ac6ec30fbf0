//! State shared across one lowering run

use rustc_hash::FxHashMap;
use tn_hir::{
    DefId, FieldDef, FunctionId, GenericParam, ImplId, LocalId, ScopeId, ScopeTree, SymbolId,
    SymbolInfo, SymbolKind, SymbolTable, Type, TypeDefId, VariableId,
};
use tn_intern::{Interner, Symbol};
use tn_span::FileSpan;

use crate::error::LoweringError;

/// Function signature resolved before bodies are lowered
#[derive(Debug, Clone)]
pub(crate) struct Signature {
    pub id: FunctionId,
    pub scope: ScopeId,
    pub generics: Vec<GenericParam>,
    pub params: Vec<Type>,
    pub return_type: Type,
}

/// Result of the collection phase for one top-level declaration
#[derive(Debug, Clone)]
pub(crate) enum Collected {
    Function(Signature),
    Type(TypeDefId),
    Variable { id: VariableId, symbol: SymbolId },
}

/// Context for lowering a program to a module
///
/// Scope and body are always passed explicitly to the lowering functions;
/// the context only owns what outlives a single declaration.
pub struct LoweringContext {
    /// String interner
    pub interner: Interner,
    /// Scope tree
    pub scopes: ScopeTree,
    /// Symbol table
    pub symbols: SymbolTable,
    /// Errors recorded so far
    pub errors: Vec<LoweringError>,
    /// Collection results keyed by top-level declaration index
    pub(crate) collected: FxHashMap<usize, Collected>,
    /// Struct fields by definition, for typing field accesses
    pub(crate) struct_fields: FxHashMap<TypeDefId, Vec<FieldDef>>,
    next_function_id: u32,
    next_variable_id: u32,
    next_type_id: u32,
    next_impl_id: u32,
    next_local_id: u32,
}

impl LoweringContext {
    /// Create a new lowering context
    #[must_use]
    pub fn new() -> Self {
        Self::with_interner(Interner::new())
    }

    /// Create a context that interns into an existing interner
    #[must_use]
    pub fn with_interner(interner: Interner) -> Self {
        Self {
            interner,
            scopes: ScopeTree::new(),
            symbols: SymbolTable::new(),
            errors: Vec::new(),
            collected: FxHashMap::default(),
            struct_fields: FxHashMap::default(),
            next_function_id: 0,
            next_variable_id: 0,
            next_type_id: 0,
            next_impl_id: 0,
            next_local_id: 0,
        }
    }

    /// Intern a string
    pub fn intern(&self, text: &str) -> Symbol {
        self.interner.intern(text)
    }

    /// Record a lowering error
    pub fn report(&mut self, error: LoweringError) {
        tracing::debug!(%error, "lowering error");
        self.errors.push(error);
    }

    pub(crate) fn alloc_function_id(&mut self) -> FunctionId {
        let id = FunctionId(self.next_function_id);
        self.next_function_id += 1;
        id
    }

    pub(crate) fn alloc_variable_id(&mut self) -> VariableId {
        let id = VariableId(self.next_variable_id);
        self.next_variable_id += 1;
        id
    }

    pub(crate) fn alloc_type_id(&mut self) -> TypeDefId {
        let id = TypeDefId(self.next_type_id);
        self.next_type_id += 1;
        id
    }

    pub(crate) fn alloc_impl_id(&mut self) -> ImplId {
        let id = ImplId(self.next_impl_id);
        self.next_impl_id += 1;
        id
    }

    pub(crate) fn alloc_local_id(&mut self) -> LocalId {
        let id = LocalId(self.next_local_id);
        self.next_local_id += 1;
        id
    }

    /// Adds a symbol and binds it in the namespace its kind belongs to.
    ///
    /// Rebinding a name in the same scope silently replaces the old binding.
    pub(crate) fn declare(
        &mut self,
        scope: ScopeId,
        name: Symbol,
        kind: SymbolKind,
        def: Option<DefId>,
        ty: Type,
        span: FileSpan,
    ) -> SymbolId {
        let symbol = self.symbols.add(SymbolInfo {
            name,
            kind,
            def,
            ty,
            span,
            scope,
        });
        if kind.is_type() {
            self.scopes.define_type(scope, name, symbol);
        } else {
            self.scopes.define_value(scope, name, symbol);
        }
        symbol
    }
}

impl Default for LoweringContext {
    fn default() -> Self {
        Self::new()
    }
}
