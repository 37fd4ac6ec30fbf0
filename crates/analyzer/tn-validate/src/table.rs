//! Module-wide names, rebuilt from a lowered module
//!
//! Built independently of whatever lowering used, so validation only trusts
//! the module it is given.

use rustc_hash::{FxHashMap, FxHashSet};
use tn_hir::{FunctionId, Module, TypeDefId, VariableId};
use tn_intern::Symbol;
use tn_span::FileSpan;

/// What a module-level name denotes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declared {
    /// Free function
    Function(FunctionId),
    /// Module-level variable
    Global(VariableId),
    /// Type definition
    Type(TypeDefId),
}

/// First declaration of a name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    /// What the name denotes
    pub declared: Declared,
    /// Where it was declared
    pub span: FileSpan,
}

/// A second declaration of a name already in the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duplicate {
    /// The repeated name
    pub name: Symbol,
    /// Span of the later declaration
    pub span: FileSpan,
    /// Span of the first declaration
    pub previous: FileSpan,
}

/// Value and type namespaces of one module
#[derive(Debug, Default)]
pub struct ModuleTable {
    values: FxHashMap<Symbol, Entry>,
    types: FxHashMap<Symbol, Entry>,
    imports: FxHashSet<Symbol>,
}

impl ModuleTable {
    /// Inserts every function, global and type of `module`, collecting
    /// repeated names in declaration order
    #[must_use]
    pub fn build(module: &Module) -> (Self, Vec<Duplicate>) {
        let mut table = Self::default();
        let mut duplicates = Vec::new();

        for function in &module.functions {
            let entry = Entry {
                declared: Declared::Function(function.id),
                span: function.span,
            };
            duplicates.extend(table.insert_value(function.name, entry));
        }
        for variable in &module.variables {
            let entry = Entry {
                declared: Declared::Global(variable.id),
                span: variable.span,
            };
            duplicates.extend(table.insert_value(variable.name, entry));
        }
        for def in &module.types {
            let entry = Entry {
                declared: Declared::Type(def.id),
                span: def.span,
            };
            duplicates.extend(table.insert_type(def.name, entry));
        }
        for import in &module.imports {
            if let Some(local) = import.alias.or_else(|| import.path.last().copied()) {
                table.imports.insert(local);
            }
        }

        (table, duplicates)
    }

    /// Adds a value; the first declaration is kept on collision
    pub fn insert_value(&mut self, name: Symbol, entry: Entry) -> Option<Duplicate> {
        Self::insert(&mut self.values, name, entry)
    }

    /// Adds a type; the first declaration is kept on collision
    pub fn insert_type(&mut self, name: Symbol, entry: Entry) -> Option<Duplicate> {
        Self::insert(&mut self.types, name, entry)
    }

    fn insert(
        namespace: &mut FxHashMap<Symbol, Entry>,
        name: Symbol,
        entry: Entry,
    ) -> Option<Duplicate> {
        match namespace.get(&name) {
            Some(previous) => Some(Duplicate {
                name,
                span: entry.span,
                previous: previous.span,
            }),
            None => {
                namespace.insert(name, entry);
                None
            }
        }
    }

    /// First function or global declared under `name`
    #[must_use]
    pub fn value(&self, name: Symbol) -> Option<&Entry> {
        self.values.get(&name)
    }

    /// First type declared under `name`
    #[must_use]
    pub fn ty(&self, name: Symbol) -> Option<&Entry> {
        self.types.get(&name)
    }

    /// Whether `name` was brought in by an import
    #[must_use]
    pub fn is_imported(&self, name: Symbol) -> bool {
        self.imports.contains(&name)
    }
}
