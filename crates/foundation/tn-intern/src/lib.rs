//! String interning for identifiers

pub use lasso::Spur as Symbol;
use lasso::ThreadedRodeo;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Thread-safe string interner
///
/// Cloning is cheap and every clone shares the same table, so the lowering
/// engine can hand its interner to the module it produces.
#[derive(Clone)]
pub struct Interner {
    inner: Arc<Mutex<ThreadedRodeo>>,
}

impl Interner {
    /// Creates an empty interner
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ThreadedRodeo::new())),
        }
    }

    fn rodeo(&self) -> MutexGuard<'_, ThreadedRodeo> {
        // The rodeo stays consistent even if a holder panicked.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Interns `text`, returning the existing symbol if already present
    pub fn intern(&self, text: &str) -> Symbol {
        self.rodeo().get_or_intern(text)
    }

    /// Looks up a string without interning it
    #[must_use]
    pub fn get(&self, text: &str) -> Option<Symbol> {
        self.rodeo().get(text)
    }

    /// Resolves a symbol; unknown symbols resolve to an empty string
    #[must_use]
    pub fn resolve(&self, sym: &Symbol) -> String {
        self.try_resolve(sym).unwrap_or_default()
    }

    /// Text of a symbol, if it came from this interner
    #[must_use]
    pub fn try_resolve(&self, sym: &Symbol) -> Option<String> {
        self.rodeo().try_resolve(sym).map(ToString::to_string)
    }

    /// Number of distinct strings interned so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.rodeo().len()
    }

    /// Whether nothing has been interned
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Interner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interner").field("len", &self.len()).finish()
    }
}
