//! Interned atomic labels shared by graph edges, regex literals and grammar tokens.
use std::fmt;

use lasso::{Key, Rodeo};

/// An opaque, interned label.
///
/// Two equal strings always intern to the same `Symbol`, so equality/hashing/ordering
/// compare the interned key rather than text. `Copy` so it can be used as a boolean-matrix
/// family key and as automaton alphabet the way the rest of this crate's generics expect.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

unsafe impl Key for Symbol {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Symbol)
    }
}

/// Owns the string ↔ `Symbol` mapping for a query's vocabulary.
///
/// A table may be shared read-only across queries that reference the same vocabulary
/// (e.g. one graph queried with several regexes); nothing else in this crate is shared.
#[derive(Default)]
pub struct SymbolTable {
    rodeo: Rodeo<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            rodeo: Rodeo::new(),
        }
    }

    /// Intern `text`, returning the existing `Symbol` if it was already seen.
    pub fn intern(&mut self, text: &str) -> Symbol {
        self.rodeo.get_or_intern(text)
    }

    /// Resolve a previously interned `Symbol` back to its text.
    ///
    /// Panics if `symbol` was not produced by this table (programmer error, matches the
    /// rest of the crate's "internal invariant violation" failure mode).
    pub fn resolve(&self, symbol: Symbol) -> &str {
        self.rodeo.resolve(&symbol)
    }

    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl fmt::Debug for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolTable")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_stable() {
        let mut table = SymbolTable::new();
        let a = table.intern("foo");
        let b = table.intern("bar");
        let a2 = table.intern("foo");

        assert_eq!(a, a2);
        assert_ne!(a, b);
        assert_eq!(table.resolve(a), "foo");
        assert_eq!(table.resolve(b), "bar");
    }
}
