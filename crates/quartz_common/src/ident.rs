//! Interned identifiers.
//!
//! Every name in a Quartz design (generators, ports, variables, parameters,
//! enum members, interface definitions) is interned once and referred to by
//! a copyable [`Ident`]. Equality and hashing are O(1) integer operations,
//! and the backing strings are deduplicated for the lifetime of the design.

use lasso::ThreadedRodeo;
use serde::{Deserialize, Serialize};

/// An interned name.
///
/// An `Ident` is an index into the [`Interner`] that produced it; resolving
/// it through a different interner is a logic error and may panic.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Ident(u32);

impl Ident {
    /// Builds an `Ident` from a raw index. Intended for deserialization and
    /// tests; normal code obtains idents from [`Interner::intern`].
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index of this ident.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: the wrapped u32 always fits in usize on supported platforms, and
// try_from_usize rejects indices that do not fit back into u32.
unsafe impl lasso::Key for Ident {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Ident)
    }
}

/// String interner backing all [`Ident`]s of one design.
///
/// Interning takes `&self`, so builder code that already holds a shared
/// reference can mint names without extra plumbing.
#[derive(Serialize, Deserialize)]
pub struct Interner {
    rodeo: ThreadedRodeo<Ident>,
}

impl Interner {
    /// Creates an empty interner.
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Interns `s`, returning its [`Ident`]. Re-interning an existing string
    /// returns the previous ident without allocating.
    pub fn intern(&self, s: &str) -> Ident {
        self.rodeo.get_or_intern(s)
    }

    /// Looks up a string without interning it.
    pub fn get(&self, s: &str) -> Option<Ident> {
        self.rodeo.get(s)
    }

    /// Resolves an [`Ident`] back to its string.
    ///
    /// # Panics
    ///
    /// Panics if `ident` was not produced by this interner.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.rodeo.resolve(&ident)
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Interner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interner")
            .field("len", &self.rodeo.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_and_resolve() {
        let interner = Interner::new();
        let clk = interner.intern("clk");
        assert_eq!(interner.resolve(clk), "clk");
    }

    #[test]
    fn interning_deduplicates() {
        let interner = Interner::new();
        let a = interner.intern("data");
        let b = interner.intern("data");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_names_distinct_idents() {
        let interner = Interner::new();
        assert_ne!(interner.intern("rst_n"), interner.intern("rst"));
    }

    #[test]
    fn get_does_not_intern() {
        let interner = Interner::new();
        assert!(interner.get("missing").is_none());
        let id = interner.intern("present");
        assert_eq!(interner.get("present"), Some(id));
    }

    #[test]
    fn ident_raw_roundtrip() {
        let id = Ident::from_raw(17);
        assert_eq!(id.as_raw(), 17);
    }

    #[test]
    fn ident_serde_roundtrip() {
        let id = Ident::from_raw(3);
        let json = serde_json::to_string(&id).unwrap();
        let back: Ident = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn interner_serde_roundtrip() {
        let interner = Interner::new();
        let count = interner.intern("count");
        let json = serde_json::to_string(&interner).unwrap();
        let back: Interner = serde_json::from_str(&json).unwrap();
        assert_eq!(back.resolve(count), "count");
    }
}
