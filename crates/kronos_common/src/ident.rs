//! Interned names for cells, pins, instances, and nets.
//!
//! An analysis run touches the same handful of strings enormously often: a
//! netlist references one cell name per instance, the enumerator compares
//! node names while sorting, and every fanout entry carries a pin name.
//! Interning turns all of those into `u32` comparisons and lets path
//! sequences be hashed without touching string data.

use lasso::ThreadedRodeo;
use serde::{Deserialize, Serialize};

/// An interned name.
///
/// `Ident` is a key into the run's [`Interner`]; two idents compare equal
/// iff they were interned from the same string. The ordering is the
/// interning order, not lexicographic, so sorting for reports goes through
/// [`Interner::resolve`] first.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct Ident(u32);

impl Ident {
    /// Reconstructs an ident from its raw key, for deserialized data that
    /// was produced against the same interner.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// The raw key value.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: the key space is exactly the u32 range. `into_usize` cannot
// truncate on the supported 32/64-bit targets, and `try_from_usize`
// refuses anything a u32 cannot hold, so keys round-trip losslessly.
unsafe impl lasso::Key for Ident {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        if int <= u32::MAX as usize {
            Some(Ident(int as u32))
        } else {
            None
        }
    }
}

/// The per-run name table, shared by reference across every stage.
///
/// Backed by [`lasso::ThreadedRodeo`], so the parsing front-ends can
/// populate it single-threaded and the parallel delay workers can resolve
/// (and, for fallback pin names, intern) concurrently without locking on
/// the caller's side.
pub struct Interner {
    rodeo: ThreadedRodeo<Ident>,
}

impl Interner {
    /// Creates an empty name table.
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Interns `s`, reusing the existing ident when the name was seen
    /// before (the common case: every instance of a cell repeats its cell
    /// and pin names).
    pub fn get_or_intern(&self, s: &str) -> Ident {
        self.rodeo.get_or_intern(s)
    }

    /// Looks up a name without interning it.
    ///
    /// Useful for probing: a query for a name nothing in the design ever
    /// mentioned should not grow the table.
    pub fn get(&self, s: &str) -> Option<Ident> {
        self.rodeo.get(s)
    }

    /// Returns the string for an ident produced by this interner.
    ///
    /// Panics when handed an ident from a different run; idents are not
    /// portable across interners.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.rodeo.resolve(&ident)
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}
