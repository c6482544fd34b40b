//! Stable item identifiers.
//!
//! Focus, capture and the tab list refer to items by [`ItemId`] rather than
//! by reference, so a destroyed item simply stops resolving.

use std::fmt;

/// Process-unique identifier of an item. Zero is reserved as "no item".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ItemId(pub u64);

impl ItemId {
    pub const INVALID: Self = Self(0);

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonically increasing id generator owned by a `Context`.
#[derive(Debug, Clone)]
pub struct IdSeed {
    next: u64,
}

impl IdSeed {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn generate(&mut self) -> ItemId {
        let id = ItemId(self.next);
        self.next += 1;
        id
    }
}

impl Default for IdSeed {
    fn default() -> Self {
        Self::new()
    }
}
