//! Identifiers into the module registry arena.

use std::fmt;

/// A non-owning handle to a [`Module`] held by the registry arena.
///
/// Units and imports refer back to modules through this id rather than
/// through references, so the registry stays free of ownership cycles.
/// Repeated registry lookups of the same dotted path return the same id.
///
/// [`Module`]: https://docs.rs/sable-registry
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(u32);

impl ModuleId {
    /// Create an id from an arena index.
    #[inline]
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// The arena index this id points at.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleId({})", self.0)
    }
}
