//! resolver::mode
//!
//! Iteration modes and the scoped guard that changes them.
//!
//! # Design
//!
//! Modes are plain fields of each resolver, never process-wide state. A
//! [`ModeGuard`] borrows a resolver mutably, switches its mode, and puts the
//! previous mode back when dropped. Because restoration happens in `Drop`,
//! it also runs on `?` early returns and on panic unwinding.
//!
//! # Example
//!
//! ```
//! use pathbind::resolver::{IterMode, PathResolver};
//! use pathbind::store::MemoryStore;
//!
//! let store = MemoryStore::new();
//! let mut root = PathResolver::root(&store);
//! {
//!     let guard = root.use_batch();
//!     assert!(guard.mode().batch);
//! }
//! assert_eq!(root.mode(), IterMode::default());
//! ```

use std::ops::{Deref, DerefMut};

use super::PathResolver;

/// How `children()` behaves for one resolver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IterMode {
    /// Attach fetched records to yielded children.
    pub batch: bool,
    /// Yield only item bindings, skipping containers.
    pub only_items: bool,
}

impl IterMode {
    pub fn batch() -> Self {
        Self {
            batch: true,
            only_items: false,
        }
    }

    pub fn with_batch(self, batch: bool) -> Self {
        Self { batch, ..self }
    }

    pub fn with_only_items(self, only_items: bool) -> Self {
        Self { only_items, ..self }
    }
}

/// Restores a resolver's previous mode when dropped.
pub struct ModeGuard<'a, 's> {
    resolver: &'a mut PathResolver<'s>,
    previous: IterMode,
}

impl<'a, 's> ModeGuard<'a, 's> {
    pub(super) fn new(resolver: &'a mut PathResolver<'s>, mode: IterMode) -> Self {
        let previous = resolver.mode();
        resolver.set_mode(mode);
        Self { resolver, previous }
    }
}

impl<'s> Deref for ModeGuard<'_, 's> {
    type Target = PathResolver<'s>;

    fn deref(&self) -> &Self::Target {
        self.resolver
    }
}

impl DerefMut for ModeGuard<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.resolver
    }
}

impl Drop for ModeGuard<'_, '_> {
    fn drop(&mut self) {
        self.resolver.set_mode(self.previous);
    }
}
