// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-unit memoization of name lookups.

use alloc::vec::Vec;

use crate::hierarchy::{Hierarchy, INVALID};

/// A memoized name-to-slot lookup owned by a unit instance.
///
/// The cached slot is trusted only while all of the following hold:
///
/// - it is not [`INVALID`],
/// - the hierarchy's [`topology_version`](Hierarchy::topology_version) is
///   the one it was resolved against,
/// - the element at that slot still carries the requested name.
///
/// Otherwise [`resolve`](Self::resolve) looks the name up again. A cell is
/// tied to the unit that owns it and must not be shared between contexts that
/// evaluate concurrently; key one cell per (unit, context) pair instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CachedIndex {
    index: u32,
    version: u64,
}

impl Default for CachedIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl CachedIndex {
    /// Creates an unresolved cell.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            index: INVALID,
            version: 0,
        }
    }

    /// Returns the slot for `name`, re-resolving if the cached one is stale.
    ///
    /// Returns [`INVALID`] if `name` is not in the hierarchy.
    pub fn resolve(&mut self, name: &str, hierarchy: &Hierarchy) -> u32 {
        let version = hierarchy.topology_version();
        let stale = self.index == INVALID
            || self.version != version
            || hierarchy.name_at(self.index) != Some(name);
        if stale {
            self.index = hierarchy.index_of(name);
            self.version = version;
        }
        self.index
    }

    /// Returns the last resolved slot without validating it.
    #[inline]
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.index
    }

    /// Returns whether the last resolution found an element.
    #[inline]
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.index != INVALID
    }

    /// Forgets the cached slot.
    pub fn invalidate(&mut self) {
        *self = Self::new();
    }
}

/// A list of [`CachedIndex`] cells for units with several targets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CachedIndices {
    cells: Vec<CachedIndex>,
}

impl CachedIndices {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self { cells: Vec::new() }
    }

    /// Resolves the `i`th target, growing the list as needed.
    pub fn resolve(&mut self, i: usize, name: &str, hierarchy: &Hierarchy) -> u32 {
        if i >= self.cells.len() {
            self.cells.resize(i + 1, CachedIndex::new());
        }
        self.cells[i].resolve(name, hierarchy)
    }

    /// Drops cells beyond the first `len`.
    pub fn truncate(&mut self, len: usize) {
        self.cells.truncate(len);
    }

    /// Returns the number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns whether there are no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the `i`th cell, if present.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<&CachedIndex> {
        self.cells.get(i)
    }

    /// Forgets every cached slot.
    pub fn invalidate(&mut self) {
        self.cells.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_and_memoizes() {
        let mut h = Hierarchy::new();
        let _root = h.create_bone("root").unwrap();
        let hand = h.create_bone("hand").unwrap();

        let mut cache = CachedIndex::new();
        assert!(!cache.is_resolved());
        assert_eq!(cache.resolve("hand", &h), hand.index());
        assert!(cache.is_resolved());
        assert_eq!(cache.get(), hand.index());
        assert_eq!(cache.resolve("hand", &h), hand.index());
    }

    #[test]
    fn missing_name_yields_invalid() {
        let h = Hierarchy::new();
        let mut cache = CachedIndex::new();
        assert_eq!(cache.resolve("nope", &h), INVALID);
        assert!(!cache.is_resolved());
    }

    #[test]
    fn rename_invalidates() {
        let mut h = Hierarchy::new();
        let a = h.create_bone("a").unwrap();
        let mut cache = CachedIndex::new();
        assert_eq!(cache.resolve("a", &h), a.index());

        assert!(h.rename(a, "b"));
        assert_eq!(cache.resolve("a", &h), INVALID);
        assert_eq!(cache.resolve("b", &h), a.index());
    }

    #[test]
    fn target_name_change_reresolves_without_topology_change() {
        let mut h = Hierarchy::new();
        let a = h.create_bone("a").unwrap();
        let b = h.create_bone("b").unwrap();
        let mut cache = CachedIndex::new();
        assert_eq!(cache.resolve("a", &h), a.index());
        assert_eq!(cache.resolve("b", &h), b.index());
    }

    #[test]
    fn rebuild_invalidates() {
        let mut h = Hierarchy::new();
        let a = h.create_bone("a").unwrap();
        let mut cache = CachedIndex::new();
        assert_eq!(cache.resolve("a", &h), a.index());

        // Destroy and recreate under the same name; the slot may be reused but
        // the version has moved on.
        h.destroy_element(a);
        let _filler = h.create_bone("filler").unwrap();
        let a2 = h.create_bone("a").unwrap();
        assert_eq!(cache.resolve("a", &h), a2.index());
    }

    #[test]
    fn unresolved_cell_retries_after_creation() {
        let mut h = Hierarchy::new();
        let mut cache = CachedIndex::new();
        assert_eq!(cache.resolve("late", &h), INVALID);
        let late = h.create_bone("late").unwrap();
        assert_eq!(cache.resolve("late", &h), late.index());
    }

    #[test]
    fn indices_grow_on_demand() {
        let mut h = Hierarchy::new();
        let a = h.create_bone("a").unwrap();
        let b = h.create_bone("b").unwrap();
        let mut cells = CachedIndices::new();
        assert!(cells.is_empty());
        assert_eq!(cells.resolve(1, "b", &h), b.index());
        assert_eq!(cells.len(), 2);
        assert!(!cells.get(0).unwrap().is_resolved());
        assert_eq!(cells.resolve(0, "a", &h), a.index());
        cells.truncate(1);
        assert_eq!(cells.len(), 1);
        cells.invalidate();
        assert!(cells.is_empty());
    }
}
