// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element identity types.

use core::fmt;

/// Sentinel value indicating "no element" in index fields and lookups.
pub const INVALID: u32 = u32::MAX;

/// A handle to an element in a [`Hierarchy`](super::Hierarchy).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after an element is destroyed and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId {
    /// Slot index into the hierarchy's arrays.
    pub(crate) idx: u32,
    /// Generation counter, must match the hierarchy's generation for this slot.
    pub(crate) generation: u32,
}

impl ElementId {
    /// Returns the raw slot index.
    ///
    /// This is the value units cache and pass to the `*_at` accessors.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementId({}@gen{})", self.idx, self.generation)
    }
}

/// What kind of element occupies a slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// A skeletal bone. Carries only transforms.
    #[default]
    Bone,
    /// An animator-facing control carrying a typed value.
    Control,
}
