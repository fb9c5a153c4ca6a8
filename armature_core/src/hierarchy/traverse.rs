// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Allocation-free walks over the sibling and parent links.
//!
//! Both iterators yield raw slot indices. The handle-based accessors on
//! [`Hierarchy`] map them back to [`ElementId`](super::ElementId)s.

use super::id::INVALID;
use super::store::Hierarchy;

/// Slot indices of an element's direct children, first to last.
///
/// Created by [`Hierarchy::children_at`].
#[derive(Clone, Debug)]
pub struct Children<'a> {
    next_sibling: &'a [u32],
    cursor: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(next_sibling: &'a [u32], first: u32) -> Self {
        Self {
            next_sibling,
            cursor: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let idx = self.cursor;
        if idx == INVALID {
            return None;
        }
        self.cursor = self.next_sibling[idx as usize];
        Some(idx)
    }
}

/// Slot indices of every descendant of an element, in pre-order. A parent is
/// always yielded before any of its children.
///
/// Created by [`Hierarchy::descendants`] and [`Hierarchy::descendants_at`].
#[derive(Debug)]
pub struct Descendants<'a> {
    hierarchy: &'a Hierarchy,
    root: u32,
    cursor: u32,
}

impl<'a> Descendants<'a> {
    pub(crate) fn new(hierarchy: &'a Hierarchy, root: u32, first: u32) -> Self {
        Self {
            hierarchy,
            root,
            cursor: first,
        }
    }
}

impl Iterator for Descendants<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let idx = self.cursor;
        if idx == INVALID {
            return None;
        }
        self.cursor = self.hierarchy.next_in_subtree(self.root, idx);
        Some(idx)
    }
}
