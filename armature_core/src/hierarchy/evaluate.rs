// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deferred evaluation of host-side edits.
//!
//! Handle-based edits ([`set_local_transform`](Hierarchy::set_local_transform),
//! [`add_child`](Hierarchy::add_child), ...) only mark dirty channels.
//! [`Hierarchy::evaluate`] brings the computed state up to date:
//!
//! 1. **TOPOLOGY**: if the structure changed, rebuild the depth-first
//!    traversal order.
//! 2. **TRANSFORM**: drain dirty indices (including all descendants of marked
//!    elements), then walk the traversal order and recompute each dirty
//!    `global_transform` as `parent_global * local_transform`. Roots take
//!    their local transform unchanged.
//!
//! Hosts call `evaluate` once after construction or editing and before running
//! units for a tick, so that units observe consistent global transforms.

use alloc::vec;
use alloc::vec::Vec;

use super::id::INVALID;
use super::store::Hierarchy;
use crate::dirty;

/// The set of changes produced by a single [`Hierarchy::evaluate`] call.
///
/// Each field contains raw slot indices.
#[derive(Clone, Debug, Default)]
pub struct HierarchyChanges {
    /// Elements whose global transform was recomputed.
    pub transforms: Vec<u32>,
    /// Elements created since the last evaluate.
    pub added: Vec<u32>,
    /// Elements destroyed since the last evaluate.
    pub removed: Vec<u32>,
    /// Whether the hierarchy structure changed (traversal order was rebuilt).
    pub topology_changed: bool,
}

impl HierarchyChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.transforms.clear();
        self.added.clear();
        self.removed.clear();
        self.topology_changed = false;
    }
}

impl Hierarchy {
    /// Recomputes dirty global transforms and returns the set of changes.
    pub fn evaluate(&mut self) -> HierarchyChanges {
        let mut changes = HierarchyChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but writes into a caller-provided
    /// change buffer.
    pub fn evaluate_into(&mut self, changes: &mut HierarchyChanges) {
        changes.clear();

        if self.traversal_dirty {
            self.rebuild_traversal_order();
            changes.topology_changed = true;
            self.traversal_dirty = false;
        }

        let mut dirty_mask = vec![false; self.len as usize];
        for idx in self
            .dirty
            .drain(dirty::TRANSFORM)
            .affected()
            .deterministic()
            .run()
        {
            // Field access only: the drain holds `self.dirty` mutably.
            if idx < self.len && self.alive[idx as usize] {
                dirty_mask[idx as usize] = true;
            }
        }
        // The traversal order puts every parent ahead of its children, so a
        // recomputed parent global is final before any child reads it.
        for &idx in &self.traversal_order {
            if !dirty_mask[idx as usize] {
                continue;
            }
            let parent_idx = self.parent[idx as usize];
            let local = self.local_transform[idx as usize];
            self.global_transform[idx as usize] = if parent_idx != INVALID {
                self.global_transform[parent_idx as usize] * local
            } else {
                local
            };
            changes.transforms.push(idx);
        }

        // Topology marks are only consumed; the traversal was rebuilt above.
        let _: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
    }

    /// Returns the current traversal order (depth-first pre-order over all
    /// roots).
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn traversal_order(&self) -> &[u32] {
        &self.traversal_order
    }

    fn rebuild_traversal_order(&mut self) {
        let mut order = core::mem::take(&mut self.traversal_order);
        order.clear();
        for root in 0..self.len {
            if self.alive[root as usize] && self.parent[root as usize] == INVALID {
                order.push(root);
                order.extend(self.descendants_at(root));
            }
        }
        self.traversal_order = order;
    }
}
