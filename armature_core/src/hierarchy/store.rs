// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays element storage with allocation, naming, topology, and
//! property management.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use crate::dirty;
use crate::transform::Transform;

use super::control::{ControlSettings, ControlValue};
use super::id::{ElementId, ElementKind, INVALID};
use super::traverse::{Children, Descendants};

/// Struct-of-arrays storage for all bones and controls of a rig.
///
/// Elements are addressed by [`ElementId`] handles on the host side and by
/// raw slot indices (resolved by name through [`index_of`](Self::index_of))
/// on the unit side. Destroyed elements are recycled via a free list, and
/// generation counters prevent stale handle access.
#[derive(Debug)]
pub struct Hierarchy {
    // -- Identity --
    pub(crate) name: Vec<String>,
    pub(crate) kind: Vec<ElementKind>,
    pub(crate) names: BTreeMap<String, u32>,

    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local properties (set by callers and units) --
    pub(crate) local_transform: Vec<Transform>,
    pub(crate) control: Vec<Option<ControlSettings>>,

    // -- Computed properties --
    pub(crate) global_transform: Vec<Transform>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) alive: Vec<bool>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,
    pub(crate) topology_version: u64,

    // -- Traversal cache --
    pub(crate) traversal_order: Vec<u32>,
    pub(crate) traversal_dirty: bool,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl Hierarchy {
    /// Creates an empty hierarchy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: Vec::new(),
            kind: Vec::new(),
            names: BTreeMap::new(),
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            local_transform: Vec::new(),
            control: Vec::new(),
            global_transform: Vec::new(),
            generation: Vec::new(),
            alive: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            topology_version: 0,
            traversal_order: Vec::new(),
            traversal_dirty: true,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
        }
    }

    // -- Allocation API --

    /// Creates a new root bone with an identity transform.
    ///
    /// Returns `None` if `name` is already taken.
    pub fn create_bone(&mut self, name: &str) -> Option<ElementId> {
        self.create_element(name, ElementKind::Bone, None)
    }

    /// Creates a new root control.
    ///
    /// Spatial values (vector, rotator, transform) seed the control's local
    /// transform. Returns `None` if `name` is already taken.
    pub fn create_control(&mut self, name: &str, settings: ControlSettings) -> Option<ElementId> {
        self.create_element(name, ElementKind::Control, Some(settings))
    }

    fn create_element(
        &mut self,
        name: &str,
        kind: ElementKind,
        control: Option<ControlSettings>,
    ) -> Option<ElementId> {
        if self.names.contains_key(name) {
            return None;
        }
        let local = control
            .map(|c| c.value.apply_to(Transform::IDENTITY))
            .unwrap_or(Transform::IDENTITY);

        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            let i = idx as usize;
            self.generation[i] += 1;
            self.alive[i] = true;
            self.name[i] = name.to_string();
            self.kind[i] = kind;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.local_transform[i] = local;
            self.control[i] = control;
            self.global_transform[i] = local;
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.name.push(name.to_string());
            self.kind.push(kind);
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.local_transform.push(local);
            self.control.push(control);
            self.global_transform.push(local);
            self.generation.push(0);
            self.alive.push(true);
            idx
        };

        self.names.insert(name.to_string(), idx);
        self.topology_changed();
        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);

        Some(ElementId {
            idx,
            generation: self.generation[idx as usize],
        })
    }

    /// Destroys an element, freeing its slot and name for reuse.
    ///
    /// # Panics
    ///
    /// Panics if the element has children (remove them first) or if the
    /// handle is stale.
    pub fn destroy_element(&mut self, id: ElementId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy element with children"
        );

        if self.parent[idx as usize] != INVALID {
            self.unlink_from_parent(idx);
        }

        self.dirty.remove_key(idx);
        self.names.remove(&self.name[idx as usize]);
        self.control[idx as usize] = None;

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;
        self.alive[idx as usize] = false;

        self.free_list.push(idx);
        self.topology_changed();
        self.pending_removed.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
    }

    /// Returns whether the given handle refers to a live element.
    #[must_use]
    pub fn is_alive(&self, id: ElementId) -> bool {
        id.idx < self.len
            && self.generation[id.idx as usize] == id.generation
            && self.alive[id.idx as usize]
    }

    /// Returns the number of live elements.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.names.len()
    }

    /// Renames an element.
    ///
    /// Returns `false` (and leaves the element unchanged) if `new_name` is
    /// already used by another element. Renaming counts as a structural
    /// change: cached indices resolved against the old name re-resolve.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn rename(&mut self, id: ElementId, new_name: &str) -> bool {
        self.validate(id);
        let idx = id.idx;
        if self.name[idx as usize] == new_name {
            return true;
        }
        if self.names.contains_key(new_name) {
            return false;
        }
        self.names.remove(&self.name[idx as usize]);
        self.names.insert(new_name.to_string(), idx);
        self.name[idx as usize] = new_name.to_string();
        self.topology_changed();
        self.dirty.mark(idx, dirty::TOPOLOGY);
        true
    }

    // -- Name resolution --

    /// Resolves a name to its raw slot index, or [`INVALID`] if no live
    /// element carries that name.
    #[must_use]
    pub fn index_of(&self, name: &str) -> u32 {
        self.names.get(name).copied().unwrap_or(INVALID)
    }

    /// Resolves a name to a handle.
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<ElementId> {
        let idx = self.index_of(name);
        (idx != INVALID).then(|| ElementId {
            idx,
            generation: self.generation[idx as usize],
        })
    }

    /// Returns the structural version of the hierarchy.
    ///
    /// The version increases on every create, destroy, attach, detach and
    /// rename. Indices resolved under an older version must be re-resolved.
    #[inline]
    #[must_use]
    pub fn topology_version(&self) -> u64 {
        self.topology_version
    }

    // -- Topology API --

    /// Adds `child` as the last child of `parent`.
    ///
    /// `child` keeps its local transform; its global transform (and those of
    /// its descendants) is recomputed under the new ancestry on the next
    /// [`evaluate`](Self::evaluate).
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, if `child` already has a parent, or
    /// if `parent` is `child` or one of its descendants.
    pub fn add_child(&mut self, parent: ElementId, child: ElementId) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        assert!(
            p != c && !self.descendants_at(c).any(|d| d == p),
            "attaching would create a cycle"
        );

        self.link_last_child(p, c);
        let _ = self.dirty.add_dependency(c, p, dirty::TRANSFORM);

        self.dirty.mark_with(c, dirty::TRANSFORM, &EagerPolicy);
        self.topology_changed();
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Removes `child` from its current parent, making it a root.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the element has no parent.
    pub fn remove_from_parent(&mut self, child: ElementId) {
        self.validate(child);
        let c = child.idx;
        assert!(self.parent[c as usize] != INVALID, "element has no parent");

        let p = self.parent[c as usize];
        self.unlink_from_parent(c);
        self.dirty.remove_dependency(c, p, dirty::TRANSFORM);

        self.dirty.mark_with(c, dirty::TRANSFORM, &EagerPolicy);
        self.topology_changed();
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Moves `child` to be the last child of `new_parent`.
    ///
    /// If `child` already has a parent, it is removed first.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale or if the move would create a cycle.
    pub fn reparent(&mut self, child: ElementId, new_parent: ElementId) {
        self.validate(child);
        self.validate(new_parent);
        let c = child.idx;
        let p = new_parent.idx;
        assert!(
            p != c && !self.descendants_at(c).any(|d| d == p),
            "attaching would create a cycle"
        );

        let old_p = self.parent[c as usize];
        if old_p != INVALID {
            self.unlink_from_parent(c);
            self.dirty.remove_dependency(c, old_p, dirty::TRANSFORM);
            self.dirty.mark(old_p, dirty::TOPOLOGY);
        }

        self.link_last_child(p, c);
        let _ = self.dirty.add_dependency(c, p, dirty::TRANSFORM);

        self.dirty.mark_with(c, dirty::TRANSFORM, &EagerPolicy);
        self.topology_changed();
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Returns the parent of an element, if any.
    #[must_use]
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| ElementId {
            idx: p,
            generation: self.generation[p as usize],
        })
    }

    /// Returns the direct children of an element, first to last.
    pub fn children(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        self.validate(id);
        self.children_at(id.idx).map(|idx| ElementId {
            idx,
            generation: self.generation[idx as usize],
        })
    }

    /// Returns an iterator over all descendants of an element, parents before
    /// children.
    #[must_use]
    pub fn descendants(&self, id: ElementId) -> Descendants<'_> {
        self.validate(id);
        self.descendants_at(id.idx)
    }

    /// Returns the root elements (those with no parent).
    #[must_use]
    pub fn roots(&self) -> Vec<ElementId> {
        (0..self.len)
            .filter(|&idx| self.alive[idx as usize] && self.parent[idx as usize] == INVALID)
            .map(|idx| ElementId {
                idx,
                generation: self.generation[idx as usize],
            })
            .collect()
    }

    // -- Property getters (read-only, no dirty marking) --

    /// Returns the name of an element.
    #[must_use]
    pub fn name(&self, id: ElementId) -> &str {
        self.validate(id);
        &self.name[id.idx as usize]
    }

    /// Returns the kind of an element.
    #[must_use]
    pub fn kind(&self, id: ElementId) -> ElementKind {
        self.validate(id);
        self.kind[id.idx as usize]
    }

    /// Returns the local transform of an element.
    #[must_use]
    pub fn local_transform(&self, id: ElementId) -> Transform {
        self.validate(id);
        self.local_transform[id.idx as usize]
    }

    /// Returns the global transform of an element.
    ///
    /// Host-side edits are only reflected after [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn global_transform(&self, id: ElementId) -> Transform {
        self.validate(id);
        self.global_transform[id.idx as usize]
    }

    /// Returns the control settings of an element, or `None` for bones.
    #[must_use]
    pub fn control(&self, id: ElementId) -> Option<&ControlSettings> {
        self.validate(id);
        self.control[id.idx as usize].as_ref()
    }

    // -- Mutation API (auto-marks dirty) --

    /// Sets the local transform of an element.
    ///
    /// Marks the TRANSFORM channel dirty with eager propagation to
    /// descendants; global transforms are recomputed by
    /// [`evaluate`](Self::evaluate).
    pub fn set_local_transform(&mut self, id: ElementId, transform: Transform) {
        self.validate(id);
        self.write_local(id.idx, transform);
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
    }

    /// Sets the value of a control.
    ///
    /// Spatial values update the control's local transform and mark it dirty.
    /// Values of a different type than the control's are ignored.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_control_value(&mut self, id: ElementId, value: ControlValue) {
        self.validate(id);
        if self.write_control_value(id.idx, value) && value.control_type().is_spatial() {
            self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
        }
    }

    // -- Raw-index accessors for units --
    //
    // These accept raw slot indices as produced by `index_of()` rather than
    // `ElementId` handles. Invalid or dead slots yield `None` (or `INVALID`)
    // instead of panicking, since an unresolved target is a normal condition
    // during evaluation.

    /// Returns whether `idx` refers to a live slot.
    #[inline]
    #[must_use]
    pub fn is_valid_index(&self, idx: u32) -> bool {
        idx < self.len && self.alive[idx as usize]
    }

    /// Returns the name at raw slot `idx`.
    #[must_use]
    pub fn name_at(&self, idx: u32) -> Option<&str> {
        self.is_valid_index(idx)
            .then(|| self.name[idx as usize].as_str())
    }

    /// Returns the kind at raw slot `idx`.
    #[must_use]
    pub fn kind_at(&self, idx: u32) -> Option<ElementKind> {
        self.is_valid_index(idx).then(|| self.kind[idx as usize])
    }

    /// Returns the parent slot of `idx`, or [`INVALID`] for roots and invalid
    /// slots.
    #[must_use]
    pub fn parent_at(&self, idx: u32) -> u32 {
        if self.is_valid_index(idx) {
            self.parent[idx as usize]
        } else {
            INVALID
        }
    }

    /// Returns the name of the parent of `idx`, if it has one.
    #[must_use]
    pub fn parent_name_at(&self, idx: u32) -> Option<&str> {
        self.name_at(self.parent_at(idx))
    }

    /// Returns the local transform at raw slot `idx`.
    #[must_use]
    pub fn local_transform_at(&self, idx: u32) -> Option<Transform> {
        self.is_valid_index(idx)
            .then(|| self.local_transform[idx as usize])
    }

    /// Returns the global transform at raw slot `idx`.
    #[must_use]
    pub fn global_transform_at(&self, idx: u32) -> Option<Transform> {
        self.is_valid_index(idx)
            .then(|| self.global_transform[idx as usize])
    }

    /// Returns the control settings at raw slot `idx`, or `None` for bones
    /// and invalid slots.
    #[must_use]
    pub fn control_at(&self, idx: u32) -> Option<&ControlSettings> {
        if self.is_valid_index(idx) {
            self.control[idx as usize].as_ref()
        } else {
            None
        }
    }

    /// Returns the direct children of raw slot `idx`. Invalid slots yield
    /// nothing.
    #[must_use]
    pub fn children_at(&self, idx: u32) -> Children<'_> {
        let first = if self.is_valid_index(idx) {
            self.first_child[idx as usize]
        } else {
            INVALID
        };
        Children::new(&self.next_sibling, first)
    }

    /// Returns an iterator over the descendants of raw slot `idx`, parents
    /// before children. Invalid slots yield nothing.
    #[must_use]
    pub fn descendants_at(&self, idx: u32) -> Descendants<'_> {
        let first = if self.is_valid_index(idx) {
            self.first_child[idx as usize]
        } else {
            INVALID
        };
        Descendants::new(self, idx, first)
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: ElementId) {
        assert!(
            self.is_alive(id),
            "stale ElementId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Writes a local transform and keeps a spatial control's value in sync.
    pub(crate) fn write_local(&mut self, idx: u32, local: Transform) {
        let i = idx as usize;
        self.local_transform[i] = local;
        if let Some(control) = &mut self.control[i] {
            control.value = control.value.read_from(&local);
        }
    }

    /// Writes a control value. Returns `false` if `idx` is not a control or
    /// the type does not match.
    pub(crate) fn write_control_value(&mut self, idx: u32, value: ControlValue) -> bool {
        let i = idx as usize;
        let Some(control) = &mut self.control[i] else {
            return false;
        };
        if control.control_type() != value.control_type() {
            return false;
        }
        control.value = value;
        if value.control_type().is_spatial() {
            self.local_transform[i] = value.apply_to(self.local_transform[i]);
        }
        true
    }

    /// Returns the slot visited after `cur` in a pre-order walk of the
    /// subtree rooted at `root`, or [`INVALID`] when the walk is complete.
    pub(crate) fn next_in_subtree(&self, root: u32, cur: u32) -> u32 {
        let first = self.first_child[cur as usize];
        if first != INVALID {
            return first;
        }
        let mut n = cur;
        while n != root {
            let sibling = self.next_sibling[n as usize];
            if sibling != INVALID {
                return sibling;
            }
            n = self.parent[n as usize];
        }
        INVALID
    }

    fn topology_changed(&mut self) {
        self.traversal_dirty = true;
        self.topology_version += 1;
    }

    fn link_last_child(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            // Walk to last child.
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }
}
