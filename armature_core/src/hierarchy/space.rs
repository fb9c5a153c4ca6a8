// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Space conversion and immediate writes.
//!
//! Units read and write the hierarchy through raw slot indices. Unlike the
//! handle-based setters, the writes here update global transforms right away:
//!
//! - The written element's local and global transforms are both stored.
//! - With `propagate`, every descendant's global transform is re-derived
//!   top-down from its unchanged local transform.
//! - Without `propagate`, descendants keep their global transforms. The direct
//!   children's local transforms are re-expressed against the new parent so
//!   that `global == parent_global * local` still holds.
//!
//! An element whose parent is [`INVALID`] is a root: its global transform is
//! its local transform, copied without arithmetic.

use crate::transform::Transform;

use super::control::ControlValue;
use super::id::INVALID;
use super::store::Hierarchy;

impl Hierarchy {
    /// Returns the global transform of the parent of `idx`, or the identity
    /// for roots and invalid slots.
    #[must_use]
    pub fn parent_global_at(&self, idx: u32) -> Transform {
        self.global_transform_at(self.parent_at(idx))
            .unwrap_or(Transform::IDENTITY)
    }

    /// Converts a local transform of `idx` into global space.
    #[must_use]
    pub fn local_to_global(&self, idx: u32, local: Transform) -> Transform {
        match self.global_transform_at(self.parent_at(idx)) {
            Some(parent) => parent * local,
            None => local,
        }
    }

    /// Converts a desired global transform of `idx` into its local space.
    #[must_use]
    pub fn global_to_local(&self, idx: u32, global: Transform) -> Transform {
        match self.global_transform_at(self.parent_at(idx)) {
            Some(parent) => global.relative_to(&parent),
            None => global,
        }
    }

    /// Sets the local transform at raw slot `idx`.
    ///
    /// Returns the number of descendants whose global transform was
    /// re-derived, or `None` if `idx` is not a live slot (nothing is written).
    pub fn set_local_transform_at(
        &mut self,
        idx: u32,
        local: Transform,
        propagate: bool,
    ) -> Option<usize> {
        if !self.is_valid_index(idx) {
            return None;
        }
        let global = self.local_to_global(idx, local);
        Some(self.store_transforms(idx, local, global, propagate))
    }

    /// Sets the global transform at raw slot `idx`, storing the equivalent
    /// local transform.
    ///
    /// Returns the number of descendants whose global transform was
    /// re-derived, or `None` if `idx` is not a live slot.
    pub fn set_global_transform_at(
        &mut self,
        idx: u32,
        global: Transform,
        propagate: bool,
    ) -> Option<usize> {
        if !self.is_valid_index(idx) {
            return None;
        }
        let local = self.global_to_local(idx, global);
        Some(self.store_transforms(idx, local, global, propagate))
    }

    /// Sets the value of the control at raw slot `idx`.
    ///
    /// Spatial values are written through the control's local transform and
    /// follow the same propagation rules as
    /// [`set_local_transform_at`](Self::set_local_transform_at). Returns
    /// `None` if `idx` is not a live control or the value's type differs from
    /// the control's.
    pub fn set_control_value_at(
        &mut self,
        idx: u32,
        value: ControlValue,
        propagate: bool,
    ) -> Option<usize> {
        let ty = self.control_at(idx)?.control_type();
        if ty != value.control_type() {
            return None;
        }
        if ty.is_spatial() {
            let local = value.apply_to(self.local_transform[idx as usize]);
            let visited = self.set_local_transform_at(idx, local, propagate)?;
            // Keep the authored value rather than the one re-read from the
            // transform, so rotators are not re-normalized.
            self.write_control_value(idx, value);
            Some(visited)
        } else {
            self.write_control_value(idx, value);
            Some(0)
        }
    }

    fn store_transforms(
        &mut self,
        idx: u32,
        local: Transform,
        global: Transform,
        propagate: bool,
    ) -> usize {
        self.write_local(idx, local);
        self.global_transform[idx as usize] = global;
        if propagate {
            self.propagate_from(idx)
        } else {
            self.rebase_children(idx);
            0
        }
    }

    /// Re-derives the global transform of every descendant of `root`,
    /// parents before children. Returns the number of descendants visited.
    pub(crate) fn propagate_from(&mut self, root: u32) -> usize {
        let mut count = 0;
        let mut cur = self.first_child[root as usize];
        while cur != INVALID {
            let parent = self.parent[cur as usize];
            self.global_transform[cur as usize] =
                self.global_transform[parent as usize] * self.local_transform[cur as usize];
            count += 1;
            cur = self.next_in_subtree(root, cur);
        }
        count
    }

    /// Re-expresses each direct child's local transform against the current
    /// global transform of `idx`, leaving the child's global transform as is.
    fn rebase_children(&mut self, idx: u32) {
        let parent_global = self.global_transform[idx as usize];
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            let local = self.global_transform[child as usize].relative_to(&parent_global);
            self.write_local(child, local);
            child = self.next_sibling[child as usize];
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{DQuat, DVec3, EulerRot};

    use crate::hierarchy::{ControlSettings, ElementId};

    use super::*;

    const EPS: f64 = 1e-9;

    /// Root(identity) -> Child(translate(1, 0, 0)) -> Grandchild(translate(0, 0, 2)).
    fn chain() -> (Hierarchy, ElementId, ElementId, ElementId) {
        let mut h = Hierarchy::new();
        let root = h.create_bone("Root").unwrap();
        let child = h.create_bone("Child").unwrap();
        let grandchild = h.create_bone("Grandchild").unwrap();
        h.add_child(root, child);
        h.add_child(child, grandchild);
        h.set_local_transform(child, Transform::from_translation(1.0, 0.0, 0.0));
        h.set_local_transform(grandchild, Transform::from_translation(0.0, 0.0, 2.0));
        let _ = h.evaluate();
        (h, root, child, grandchild)
    }

    #[test]
    fn root_local_equals_global_exactly() {
        let mut h = Hierarchy::new();
        let root = h.create_bone("root").unwrap();
        let _ = h.evaluate();
        let xf = Transform::new(
            DVec3::new(0.3, -7.1, 2.2),
            DQuat::from_euler(EulerRot::ZYX, 0.2, 0.4, 0.6),
            DVec3::new(1.0, 2.0, 3.0),
        );
        assert_eq!(h.local_to_global(root.index(), xf), xf);
        assert_eq!(h.global_to_local(root.index(), xf), xf);
        h.set_global_transform_at(root.index(), xf, true);
        assert_eq!(h.local_transform(root), xf);
        assert_eq!(h.global_transform(root), xf);
    }

    #[test]
    fn local_global_round_trip() {
        let (mut h, root, child, grandchild) = chain();
        h.set_local_transform_at(
            root.index(),
            Transform::new(
                DVec3::new(4.0, -2.0, 1.0),
                DQuat::from_euler(EulerRot::ZYX, 1.0, -0.3, 0.5),
                DVec3::new(2.0, 0.5, 1.25),
            ),
            true,
        );
        h.set_local_transform_at(
            child.index(),
            Transform::new(
                DVec3::new(1.0, 1.0, 0.0),
                DQuat::from_rotation_x(0.8),
                DVec3::splat(0.75),
            ),
            true,
        );
        let local = Transform::new(
            DVec3::new(-3.0, 0.5, 6.0),
            DQuat::from_rotation_z(-1.2),
            DVec3::new(1.0, 2.0, 1.0),
        );
        let idx = grandchild.index();
        let back = h.global_to_local(idx, h.local_to_global(idx, local));
        assert!(back.abs_diff_eq(&local, EPS), "{back:?} != {local:?}");
    }

    #[test]
    fn propagation_rederives_descendants_and_keeps_locals() {
        let (mut h, root, child, grandchild) = chain();
        let child_local = h.local_transform(child);
        let grandchild_local = h.local_transform(grandchild);
        let grandchild_global = h.global_transform(grandchild);

        let visited =
            h.set_local_transform_at(root.index(), Transform::from_translation(0.0, 5.0, 0.0), true);

        assert_eq!(visited, Some(2));
        assert_eq!(h.local_transform(child), child_local);
        assert_eq!(h.local_transform(grandchild), grandchild_local);
        assert_ne!(h.global_transform(grandchild), grandchild_global);
        assert!(
            h.global_transform(child)
                .translation
                .abs_diff_eq(DVec3::new(1.0, 5.0, 0.0), EPS)
        );
        assert!(
            h.global_transform(grandchild)
                .translation
                .abs_diff_eq(DVec3::new(1.0, 5.0, 2.0), EPS)
        );
    }

    #[test]
    fn without_propagation_children_keep_global() {
        let (mut h, root, child, grandchild) = chain();
        let child_global = h.global_transform(child);
        let grandchild_local = h.local_transform(grandchild);
        let grandchild_global = h.global_transform(grandchild);

        let visited = h.set_local_transform_at(
            root.index(),
            Transform::from_translation(0.0, 5.0, 0.0),
            false,
        );

        assert_eq!(visited, Some(0));
        assert!(h.global_transform(child).abs_diff_eq(&child_global, EPS));
        assert!(
            h.local_transform(child)
                .translation
                .abs_diff_eq(DVec3::new(1.0, -5.0, 0.0), EPS)
        );
        // Deeper descendants are untouched.
        assert_eq!(h.local_transform(grandchild), grandchild_local);
        assert_eq!(h.global_transform(grandchild), grandchild_global);
        // The invariant still holds for the rebased child.
        let recomposed = h.global_transform(root) * h.local_transform(child);
        assert!(recomposed.abs_diff_eq(&h.global_transform(child), EPS));
    }

    #[test]
    fn global_write_under_parent_stores_relative_local() {
        let (mut h, _root, child, _grandchild) = chain();
        h.set_global_transform_at(
            child.index(),
            Transform::from_translation(3.0, 3.0, 3.0),
            true,
        );
        // Root is identity, so local == global numerically.
        assert!(
            h.local_transform(child)
                .translation
                .abs_diff_eq(DVec3::new(3.0, 3.0, 3.0), EPS)
        );
    }

    #[test]
    fn writes_to_invalid_slots_are_noops() {
        let (mut h, ..) = chain();
        assert_eq!(
            h.set_local_transform_at(INVALID, Transform::IDENTITY, true),
            None
        );
        assert_eq!(
            h.set_global_transform_at(99, Transform::IDENTITY, false),
            None
        );
        assert_eq!(h.parent_global_at(INVALID), Transform::IDENTITY);
    }

    #[test]
    fn control_value_write_moves_control() {
        let mut h = Hierarchy::new();
        let root = h.create_bone("root").unwrap();
        let ctrl = h
            .create_control(
                "hand_ctrl",
                ControlSettings::new(ControlValue::Vector(DVec3::ZERO)),
            )
            .unwrap();
        h.add_child(root, ctrl);
        h.set_local_transform(root, Transform::from_translation(0.0, 0.0, 10.0));
        let _ = h.evaluate();

        let value = ControlValue::Vector(DVec3::new(1.0, 0.0, 0.0));
        assert!(h.set_control_value_at(ctrl.index(), value, true).is_some());
        assert_eq!(h.control(ctrl).unwrap().value, value);
        assert!(
            h.global_transform(ctrl)
                .translation
                .abs_diff_eq(DVec3::new(1.0, 0.0, 10.0), EPS)
        );
        assert_eq!(
            h.set_control_value_at(ctrl.index(), ControlValue::Float(1.0), true),
            None,
            "mismatched type must be rejected"
        );
        assert_eq!(
            h.set_control_value_at(root.index(), value, true),
            None,
            "bones carry no control value"
        );
    }
}
