// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The multi-bone modifier.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::hierarchy::Hierarchy;
use crate::schema::{FieldDescriptor, FieldKind, UnitDescriptor};
use crate::trace::WriteKind;
use crate::transform::Transform;

use super::blend::{WeightRange, blend_transform};
use super::cache::CachedIndices;
use super::context::ExecuteContext;
use super::{Describe, Evaluable, SpaceAdvisory, label};

/// How [`ModifyBoneTransforms`] combines each input with the bone's current
/// transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ModifyBoneMode {
    /// Replace the local transform.
    OverrideLocal,
    /// Replace the global transform.
    OverrideGlobal,
    /// Apply the input within the bone's own space: `local * input`.
    #[default]
    AdditiveLocal,
    /// Apply the input as an offset at the hierarchy root: `input * global`.
    AdditiveGlobal,
}

impl ModifyBoneMode {
    /// Returns the editor display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OverrideLocal => "OverrideLocal",
            Self::OverrideGlobal => "OverrideGlobal",
            Self::AdditiveLocal => "AdditiveLocal",
            Self::AdditiveGlobal => "AdditiveGlobal",
        }
    }

    /// Returns whether the mode reads and writes local transforms.
    #[must_use]
    pub const fn is_local(self) -> bool {
        matches!(self, Self::OverrideLocal | Self::AdditiveLocal)
    }

    /// Combines `input` with the bone's current transform in this mode's
    /// space.
    #[must_use]
    pub fn apply(self, current: Transform, input: Transform) -> Transform {
        match self {
            Self::OverrideLocal | Self::OverrideGlobal => input,
            Self::AdditiveLocal => current * input,
            Self::AdditiveGlobal => input * current,
        }
    }
}

/// One entry of [`ModifyBoneTransforms::bone_to_modify`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModifyBoneTarget {
    /// Name of the bone to modify.
    pub bone: String,
    /// The input transform, interpreted according to the unit's mode.
    pub transform: Transform,
}

impl ModifyBoneTarget {
    /// Creates an entry.
    #[must_use]
    pub fn new(bone: impl Into<String>, transform: Transform) -> Self {
        Self {
            bone: bone.into(),
            transform,
        }
    }
}

/// Sets or offsets the transforms of several bones at once.
///
/// The weight is remapped from `[weight_minimum, weight_maximum]` to `[0, 1]`
/// (see [`WeightRange`]) and each bone's result is blended against its
/// current transform in the mode's space. Entries whose bone does not resolve
/// are skipped. Entries are applied in order, so with propagation a later
/// entry observes the effect of earlier ones on its ancestors.
#[derive(Clone, Debug, PartialEq)]
pub struct ModifyBoneTransforms {
    /// The bones to modify.
    pub bone_to_modify: Vec<ModifyBoneTarget>,
    /// At `weight_maximum` the transforms are set; in between they are blended.
    pub weight: f64,
    /// Weight at which the unit has no effect.
    pub weight_minimum: f64,
    /// Weight at which the unit takes full effect.
    pub weight_maximum: f64,
    /// How inputs combine with current transforms.
    pub mode: ModifyBoneMode,
    /// Re-derive descendant global transforms after each write.
    pub propagate_to_children: bool,
    /// Memoized slots, parallel to `bone_to_modify`.
    pub cached_bones: CachedIndices,
}

impl Default for ModifyBoneTransforms {
    fn default() -> Self {
        Self::new(vec![ModifyBoneTarget::default()])
    }
}

impl ModifyBoneTransforms {
    /// Creates an additive-local modifier over `targets` with full weight and
    /// propagation.
    #[must_use]
    pub fn new(targets: Vec<ModifyBoneTarget>) -> Self {
        Self {
            bone_to_modify: targets,
            weight: 1.0,
            weight_minimum: 0.0,
            weight_maximum: 1.0,
            mode: ModifyBoneMode::AdditiveLocal,
            propagate_to_children: true,
            cached_bones: CachedIndices::new(),
        }
    }

    /// Sets the mode.
    #[must_use]
    pub fn with_mode(mut self, mode: ModifyBoneMode) -> Self {
        self.mode = mode;
        self
    }

    /// Returns the weight interval.
    #[must_use]
    pub fn weight_range(&self) -> WeightRange {
        WeightRange::new(self.weight_minimum, self.weight_maximum)
    }
}

static MODIFY_BONE_TRANSFORMS: UnitDescriptor = UnitDescriptor {
    name: "ModifyBoneTransforms",
    display_name: "Modify Transforms",
    category: "Hierarchy",
    keywords: &["ModifyBone"],
    fields: &[
        FieldDescriptor::input("BoneToModify", FieldKind::BoneTargets, "[{}]"),
        FieldDescriptor::input("Weight", FieldKind::Float, "1.0").ui_range(0.0, 1.0),
        FieldDescriptor::input("WeightMinimum", FieldKind::Float, "0.0")
            .ui_range(0.0, 1.0)
            .constant(),
        FieldDescriptor::input("WeightMaximum", FieldKind::Float, "1.0")
            .ui_range(0.0, 1.0)
            .constant(),
        FieldDescriptor::input("Mode", FieldKind::ModifyMode, "AdditiveLocal").constant(),
        FieldDescriptor::input("PropagateToChildren", FieldKind::Bool, "true").constant(),
    ],
};

impl Evaluable for ModifyBoneTransforms {
    fn evaluate(&mut self, ctx: &mut ExecuteContext<'_>) {
        let unit = MODIFY_BONE_TRANSFORMS.name;
        let Some(t) = self.weight_range().factor(self.weight) else {
            return;
        };
        let mode = self.mode;
        let propagate = self.propagate_to_children;
        self.cached_bones.truncate(self.bone_to_modify.len());

        for (i, target) in self.bone_to_modify.iter().enumerate() {
            let Some(idx) = ctx.resolve_nth(&mut self.cached_bones, i, &target.bone, unit) else {
                continue;
            };
            let h = &mut *ctx.hierarchy;
            let (prev, kind) = if mode.is_local() {
                (h.local_transform_at(idx), WriteKind::Local)
            } else {
                (h.global_transform_at(idx), WriteKind::Global)
            };
            let Some(prev) = prev else {
                continue;
            };
            let next = blend_transform(&prev, mode.apply(prev, target.transform), t);
            let visited = if mode.is_local() {
                h.set_local_transform_at(idx, next, propagate)
            } else {
                h.set_global_transform_at(idx, next, propagate)
            };
            if let Some(descendants) = visited {
                ctx.record_write(unit, idx, kind, t, propagate, descendants);
            }
        }
    }
}

/// Parses the entry index from `BoneToModify[<i>]...` or
/// `BoneToModify.<i>...`.
///
/// Whitespace around the whole path and around a bracketed index is ignored,
/// so `" BoneToModify[ 2 ].Transform "` names entry 2.
fn entry_index(pin_path: &str) -> Option<usize> {
    let rest = pin_path.trim().strip_prefix("BoneToModify")?;
    let (rest, bracketed) = match rest.strip_prefix('[') {
        Some(r) => (r.trim_start(), true),
        None => (rest.strip_prefix('.')?, false),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let (digits, tail) = rest.split_at(end);
    let tail_ok = if bracketed {
        tail.trim_start().starts_with(']')
    } else {
        tail.is_empty() || tail.starts_with('.')
    };
    if digits.is_empty() || !tail_ok {
        return None;
    }
    digits.parse().ok()
}

impl SpaceAdvisory for ModifyBoneTransforms {
    fn advise_space(&self, pin_path: &str, hierarchy: &Hierarchy) -> Option<String> {
        let entry = self.bone_to_modify.get(entry_index(pin_path)?)?;
        match self.mode {
            ModifyBoneMode::AdditiveLocal if !entry.bone.is_empty() => Some(entry.bone.clone()),
            ModifyBoneMode::OverrideLocal => hierarchy
                .parent_name_at(hierarchy.index_of(&entry.bone))
                .map(String::from),
            _ => None,
        }
    }
}

impl Describe for ModifyBoneTransforms {
    fn descriptor() -> &'static UnitDescriptor {
        &MODIFY_BONE_TRANSFORMS
    }

    fn unit_label(&self) -> String {
        label(MODIFY_BONE_TRANSFORMS.display_name, "")
    }
}

#[cfg(test)]
mod tests {
    use glam::{DQuat, DVec3, EulerRot};

    use crate::hierarchy::ElementId;

    use super::*;

    const EPS: f64 = 1e-9;

    /// Root(identity) -> Child(translate(1, 0, 0)) -> Tip(translate(0, 0, 1)).
    fn rig() -> (Hierarchy, ElementId, ElementId, ElementId) {
        let mut h = Hierarchy::new();
        let root = h.create_bone("Root").unwrap();
        let child = h.create_bone("Child").unwrap();
        let tip = h.create_bone("Tip").unwrap();
        h.add_child(root, child);
        h.add_child(child, tip);
        h.set_local_transform(child, Transform::from_translation(1.0, 0.0, 0.0));
        h.set_local_transform(tip, Transform::from_translation(0.0, 0.0, 1.0));
        let _ = h.evaluate();
        (h, root, child, tip)
    }

    fn run(h: &mut Hierarchy, unit: &mut ModifyBoneTransforms) {
        unit.evaluate(&mut ExecuteContext::new(h, 0));
    }

    fn single(bone: &str, xf: Transform, mode: ModifyBoneMode) -> ModifyBoneTransforms {
        ModifyBoneTransforms::new(vec![ModifyBoneTarget::new(bone, xf)]).with_mode(mode)
    }

    fn snapshot(h: &Hierarchy, ids: &[ElementId]) -> Vec<(Transform, Transform)> {
        ids.iter()
            .map(|&id| (h.local_transform(id), h.global_transform(id)))
            .collect()
    }

    #[test]
    fn defaults() {
        let unit = ModifyBoneTransforms::default();
        assert_eq!(unit.bone_to_modify.len(), 1);
        assert_eq!(unit.mode, ModifyBoneMode::AdditiveLocal);
        assert!(unit.propagate_to_children);
        assert_eq!(unit.weight_range(), WeightRange::UNIT);
        assert_eq!(unit.unit_label(), "Modify Transforms");
    }

    #[test]
    fn override_root_propagates_to_child() {
        let (mut h, _root, child, _tip) = rig();
        let mut unit = single(
            "Root",
            Transform::from_translation(0.0, 5.0, 0.0),
            ModifyBoneMode::OverrideLocal,
        );
        run(&mut h, &mut unit);
        assert_eq!(
            h.local_transform(child),
            Transform::from_translation(1.0, 0.0, 0.0)
        );
        assert!(
            h.global_transform(child)
                .translation
                .abs_diff_eq(DVec3::new(1.0, 5.0, 0.0), EPS)
        );
    }

    #[test]
    fn override_local_full_weight_is_exact() {
        let (mut h, _root, child, _tip) = rig();
        let input = Transform::new(
            DVec3::new(0.7, -0.2, 3.0),
            DQuat::from_euler(EulerRot::ZYX, 0.1, 0.9, -0.4),
            DVec3::new(1.5, 1.0, 0.25),
        );
        run(&mut h, &mut single("Child", input, ModifyBoneMode::OverrideLocal));
        assert_eq!(h.local_transform(child), input);
    }

    #[test]
    fn zero_weight_is_bit_identical() {
        let (mut h, root, child, tip) = rig();
        let before = snapshot(&h, &[root, child, tip]);
        for mode in [
            ModifyBoneMode::OverrideLocal,
            ModifyBoneMode::OverrideGlobal,
            ModifyBoneMode::AdditiveLocal,
            ModifyBoneMode::AdditiveGlobal,
        ] {
            let mut unit = single("Child", Transform::from_translation(4.0, 4.0, 4.0), mode);
            unit.weight = 0.0;
            run(&mut h, &mut unit);
        }
        assert_eq!(before, snapshot(&h, &[root, child, tip]));
    }

    #[test]
    fn additive_local_is_not_idempotent() {
        let (mut h, _root, child, _tip) = rig();
        let offset = Transform::from_translation(0.0, 1.0, 0.0);
        let mut unit = single("Child", offset, ModifyBoneMode::AdditiveLocal);
        run(&mut h, &mut unit);
        let once = h.local_transform(child);
        run(&mut h, &mut unit);
        let twice = h.local_transform(child);
        assert_ne!(once, twice);
        assert!(once.translation.abs_diff_eq(DVec3::new(1.0, 1.0, 0.0), EPS));
        assert!(twice.translation.abs_diff_eq(DVec3::new(1.0, 2.0, 0.0), EPS));
    }

    #[test]
    fn additive_local_applies_in_bone_space() {
        let (mut h, _root, child, _tip) = rig();
        h.set_local_transform_at(
            child.index(),
            Transform::new(
                DVec3::new(1.0, 0.0, 0.0),
                DQuat::from_rotation_z(core::f64::consts::FRAC_PI_2),
                DVec3::ONE,
            ),
            true,
        );
        let mut unit = single(
            "Child",
            Transform::from_translation(1.0, 0.0, 0.0),
            ModifyBoneMode::AdditiveLocal,
        );
        run(&mut h, &mut unit);
        // The offset is rotated by the bone's own rotation.
        assert!(
            h.local_transform(child)
                .translation
                .abs_diff_eq(DVec3::new(1.0, 1.0, 0.0), EPS)
        );
    }

    #[test]
    fn additive_global_offsets_at_root() {
        let (mut h, root, child, _tip) = rig();
        h.set_local_transform_at(
            root.index(),
            Transform::from_rotation(DQuat::from_rotation_z(core::f64::consts::FRAC_PI_2)),
            true,
        );
        let mut unit = single(
            "Child",
            Transform::from_translation(0.0, 0.0, 3.0),
            ModifyBoneMode::AdditiveGlobal,
        );
        run(&mut h, &mut unit);
        assert!(
            h.global_transform(child)
                .translation
                .abs_diff_eq(DVec3::new(0.0, 1.0, 3.0), EPS)
        );
    }

    #[test]
    fn override_global_converts_to_local() {
        let (mut h, root, child, _tip) = rig();
        h.set_local_transform_at(root.index(), Transform::from_translation(0.0, 0.0, 2.0), true);
        run(
            &mut h,
            &mut single(
                "Child",
                Transform::from_translation(5.0, 0.0, 0.0),
                ModifyBoneMode::OverrideGlobal,
            ),
        );
        assert!(
            h.local_transform(child)
                .translation
                .abs_diff_eq(DVec3::new(5.0, 0.0, -2.0), EPS)
        );
    }

    #[test]
    fn global_modes_without_propagation_keep_child_globals() {
        use core::f64::consts::FRAC_PI_2;

        let rotated_rig = || {
            let (mut h, root, child, tip) = rig();
            h.set_local_transform_at(
                root.index(),
                Transform::from_rotation(DQuat::from_rotation_z(FRAC_PI_2)),
                true,
            );
            // Child global: (0, 1, 0) Z90. Tip global: (0, 1, 1) Z90.
            (h, child, tip)
        };

        // OverrideGlobal: Child lands on (3, 0, 0) with no rotation.
        let (mut h, child, tip) = rotated_rig();
        let tip_global = h.global_transform(tip);
        let mut unit = single(
            "Child",
            Transform::from_translation(3.0, 0.0, 0.0),
            ModifyBoneMode::OverrideGlobal,
        );
        unit.propagate_to_children = false;
        run(&mut h, &mut unit);

        let local = h.local_transform(child);
        assert!(local.translation.abs_diff_eq(DVec3::new(0.0, -3.0, 0.0), EPS));
        assert!(
            local
                .rotation
                .abs_diff_eq(DQuat::from_rotation_z(-FRAC_PI_2), EPS)
        );
        assert!(h.global_transform(tip).abs_diff_eq(&tip_global, EPS));
        let tip_local = h.local_transform(tip);
        assert!(
            tip_local
                .translation
                .abs_diff_eq(DVec3::new(-3.0, 1.0, 1.0), EPS)
        );
        assert!(
            tip_local
                .rotation
                .abs_diff_eq(DQuat::from_rotation_z(FRAC_PI_2), EPS)
        );

        // AdditiveGlobal: a Z-90 offset applied on the world side swings
        // Child from (0, 1, 0) to (1, 0, 0) and cancels its rotation.
        let (mut h, child, tip) = rotated_rig();
        let tip_global = h.global_transform(tip);
        let mut unit = single(
            "Child",
            Transform::from_rotation(DQuat::from_rotation_z(-FRAC_PI_2)),
            ModifyBoneMode::AdditiveGlobal,
        );
        unit.propagate_to_children = false;
        run(&mut h, &mut unit);

        let global = h.global_transform(child);
        assert!(global.translation.abs_diff_eq(DVec3::new(1.0, 0.0, 0.0), EPS));
        assert!(global.rotation.abs_diff_eq(DQuat::IDENTITY, EPS));
        assert!(h.global_transform(tip).abs_diff_eq(&tip_global, EPS));
        assert!(
            h.local_transform(tip)
                .translation
                .abs_diff_eq(DVec3::new(-1.0, 1.0, 1.0), EPS)
        );
    }

    #[test]
    fn propagation_keeps_descendant_locals() {
        let (mut h, _root, child, tip) = rig();
        let tip_local = h.local_transform(tip);
        let tip_global = h.global_transform(tip);
        run(
            &mut h,
            &mut single(
                "Child",
                Transform::from_rotation(DQuat::from_rotation_x(0.5)),
                ModifyBoneMode::AdditiveLocal,
            ),
        );
        assert_eq!(h.local_transform(tip), tip_local);
        assert_ne!(h.global_transform(tip), tip_global);
        let recomposed = h.global_transform(child) * h.local_transform(tip);
        assert!(recomposed.abs_diff_eq(&h.global_transform(tip), EPS));
    }

    #[test]
    fn weight_is_remapped_through_range() {
        let (mut h, _root, child, _tip) = rig();
        let mut unit = single(
            "Child",
            Transform::from_translation(3.0, 0.0, 0.0),
            ModifyBoneMode::OverrideLocal,
        );
        unit.weight_minimum = 0.5;
        unit.weight_maximum = 1.0;
        unit.weight = 0.75;
        run(&mut h, &mut unit);
        assert!(
            h.local_transform(child)
                .translation
                .abs_diff_eq(DVec3::new(2.0, 0.0, 0.0), EPS)
        );

        // At or below the minimum nothing happens.
        let before = h.local_transform(child);
        unit.weight = 0.25;
        run(&mut h, &mut unit);
        assert_eq!(h.local_transform(child), before);
    }

    #[test]
    fn unresolved_entries_are_skipped() {
        let (mut h, root, child, _tip) = rig();
        let mut unit = ModifyBoneTransforms::new(vec![
            ModifyBoneTarget::new("Ghost", Transform::from_translation(9.0, 9.0, 9.0)),
            ModifyBoneTarget::new("Child", Transform::from_translation(0.0, 2.0, 0.0)),
        ])
        .with_mode(ModifyBoneMode::OverrideLocal);
        let root_before = h.local_transform(root);
        run(&mut h, &mut unit);
        assert_eq!(h.local_transform(root), root_before);
        assert_eq!(
            h.local_transform(child),
            Transform::from_translation(0.0, 2.0, 0.0)
        );
        assert_eq!(unit.cached_bones.len(), 2);
        assert!(!unit.cached_bones.get(0).unwrap().is_resolved());
    }

    #[test]
    fn entry_index_parsing() {
        assert_eq!(entry_index("BoneToModify[0].Transform"), Some(0));
        assert_eq!(entry_index("BoneToModify[12]"), Some(12));
        assert_eq!(entry_index("BoneToModify.3.Transform.Translation"), Some(3));
        assert_eq!(entry_index("BoneToModify.3"), Some(3));
        assert_eq!(entry_index("BoneToModify"), None);
        assert_eq!(entry_index("BoneToModify[]"), None);
        assert_eq!(entry_index("BoneToModify[x].Transform"), None);
        assert_eq!(entry_index("BoneToModify[1.Transform"), None);
        assert_eq!(entry_index("BoneToModify.x"), None);
        assert_eq!(entry_index("Weight"), None);
    }

    #[test]
    fn entry_index_ignores_surrounding_whitespace() {
        assert_eq!(entry_index("  BoneToModify[4].Transform\n"), Some(4));
        assert_eq!(entry_index("BoneToModify[ 2 ].Transform"), Some(2));
        assert_eq!(entry_index("\tBoneToModify.1 "), Some(1));
        assert_eq!(entry_index("BoneToModify[ ]"), None);
        assert_eq!(entry_index("BoneToModify. 1"), None);
    }

    #[test]
    fn advice_depends_on_mode() {
        let (h, ..) = rig();
        let targets = vec![
            ModifyBoneTarget::new("Tip", Transform::IDENTITY),
            ModifyBoneTarget::new("Root", Transform::IDENTITY),
        ];
        let additive = ModifyBoneTransforms::new(targets.clone());
        assert_eq!(
            additive.advise_space("BoneToModify[0].Transform", &h).as_deref(),
            Some("Tip")
        );
        assert_eq!(additive.advise_space("BoneToModify[5].Transform", &h), None);
        assert_eq!(additive.advise_space("Garbage", &h), None);

        let overriding = ModifyBoneTransforms::new(targets.clone()).with_mode(ModifyBoneMode::OverrideLocal);
        assert_eq!(
            overriding.advise_space("BoneToModify.0.Transform", &h).as_deref(),
            Some("Child")
        );
        // Roots have no parent to advise.
        assert_eq!(overriding.advise_space("BoneToModify[1].Transform", &h), None);

        let global = ModifyBoneTransforms::new(targets).with_mode(ModifyBoneMode::OverrideGlobal);
        assert_eq!(global.advise_space("BoneToModify[0].Transform", &h), None);
    }
}
