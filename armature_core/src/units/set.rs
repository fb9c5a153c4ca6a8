// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-target setters.
//!
//! Each setter resolves one element by name and writes one value in local or
//! global space, blended against the element's current value in that space.
//! The weight is clamped to `[0, 1]`; a weight of zero (or an unresolved
//! name) leaves the hierarchy untouched.

use alloc::string::String;

use glam::{DQuat, DVec3};

use crate::hierarchy::{ControlValue, Hierarchy};
use crate::schema::{FieldDescriptor, FieldKind, UnitDescriptor};
use crate::trace::WriteKind;
use crate::transform::Transform;

use super::blend::{WeightRange, blend_transform, blend_value};
use super::cache::CachedIndex;
use super::context::ExecuteContext;
use super::{Describe, Evaluable, Space, SpaceAdvisory, label};

const WEIGHT: FieldDescriptor =
    FieldDescriptor::input("Weight", FieldKind::Float, "1.0").ui_range(0.0, 1.0);
const PROPAGATE: FieldDescriptor =
    FieldDescriptor::input("PropagateToChildren", FieldKind::Bool, "false").constant();
const SPACE: FieldDescriptor = FieldDescriptor::input("Space", FieldKind::Space, "LocalSpace");

/// Reads the element's transform in `space`, lets `compute` produce the
/// blended result, and writes it back.
fn write_in_space(
    ctx: &mut ExecuteContext<'_>,
    unit: &'static str,
    idx: u32,
    space: Space,
    t: f64,
    propagate: bool,
    compute: impl FnOnce(Transform) -> Transform,
) {
    let h = &mut *ctx.hierarchy;
    let (prev, kind) = match space {
        Space::Local => (h.local_transform_at(idx), WriteKind::Local),
        Space::Global => (h.global_transform_at(idx), WriteKind::Global),
    };
    let Some(prev) = prev else {
        return;
    };
    let next = compute(prev);
    let visited = match space {
        Space::Local => h.set_local_transform_at(idx, next, propagate),
        Space::Global => h.set_global_transform_at(idx, next, propagate),
    };
    if let Some(descendants) = visited {
        ctx.record_write(unit, idx, kind, t, propagate, descendants);
    }
}

/// Advises the parent of `bone` for pins under `value_pin` in local space.
fn advise_parent(
    pin_path: &str,
    value_pin: &str,
    space: Space,
    bone: &str,
    hierarchy: &Hierarchy,
) -> Option<String> {
    if space != Space::Local || !pin_path.starts_with(value_pin) {
        return None;
    }
    hierarchy
        .parent_name_at(hierarchy.index_of(bone))
        .map(String::from)
}

// ---------------------------------------------------------------------------
// SetBoneTransform
// ---------------------------------------------------------------------------

/// Sets the full transform of one element.
#[derive(Clone, Debug, PartialEq)]
pub struct SetBoneTransform {
    /// Name of the element to write.
    pub bone: String,
    /// The transform to set.
    pub transform: Transform,
    /// Whether `transform` is local or global.
    pub space: Space,
    /// How much of the change to apply, clamped to `[0, 1]`.
    pub weight: f64,
    /// Re-derive descendant global transforms after the write.
    pub propagate_to_children: bool,
    /// Memoized slot of `bone`.
    pub cached_bone: CachedIndex,
}

impl Default for SetBoneTransform {
    fn default() -> Self {
        Self::new("", Transform::IDENTITY)
    }
}

impl SetBoneTransform {
    /// Creates a local-space setter with full weight and no propagation.
    #[must_use]
    pub fn new(bone: impl Into<String>, transform: Transform) -> Self {
        Self {
            bone: bone.into(),
            transform,
            space: Space::Local,
            weight: 1.0,
            propagate_to_children: false,
            cached_bone: CachedIndex::new(),
        }
    }
}

static SET_BONE_TRANSFORM: UnitDescriptor = UnitDescriptor {
    name: "SetBoneTransform",
    display_name: "Set Transform",
    category: "Hierarchy",
    keywords: &["SetBoneTransform"],
    fields: &[
        FieldDescriptor::input("Bone", FieldKind::Name, "").constant(),
        FieldDescriptor::input("Transform", FieldKind::Transform, "identity"),
        SPACE,
        WEIGHT,
        PROPAGATE,
    ],
};

impl Evaluable for SetBoneTransform {
    fn evaluate(&mut self, ctx: &mut ExecuteContext<'_>) {
        let unit = SET_BONE_TRANSFORM.name;
        let Some(idx) = ctx.resolve(&mut self.cached_bone, &self.bone, unit) else {
            return;
        };
        let Some(t) = WeightRange::UNIT.factor(self.weight) else {
            return;
        };
        let value = self.transform;
        write_in_space(ctx, unit, idx, self.space, t, self.propagate_to_children, |prev| {
            blend_transform(&prev, value, t)
        });
    }
}

impl SpaceAdvisory for SetBoneTransform {
    fn advise_space(&self, pin_path: &str, hierarchy: &Hierarchy) -> Option<String> {
        advise_parent(pin_path, "Transform", self.space, &self.bone, hierarchy)
    }
}

impl Describe for SetBoneTransform {
    fn descriptor() -> &'static UnitDescriptor {
        &SET_BONE_TRANSFORM
    }

    fn unit_label(&self) -> String {
        label(SET_BONE_TRANSFORM.display_name, &self.bone)
    }
}

// ---------------------------------------------------------------------------
// SetBoneTranslation
// ---------------------------------------------------------------------------

/// Sets the translation of one element, keeping its rotation and scale in
/// the chosen space.
#[derive(Clone, Debug, PartialEq)]
pub struct SetBoneTranslation {
    /// Name of the element to write.
    pub bone: String,
    /// The translation to set.
    pub translation: DVec3,
    /// Whether `translation` is local or global.
    pub space: Space,
    /// How much of the change to apply, clamped to `[0, 1]`.
    pub weight: f64,
    /// Re-derive descendant global transforms after the write.
    pub propagate_to_children: bool,
    /// Memoized slot of `bone`.
    pub cached_bone: CachedIndex,
}

impl Default for SetBoneTranslation {
    fn default() -> Self {
        Self::new("", DVec3::ZERO)
    }
}

impl SetBoneTranslation {
    /// Creates a local-space setter with full weight and no propagation.
    #[must_use]
    pub fn new(bone: impl Into<String>, translation: DVec3) -> Self {
        Self {
            bone: bone.into(),
            translation,
            space: Space::Local,
            weight: 1.0,
            propagate_to_children: false,
            cached_bone: CachedIndex::new(),
        }
    }
}

static SET_BONE_TRANSLATION: UnitDescriptor = UnitDescriptor {
    name: "SetBoneTranslation",
    display_name: "Set Translation",
    category: "Hierarchy",
    keywords: &[
        "SetBoneTranslation",
        "SetPosition",
        "SetLocation",
        "SetBonePosition",
        "SetBoneLocation",
    ],
    fields: &[
        FieldDescriptor::input("Bone", FieldKind::Name, "").constant(),
        FieldDescriptor::input("Translation", FieldKind::Vector, "(0, 0, 0)"),
        SPACE,
        WEIGHT,
        PROPAGATE,
    ],
};

impl Evaluable for SetBoneTranslation {
    fn evaluate(&mut self, ctx: &mut ExecuteContext<'_>) {
        let unit = SET_BONE_TRANSLATION.name;
        let Some(idx) = ctx.resolve(&mut self.cached_bone, &self.bone, unit) else {
            return;
        };
        let Some(t) = WeightRange::UNIT.factor(self.weight) else {
            return;
        };
        let value = self.translation;
        write_in_space(ctx, unit, idx, self.space, t, self.propagate_to_children, |prev| {
            let translation = if t >= 1.0 {
                value
            } else {
                prev.translation.lerp(value, t)
            };
            prev.with_translation(translation)
        });
    }
}

impl SpaceAdvisory for SetBoneTranslation {
    fn advise_space(&self, pin_path: &str, hierarchy: &Hierarchy) -> Option<String> {
        advise_parent(pin_path, "Translation", self.space, &self.bone, hierarchy)
    }
}

impl Describe for SetBoneTranslation {
    fn descriptor() -> &'static UnitDescriptor {
        &SET_BONE_TRANSLATION
    }

    fn unit_label(&self) -> String {
        label(SET_BONE_TRANSLATION.display_name, &self.bone)
    }
}

// ---------------------------------------------------------------------------
// SetBoneRotation
// ---------------------------------------------------------------------------

/// Sets the rotation of one element, keeping its translation and scale in
/// the chosen space.
#[derive(Clone, Debug, PartialEq)]
pub struct SetBoneRotation {
    /// Name of the element to write.
    pub bone: String,
    /// The rotation to set.
    pub rotation: DQuat,
    /// Whether `rotation` is local or global.
    pub space: Space,
    /// How much of the change to apply, clamped to `[0, 1]`.
    pub weight: f64,
    /// Re-derive descendant global transforms after the write.
    pub propagate_to_children: bool,
    /// Memoized slot of `bone`.
    pub cached_bone: CachedIndex,
}

impl Default for SetBoneRotation {
    fn default() -> Self {
        Self::new("", DQuat::IDENTITY)
    }
}

impl SetBoneRotation {
    /// Creates a local-space setter with full weight and no propagation.
    #[must_use]
    pub fn new(bone: impl Into<String>, rotation: DQuat) -> Self {
        Self {
            bone: bone.into(),
            rotation,
            space: Space::Local,
            weight: 1.0,
            propagate_to_children: false,
            cached_bone: CachedIndex::new(),
        }
    }
}

static SET_BONE_ROTATION: UnitDescriptor = UnitDescriptor {
    name: "SetBoneRotation",
    display_name: "Set Rotation",
    category: "Hierarchy",
    keywords: &["SetBoneRotation", "SetBoneOrientation", "SetOrientation"],
    fields: &[
        FieldDescriptor::input("Bone", FieldKind::Name, "").constant(),
        FieldDescriptor::input("Rotation", FieldKind::Quat, "identity"),
        SPACE,
        WEIGHT,
        PROPAGATE,
    ],
};

impl Evaluable for SetBoneRotation {
    fn evaluate(&mut self, ctx: &mut ExecuteContext<'_>) {
        let unit = SET_BONE_ROTATION.name;
        let Some(idx) = ctx.resolve(&mut self.cached_bone, &self.bone, unit) else {
            return;
        };
        let Some(t) = WeightRange::UNIT.factor(self.weight) else {
            return;
        };
        let value = self.rotation;
        write_in_space(ctx, unit, idx, self.space, t, self.propagate_to_children, |prev| {
            let rotation = if t >= 1.0 {
                value
            } else {
                prev.rotation.lerp(value, t)
            };
            prev.with_rotation(rotation)
        });
    }
}

impl SpaceAdvisory for SetBoneRotation {
    fn advise_space(&self, pin_path: &str, hierarchy: &Hierarchy) -> Option<String> {
        advise_parent(pin_path, "Rotation", self.space, &self.bone, hierarchy)
    }
}

impl Describe for SetBoneRotation {
    fn descriptor() -> &'static UnitDescriptor {
        &SET_BONE_ROTATION
    }

    fn unit_label(&self) -> String {
        label(SET_BONE_ROTATION.display_name, &self.bone)
    }
}

// ---------------------------------------------------------------------------
// SetBoneScale
// ---------------------------------------------------------------------------

/// Sets the scale of one element, keeping its translation and rotation in
/// the chosen space.
#[derive(Clone, Debug, PartialEq)]
pub struct SetBoneScale {
    /// Name of the element to write.
    pub bone: String,
    /// The per-axis scale to set.
    pub scale: DVec3,
    /// Whether `scale` is local or global.
    pub space: Space,
    /// How much of the change to apply, clamped to `[0, 1]`.
    pub weight: f64,
    /// Re-derive descendant global transforms after the write.
    pub propagate_to_children: bool,
    /// Memoized slot of `bone`.
    pub cached_bone: CachedIndex,
}

impl Default for SetBoneScale {
    fn default() -> Self {
        Self::new("", DVec3::ONE)
    }
}

impl SetBoneScale {
    /// Creates a local-space setter with full weight and no propagation.
    #[must_use]
    pub fn new(bone: impl Into<String>, scale: DVec3) -> Self {
        Self {
            bone: bone.into(),
            scale,
            space: Space::Local,
            weight: 1.0,
            propagate_to_children: false,
            cached_bone: CachedIndex::new(),
        }
    }
}

static SET_BONE_SCALE: UnitDescriptor = UnitDescriptor {
    name: "SetBoneScale",
    display_name: "Set Scale",
    category: "Hierarchy",
    keywords: &["SetBoneScale", "SetScale"],
    fields: &[
        FieldDescriptor::input("Bone", FieldKind::Name, "").constant(),
        FieldDescriptor::input("Scale", FieldKind::Vector, "(1, 1, 1)"),
        SPACE,
        WEIGHT,
        PROPAGATE,
    ],
};

impl Evaluable for SetBoneScale {
    fn evaluate(&mut self, ctx: &mut ExecuteContext<'_>) {
        let unit = SET_BONE_SCALE.name;
        let Some(idx) = ctx.resolve(&mut self.cached_bone, &self.bone, unit) else {
            return;
        };
        let Some(t) = WeightRange::UNIT.factor(self.weight) else {
            return;
        };
        let value = self.scale;
        write_in_space(ctx, unit, idx, self.space, t, self.propagate_to_children, |prev| {
            let scale = if t >= 1.0 {
                value
            } else {
                prev.scale.lerp(value, t)
            };
            prev.with_scale(scale)
        });
    }
}

impl SpaceAdvisory for SetBoneScale {
    fn advise_space(&self, pin_path: &str, hierarchy: &Hierarchy) -> Option<String> {
        advise_parent(pin_path, "Scale", self.space, &self.bone, hierarchy)
    }
}

impl Describe for SetBoneScale {
    fn descriptor() -> &'static UnitDescriptor {
        &SET_BONE_SCALE
    }

    fn unit_label(&self) -> String {
        label(SET_BONE_SCALE.display_name, &self.bone)
    }
}

// ---------------------------------------------------------------------------
// SetControlValue
// ---------------------------------------------------------------------------

/// Sets the typed value of one control.
///
/// Spatial values are authored in the control's parent space and move the
/// control. Booleans switch once the weight reaches one half. A value whose
/// type differs from the control's, or a target that is a bone, is ignored.
#[derive(Clone, Debug, PartialEq)]
pub struct SetControlValue {
    /// Name of the control to write.
    pub control: String,
    /// The value to set.
    pub value: ControlValue,
    /// How much of the change to apply, clamped to `[0, 1]`.
    pub weight: f64,
    /// Re-derive descendant global transforms after a spatial write.
    pub propagate_to_children: bool,
    /// Memoized slot of `control`.
    pub cached_control: CachedIndex,
}

impl Default for SetControlValue {
    fn default() -> Self {
        Self::new("", ControlValue::Float(0.0))
    }
}

impl SetControlValue {
    /// Creates a setter with full weight and no propagation.
    #[must_use]
    pub fn new(control: impl Into<String>, value: ControlValue) -> Self {
        Self {
            control: control.into(),
            value,
            weight: 1.0,
            propagate_to_children: false,
            cached_control: CachedIndex::new(),
        }
    }
}

static SET_CONTROL_VALUE: UnitDescriptor = UnitDescriptor {
    name: "SetControlValue",
    display_name: "Set Control Value",
    category: "Controls",
    keywords: &[
        "SetControlValue",
        "SetControlBool",
        "SetControlFloat",
        "SetControlVector",
        "SetControlRotator",
        "SetControlTransform",
    ],
    fields: &[
        FieldDescriptor::input("Control", FieldKind::Name, "").constant(),
        FieldDescriptor::input("Value", FieldKind::ControlValue, "0.0"),
        WEIGHT,
        PROPAGATE,
    ],
};

impl Evaluable for SetControlValue {
    fn evaluate(&mut self, ctx: &mut ExecuteContext<'_>) {
        let unit = SET_CONTROL_VALUE.name;
        let Some(idx) = ctx.resolve(&mut self.cached_control, &self.control, unit) else {
            return;
        };
        let Some(t) = WeightRange::UNIT.factor(self.weight) else {
            return;
        };
        let Some(prev) = ctx.hierarchy.control_at(idx).map(|c| c.value) else {
            return;
        };
        if prev.control_type() != self.value.control_type() {
            return;
        }
        let next = blend_value(prev, self.value, t);
        let propagate = self.propagate_to_children;
        if let Some(descendants) = ctx.hierarchy.set_control_value_at(idx, next, propagate) {
            let propagated = propagate && self.value.control_type().is_spatial();
            ctx.record_write(unit, idx, WriteKind::Value, t, propagated, descendants);
        }
    }
}

impl SpaceAdvisory for SetControlValue {
    fn advise_space(&self, pin_path: &str, hierarchy: &Hierarchy) -> Option<String> {
        if !self.value.control_type().is_spatial() {
            return None;
        }
        advise_parent(pin_path, "Value", Space::Local, &self.control, hierarchy)
    }
}

impl Describe for SetControlValue {
    fn descriptor() -> &'static UnitDescriptor {
        &SET_CONTROL_VALUE
    }

    fn unit_label(&self) -> String {
        label(SET_CONTROL_VALUE.display_name, &self.control)
    }
}

#[cfg(test)]
mod tests {
    use glam::EulerRot;
    use kurbo::Vec2;

    use crate::hierarchy::{ControlSettings, ElementId};
    use crate::transform::Rotator;

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

    fn run(h: &mut Hierarchy, unit: &mut impl Evaluable) {
        unit.evaluate(&mut ExecuteContext::new(h, 0));
    }

    #[test]
    fn root_write_propagates_to_child() {
        let (mut h, root, child, _tip) = rig();
        let mut unit = SetBoneTransform::new("Root", Transform::from_translation(0.0, 5.0, 0.0));
        unit.propagate_to_children = true;
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
    fn full_weight_local_write_is_exact() {
        let (mut h, _root, child, _tip) = rig();
        let xf = Transform::new(
            DVec3::new(0.3, 0.1, -2.0),
            DQuat::from_euler(EulerRot::ZYX, 0.4, 0.2, -0.1),
            DVec3::new(1.0, 2.0, 0.5),
        );
        run(&mut h, &mut SetBoneTransform::new("Child", xf));
        assert_eq!(h.local_transform(child), xf);
    }

    #[test]
    fn zero_weight_leaves_hierarchy_untouched() {
        let (mut h, _root, child, tip) = rig();
        let before = (
            h.local_transform(child),
            h.global_transform(child),
            h.global_transform(tip),
        );
        let mut unit = SetBoneTransform::new("Child", Transform::from_translation(9.0, 9.0, 9.0));
        unit.weight = 0.0;
        unit.propagate_to_children = true;
        run(&mut h, &mut unit);
        assert_eq!(
            before,
            (
                h.local_transform(child),
                h.global_transform(child),
                h.global_transform(tip)
            )
        );
    }

    #[test]
    fn partial_weight_blends_in_space() {
        let (mut h, _root, child, _tip) = rig();
        let mut unit = SetBoneTranslation::new("Child", DVec3::new(3.0, 0.0, 0.0));
        unit.weight = 0.5;
        run(&mut h, &mut unit);
        assert!(
            h.local_transform(child)
                .translation
                .abs_diff_eq(DVec3::new(2.0, 0.0, 0.0), EPS)
        );
    }

    #[test]
    fn half_weight_global_transform_under_rotated_scaled_root() {
        use core::f64::consts::{FRAC_PI_2, FRAC_PI_4};

        let (mut h, root, child, tip) = rig();
        h.set_local_transform_at(
            root.index(),
            Transform::new(
                DVec3::ZERO,
                DQuat::from_rotation_z(FRAC_PI_2),
                DVec3::splat(2.0),
            ),
            true,
        );
        // Child global: translation (0, 2, 0), rotation Z90, scale 2.
        let tip_global = h.global_transform(tip);

        let mut unit = SetBoneTransform::new(
            "Child",
            Transform::new(DVec3::new(4.0, 2.0, 0.0), DQuat::IDENTITY, DVec3::splat(2.0)),
        );
        unit.space = Space::Global;
        unit.weight = 0.5;
        run(&mut h, &mut unit);

        let global = h.global_transform(child);
        assert!(global.translation.abs_diff_eq(DVec3::new(2.0, 2.0, 0.0), EPS));
        assert!(
            global
                .rotation
                .abs_diff_eq(DQuat::from_rotation_z(FRAC_PI_4), EPS)
        );
        assert!(global.scale.abs_diff_eq(DVec3::splat(2.0), EPS));

        // Stored relative to the root: undo Z90, then halve.
        let local = h.local_transform(child);
        assert!(local.translation.abs_diff_eq(DVec3::new(1.0, -1.0, 0.0), EPS));
        assert!(
            local
                .rotation
                .abs_diff_eq(DQuat::from_rotation_z(-FRAC_PI_4), EPS)
        );
        assert!(local.scale.abs_diff_eq(DVec3::ONE, EPS));

        assert!(h.global_transform(tip).abs_diff_eq(&tip_global, EPS));
    }

    #[test]
    fn half_weight_global_rotation_under_rotated_scaled_root() {
        use core::f64::consts::FRAC_PI_2;

        let (mut h, root, child, _tip) = rig();
        h.set_local_transform_at(
            root.index(),
            Transform::new(
                DVec3::ZERO,
                DQuat::from_rotation_x(FRAC_PI_2),
                DVec3::splat(3.0),
            ),
            true,
        );
        // Child global: translation (3, 0, 0), rotation X90, scale 3.
        let mut unit = SetBoneRotation::new("Child", DQuat::from_rotation_x(-FRAC_PI_2));
        unit.space = Space::Global;
        unit.weight = 0.5;
        run(&mut h, &mut unit);

        // Halfway between X90 and X-90 is no rotation at all.
        let global = h.global_transform(child);
        assert!(global.rotation.abs_diff_eq(DQuat::IDENTITY, EPS));
        assert!(global.translation.abs_diff_eq(DVec3::new(3.0, 0.0, 0.0), EPS));

        let local = h.local_transform(child);
        assert!(
            local
                .rotation
                .abs_diff_eq(DQuat::from_rotation_x(-FRAC_PI_2), EPS)
        );
        assert!(local.translation.abs_diff_eq(DVec3::new(1.0, 0.0, 0.0), EPS));
        assert!(local.scale.abs_diff_eq(DVec3::ONE, EPS));
    }

    #[test]
    fn weight_above_one_is_clamped() {
        let (mut h, _root, child, _tip) = rig();
        let mut unit = SetBoneTranslation::new("Child", DVec3::new(3.0, 0.0, 0.0));
        unit.weight = 4.0;
        run(&mut h, &mut unit);
        assert_eq!(
            h.local_transform(child).translation,
            DVec3::new(3.0, 0.0, 0.0)
        );
    }

    #[test]
    fn global_translation_keeps_global_rotation() {
        let (mut h, root, child, _tip) = rig();
        h.set_local_transform_at(
            root.index(),
            Transform::from_rotation(DQuat::from_rotation_z(core::f64::consts::FRAC_PI_2)),
            true,
        );
        let rotation_before = h.global_transform(child).rotation;

        let mut unit = SetBoneTranslation::new("Child", DVec3::new(0.0, 0.0, 4.0));
        unit.space = Space::Global;
        run(&mut h, &mut unit);

        let global = h.global_transform(child);
        assert!(global.translation.abs_diff_eq(DVec3::new(0.0, 0.0, 4.0), EPS));
        assert!(global.rotation.abs_diff_eq(rotation_before, EPS));
        let recomposed = h.global_transform(root) * h.local_transform(child);
        assert!(recomposed.abs_diff_eq(&global, EPS));
    }

    #[test]
    fn rotation_and_scale_replace_one_component() {
        let (mut h, _root, child, _tip) = rig();
        let q = DQuat::from_rotation_y(0.3);
        run(&mut h, &mut SetBoneRotation::new("Child", q));
        run(&mut h, &mut SetBoneScale::new("Child", DVec3::splat(2.0)));
        let local = h.local_transform(child);
        assert_eq!(local.translation, DVec3::new(1.0, 0.0, 0.0));
        assert_eq!(local.rotation, q);
        assert_eq!(local.scale, DVec3::splat(2.0));
    }

    #[test]
    fn without_propagation_grandchild_keeps_global() {
        let (mut h, _root, child, tip) = rig();
        let tip_global = h.global_transform(tip);
        run(
            &mut h,
            &mut SetBoneTranslation::new("Child", DVec3::new(0.0, 7.0, 0.0)),
        );
        assert!(h.global_transform(tip).abs_diff_eq(&tip_global, EPS));
        let recomposed = h.global_transform(child) * h.local_transform(tip);
        assert!(recomposed.abs_diff_eq(&tip_global, EPS));
    }

    #[test]
    fn unresolved_bone_is_noop() {
        let (mut h, root, child, tip) = rig();
        let before: alloc::vec::Vec<_> = [root, child, tip]
            .iter()
            .map(|&id| (h.local_transform(id), h.global_transform(id)))
            .collect();
        let mut unit = SetBoneTransform::new("Missing", Transform::from_translation(1.0, 1.0, 1.0));
        unit.propagate_to_children = true;
        run(&mut h, &mut unit);
        let after: alloc::vec::Vec<_> = [root, child, tip]
            .iter()
            .map(|&id| (h.local_transform(id), h.global_transform(id)))
            .collect();
        assert_eq!(before, after);
        assert!(!unit.cached_bone.is_resolved());
    }

    #[test]
    fn control_values_blend_and_move_controls() {
        let (mut h, root, _child, _tip) = rig();
        let float = h
            .create_control("gain", ControlSettings::new(ControlValue::Float(0.0)))
            .unwrap();
        let flag = h
            .create_control("flag", ControlSettings::new(ControlValue::Bool(false)))
            .unwrap();
        let pad = h
            .create_control(
                "pad",
                ControlSettings::new(ControlValue::Vector2D(Vec2::ZERO)),
            )
            .unwrap();
        let aim = h
            .create_control("aim", ControlSettings::new(ControlValue::Vector(DVec3::ZERO)))
            .unwrap();
        h.add_child(root, aim);
        let _ = h.evaluate();
        h.set_local_transform_at(root.index(), Transform::from_translation(0.0, 0.0, 10.0), true);

        let mut unit = SetControlValue::new("gain", ControlValue::Float(2.0));
        unit.weight = 0.25;
        run(&mut h, &mut unit);
        assert_eq!(h.control(float).unwrap().value, ControlValue::Float(0.5));

        let mut unit = SetControlValue::new("flag", ControlValue::Bool(true));
        unit.weight = 0.4;
        run(&mut h, &mut unit);
        assert_eq!(h.control(flag).unwrap().value, ControlValue::Bool(false));
        unit.weight = 0.6;
        run(&mut h, &mut unit);
        assert_eq!(h.control(flag).unwrap().value, ControlValue::Bool(true));

        run(
            &mut h,
            &mut SetControlValue::new("pad", ControlValue::Vector2D(Vec2::new(1.0, -1.0))),
        );
        assert_eq!(
            h.control(pad).unwrap().value,
            ControlValue::Vector2D(Vec2::new(1.0, -1.0))
        );

        run(
            &mut h,
            &mut SetControlValue::new("aim", ControlValue::Vector(DVec3::X)),
        );
        assert!(
            h.global_transform(aim)
                .translation
                .abs_diff_eq(DVec3::new(1.0, 0.0, 10.0), EPS)
        );
    }

    #[test]
    fn control_value_type_mismatch_or_bone_is_ignored() {
        let (mut h, root, _child, _tip) = rig();
        let gain = h
            .create_control("gain", ControlSettings::new(ControlValue::Float(0.5)))
            .unwrap();
        run(
            &mut h,
            &mut SetControlValue::new("gain", ControlValue::Rotator(Rotator::new(0.0, 90.0, 0.0))),
        );
        assert_eq!(h.control(gain).unwrap().value, ControlValue::Float(0.5));

        let before = h.local_transform(root);
        run(
            &mut h,
            &mut SetControlValue::new("Root", ControlValue::Vector(DVec3::ONE)),
        );
        assert_eq!(h.local_transform(root), before);
    }

    #[test]
    fn local_space_advises_parent() {
        let (h, ..) = rig();
        let unit = SetBoneTranslation::new("Tip", DVec3::ZERO);
        assert_eq!(
            unit.advise_space("Translation", &h).as_deref(),
            Some("Child")
        );
        assert_eq!(
            unit.advise_space("Translation.X", &h).as_deref(),
            Some("Child")
        );
        assert_eq!(unit.advise_space("Weight", &h), None);

        let mut global = unit.clone();
        global.space = Space::Global;
        assert_eq!(global.advise_space("Translation", &h), None);

        let root = SetBoneTransform::new("Root", Transform::IDENTITY);
        assert_eq!(root.advise_space("Transform", &h), None);
        let missing = SetBoneRotation::new("Missing", DQuat::IDENTITY);
        assert_eq!(missing.advise_space("Rotation", &h), None);
    }

    #[test]
    fn labels_include_target() {
        assert_eq!(
            SetBoneTranslation::new("hand_l", DVec3::ZERO).unit_label(),
            "Set Translation hand_l"
        );
        assert_eq!(SetBoneScale::default().unit_label(), "Set Scale");
        assert_eq!(
            SetBoneTransform::descriptor().field("Space").unwrap().default,
            "LocalSpace"
        );
    }
}
