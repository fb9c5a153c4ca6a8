// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Getters.
//!
//! Control getters output the control's value together with its declared
//! minimum and maximum. If the name does not resolve, or resolves to an
//! element that is not a control of the expected type, all three outputs are
//! the type's identity value. Getters never write to the hierarchy.

use alloc::string::String;

use glam::DVec3;
use kurbo::Vec2;

use crate::hierarchy::{ControlSettings, ControlType, ControlValue, Hierarchy};
use crate::schema::{FieldDescriptor, FieldKind, UnitDescriptor};
use crate::transform::{Rotator, Transform};

use super::cache::CachedIndex;
use super::context::ExecuteContext;
use super::{Describe, Evaluable, Space, label};

const CONTROL: FieldDescriptor = FieldDescriptor::input("Control", FieldKind::Name, "").constant();
const SPACE: FieldDescriptor = FieldDescriptor::input("Space", FieldKind::Space, "GlobalSpace");
const KEYWORDS: &[&str] = &["GetControlValue"];

/// Resolves `name` to a control of type `ty`.
fn find_control(
    ctx: &mut ExecuteContext<'_>,
    cache: &mut CachedIndex,
    name: &str,
    ty: ControlType,
    unit: &'static str,
) -> Option<(u32, ControlSettings)> {
    let idx = ctx.resolve(cache, name, unit)?;
    let settings = *ctx.hierarchy.control_at(idx)?;
    (settings.control_type() == ty).then_some((idx, settings))
}

/// Reads the transform at `idx` in `space`.
fn transform_in(hierarchy: &Hierarchy, idx: u32, space: Space) -> Transform {
    match space {
        Space::Local => hierarchy.local_transform_at(idx),
        Space::Global => hierarchy.global_transform_at(idx),
    }
    .unwrap_or(Transform::IDENTITY)
}

// ---------------------------------------------------------------------------
// GetControlBool
// ---------------------------------------------------------------------------

/// Reads a boolean control.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GetControlBool {
    /// Name of the control to read.
    pub control: String,
    /// Output: the control's value.
    pub value: bool,
    /// Memoized slot of `control`.
    pub cached_control: CachedIndex,
}

impl GetControlBool {
    /// Creates a getter for `control`.
    #[must_use]
    pub fn new(control: impl Into<String>) -> Self {
        Self {
            control: control.into(),
            ..Self::default()
        }
    }
}

static GET_CONTROL_BOOL: UnitDescriptor = UnitDescriptor {
    name: "GetControlBool",
    display_name: "Get Control Bool",
    category: "Controls",
    keywords: KEYWORDS,
    fields: &[
        CONTROL,
        FieldDescriptor::output("BoolValue", FieldKind::Bool, "false"),
    ],
};

impl Evaluable for GetControlBool {
    fn evaluate(&mut self, ctx: &mut ExecuteContext<'_>) {
        self.value = find_control(
            ctx,
            &mut self.cached_control,
            &self.control,
            ControlType::Bool,
            GET_CONTROL_BOOL.name,
        )
        .and_then(|(_, c)| c.value.as_bool())
        .unwrap_or(false);
    }
}

impl Describe for GetControlBool {
    fn descriptor() -> &'static UnitDescriptor {
        &GET_CONTROL_BOOL
    }

    fn unit_label(&self) -> String {
        label(GET_CONTROL_BOOL.display_name, &self.control)
    }
}

// ---------------------------------------------------------------------------
// GetControlFloat
// ---------------------------------------------------------------------------

/// Reads a scalar control and its declared range.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GetControlFloat {
    /// Name of the control to read.
    pub control: String,
    /// Output: the control's value.
    pub value: f64,
    /// Output: the declared minimum.
    pub minimum: f64,
    /// Output: the declared maximum.
    pub maximum: f64,
    /// Memoized slot of `control`.
    pub cached_control: CachedIndex,
}

impl GetControlFloat {
    /// Creates a getter for `control`.
    #[must_use]
    pub fn new(control: impl Into<String>) -> Self {
        Self {
            control: control.into(),
            ..Self::default()
        }
    }
}

static GET_CONTROL_FLOAT: UnitDescriptor = UnitDescriptor {
    name: "GetControlFloat",
    display_name: "Get Control Float",
    category: "Controls",
    keywords: KEYWORDS,
    fields: &[
        CONTROL,
        FieldDescriptor::output("FloatValue", FieldKind::Float, "0.0").ui_range(0.0, 1.0),
        FieldDescriptor::output("Minimum", FieldKind::Float, "0.0").ui_range(0.0, 1.0),
        FieldDescriptor::output("Maximum", FieldKind::Float, "0.0").ui_range(0.0, 1.0),
    ],
};

impl Evaluable for GetControlFloat {
    fn evaluate(&mut self, ctx: &mut ExecuteContext<'_>) {
        let found = find_control(
            ctx,
            &mut self.cached_control,
            &self.control,
            ControlType::Float,
            GET_CONTROL_FLOAT.name,
        );
        let read = |v: ControlValue| v.as_float().unwrap_or(0.0);
        (self.value, self.minimum, self.maximum) = match found {
            Some((_, c)) => (read(c.value), read(c.minimum), read(c.maximum)),
            None => (0.0, 0.0, 0.0),
        };
    }
}

impl Describe for GetControlFloat {
    fn descriptor() -> &'static UnitDescriptor {
        &GET_CONTROL_FLOAT
    }

    fn unit_label(&self) -> String {
        label(GET_CONTROL_FLOAT.display_name, &self.control)
    }
}

// ---------------------------------------------------------------------------
// GetControlVector2D
// ---------------------------------------------------------------------------

/// Reads a planar vector control and its declared range.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GetControlVector2D {
    /// Name of the control to read.
    pub control: String,
    /// Output: the control's value.
    pub value: Vec2,
    /// Output: the declared minimum.
    pub minimum: Vec2,
    /// Output: the declared maximum.
    pub maximum: Vec2,
    /// Memoized slot of `control`.
    pub cached_control: CachedIndex,
}

impl GetControlVector2D {
    /// Creates a getter for `control`.
    #[must_use]
    pub fn new(control: impl Into<String>) -> Self {
        Self {
            control: control.into(),
            ..Self::default()
        }
    }
}

static GET_CONTROL_VECTOR2D: UnitDescriptor = UnitDescriptor {
    name: "GetControlVector2D",
    display_name: "Get Control Vector2D",
    category: "Controls",
    keywords: KEYWORDS,
    fields: &[
        CONTROL,
        FieldDescriptor::output("Vector", FieldKind::Vector2D, "(0, 0)"),
        FieldDescriptor::output("Minimum", FieldKind::Vector2D, "(0, 0)"),
        FieldDescriptor::output("Maximum", FieldKind::Vector2D, "(0, 0)"),
    ],
};

impl Evaluable for GetControlVector2D {
    fn evaluate(&mut self, ctx: &mut ExecuteContext<'_>) {
        let found = find_control(
            ctx,
            &mut self.cached_control,
            &self.control,
            ControlType::Vector2D,
            GET_CONTROL_VECTOR2D.name,
        );
        let read = |v: ControlValue| v.as_vector2d().unwrap_or(Vec2::ZERO);
        (self.value, self.minimum, self.maximum) = match found {
            Some((_, c)) => (read(c.value), read(c.minimum), read(c.maximum)),
            None => (Vec2::ZERO, Vec2::ZERO, Vec2::ZERO),
        };
    }
}

impl Describe for GetControlVector2D {
    fn descriptor() -> &'static UnitDescriptor {
        &GET_CONTROL_VECTOR2D
    }

    fn unit_label(&self) -> String {
        label(GET_CONTROL_VECTOR2D.display_name, &self.control)
    }
}

// ---------------------------------------------------------------------------
// GetControlVector
// ---------------------------------------------------------------------------

/// Reads the position of a vector control in local or global space, and its
/// declared range.
#[derive(Clone, Debug, PartialEq)]
pub struct GetControlVector {
    /// Name of the control to read.
    pub control: String,
    /// Space to read the position in.
    pub space: Space,
    /// Output: the control's position.
    pub value: DVec3,
    /// Output: the declared minimum.
    pub minimum: DVec3,
    /// Output: the declared maximum.
    pub maximum: DVec3,
    /// Memoized slot of `control`.
    pub cached_control: CachedIndex,
}

impl Default for GetControlVector {
    fn default() -> Self {
        Self::new("")
    }
}

impl GetControlVector {
    /// Creates a global-space getter for `control`.
    #[must_use]
    pub fn new(control: impl Into<String>) -> Self {
        Self {
            control: control.into(),
            space: Space::Global,
            value: DVec3::ZERO,
            minimum: DVec3::ZERO,
            maximum: DVec3::ZERO,
            cached_control: CachedIndex::new(),
        }
    }
}

static GET_CONTROL_VECTOR: UnitDescriptor = UnitDescriptor {
    name: "GetControlVector",
    display_name: "Get Control Vector",
    category: "Controls",
    keywords: KEYWORDS,
    fields: &[
        CONTROL,
        SPACE,
        FieldDescriptor::output("Vector", FieldKind::Vector, "(0, 0, 0)"),
        FieldDescriptor::output("Minimum", FieldKind::Vector, "(0, 0, 0)"),
        FieldDescriptor::output("Maximum", FieldKind::Vector, "(0, 0, 0)"),
    ],
};

impl Evaluable for GetControlVector {
    fn evaluate(&mut self, ctx: &mut ExecuteContext<'_>) {
        let found = find_control(
            ctx,
            &mut self.cached_control,
            &self.control,
            ControlType::Vector,
            GET_CONTROL_VECTOR.name,
        );
        let read = |v: ControlValue| v.as_vector().unwrap_or(DVec3::ZERO);
        (self.value, self.minimum, self.maximum) = match found {
            Some((idx, c)) => (
                transform_in(ctx.hierarchy, idx, self.space).translation,
                read(c.minimum),
                read(c.maximum),
            ),
            None => (DVec3::ZERO, DVec3::ZERO, DVec3::ZERO),
        };
    }
}

impl Describe for GetControlVector {
    fn descriptor() -> &'static UnitDescriptor {
        &GET_CONTROL_VECTOR
    }

    fn unit_label(&self) -> String {
        label(GET_CONTROL_VECTOR.display_name, &self.control)
    }
}

// ---------------------------------------------------------------------------
// GetControlRotator
// ---------------------------------------------------------------------------

/// Reads the rotation of a rotator control in local or global space, and its
/// declared range.
#[derive(Clone, Debug, PartialEq)]
pub struct GetControlRotator {
    /// Name of the control to read.
    pub control: String,
    /// Space to read the rotation in.
    pub space: Space,
    /// Output: the control's rotation.
    pub value: Rotator,
    /// Output: the declared minimum.
    pub minimum: Rotator,
    /// Output: the declared maximum.
    pub maximum: Rotator,
    /// Memoized slot of `control`.
    pub cached_control: CachedIndex,
}

impl Default for GetControlRotator {
    fn default() -> Self {
        Self::new("")
    }
}

impl GetControlRotator {
    /// Creates a global-space getter for `control`.
    #[must_use]
    pub fn new(control: impl Into<String>) -> Self {
        Self {
            control: control.into(),
            space: Space::Global,
            value: Rotator::ZERO,
            minimum: Rotator::ZERO,
            maximum: Rotator::ZERO,
            cached_control: CachedIndex::new(),
        }
    }
}

static GET_CONTROL_ROTATOR: UnitDescriptor = UnitDescriptor {
    name: "GetControlRotator",
    display_name: "Get Control Rotator",
    category: "Controls",
    keywords: KEYWORDS,
    fields: &[
        CONTROL,
        SPACE,
        FieldDescriptor::output("Rotator", FieldKind::Rotator, "(0, 0, 0)"),
        FieldDescriptor::output("Minimum", FieldKind::Rotator, "(0, 0, 0)"),
        FieldDescriptor::output("Maximum", FieldKind::Rotator, "(0, 0, 0)"),
    ],
};

impl Evaluable for GetControlRotator {
    fn evaluate(&mut self, ctx: &mut ExecuteContext<'_>) {
        let found = find_control(
            ctx,
            &mut self.cached_control,
            &self.control,
            ControlType::Rotator,
            GET_CONTROL_ROTATOR.name,
        );
        let read = |v: ControlValue| v.as_rotator().unwrap_or(Rotator::ZERO);
        (self.value, self.minimum, self.maximum) = match found {
            // The stored value is returned as authored in local space, so
            // angles outside the canonical Euler range survive a round trip.
            Some((_, c)) if self.space == Space::Local => {
                (read(c.value), read(c.minimum), read(c.maximum))
            }
            Some((idx, c)) => (
                Rotator::from_quat(transform_in(ctx.hierarchy, idx, self.space).rotation),
                read(c.minimum),
                read(c.maximum),
            ),
            None => (Rotator::ZERO, Rotator::ZERO, Rotator::ZERO),
        };
    }
}

impl Describe for GetControlRotator {
    fn descriptor() -> &'static UnitDescriptor {
        &GET_CONTROL_ROTATOR
    }

    fn unit_label(&self) -> String {
        label(GET_CONTROL_ROTATOR.display_name, &self.control)
    }
}

// ---------------------------------------------------------------------------
// GetControlTransform
// ---------------------------------------------------------------------------

/// Reads the transform of a transform control in local or global space, and
/// its declared range.
#[derive(Clone, Debug, PartialEq)]
pub struct GetControlTransform {
    /// Name of the control to read.
    pub control: String,
    /// Space to read the transform in.
    pub space: Space,
    /// Output: the control's transform.
    pub value: Transform,
    /// Output: the declared minimum.
    pub minimum: Transform,
    /// Output: the declared maximum.
    pub maximum: Transform,
    /// Memoized slot of `control`.
    pub cached_control: CachedIndex,
}

impl Default for GetControlTransform {
    fn default() -> Self {
        Self::new("")
    }
}

impl GetControlTransform {
    /// Creates a global-space getter for `control`.
    #[must_use]
    pub fn new(control: impl Into<String>) -> Self {
        Self {
            control: control.into(),
            space: Space::Global,
            value: Transform::IDENTITY,
            minimum: Transform::IDENTITY,
            maximum: Transform::IDENTITY,
            cached_control: CachedIndex::new(),
        }
    }
}

static GET_CONTROL_TRANSFORM: UnitDescriptor = UnitDescriptor {
    name: "GetControlTransform",
    display_name: "Get Control Transform",
    category: "Controls",
    keywords: KEYWORDS,
    fields: &[
        CONTROL,
        SPACE,
        FieldDescriptor::output("Transform", FieldKind::Transform, "identity"),
        FieldDescriptor::output("Minimum", FieldKind::Transform, "identity"),
        FieldDescriptor::output("Maximum", FieldKind::Transform, "identity"),
    ],
};

impl Evaluable for GetControlTransform {
    fn evaluate(&mut self, ctx: &mut ExecuteContext<'_>) {
        let found = find_control(
            ctx,
            &mut self.cached_control,
            &self.control,
            ControlType::Transform,
            GET_CONTROL_TRANSFORM.name,
        );
        let read = |v: ControlValue| v.as_transform().unwrap_or(Transform::IDENTITY);
        (self.value, self.minimum, self.maximum) = match found {
            Some((idx, c)) => (
                transform_in(ctx.hierarchy, idx, self.space),
                read(c.minimum),
                read(c.maximum),
            ),
            None => (
                Transform::IDENTITY,
                Transform::IDENTITY,
                Transform::IDENTITY,
            ),
        };
    }
}

impl Describe for GetControlTransform {
    fn descriptor() -> &'static UnitDescriptor {
        &GET_CONTROL_TRANSFORM
    }

    fn unit_label(&self) -> String {
        label(GET_CONTROL_TRANSFORM.display_name, &self.control)
    }
}

// ---------------------------------------------------------------------------
// GetBoneTransform
// ---------------------------------------------------------------------------

/// Reads the transform of any element in local or global space.
#[derive(Clone, Debug, PartialEq)]
pub struct GetBoneTransform {
    /// Name of the element to read.
    pub bone: String,
    /// Space to read the transform in.
    pub space: Space,
    /// Output: the element's transform.
    pub transform: Transform,
    /// Memoized slot of `bone`.
    pub cached_bone: CachedIndex,
}

impl Default for GetBoneTransform {
    fn default() -> Self {
        Self::new("")
    }
}

impl GetBoneTransform {
    /// Creates a global-space getter for `bone`.
    #[must_use]
    pub fn new(bone: impl Into<String>) -> Self {
        Self {
            bone: bone.into(),
            space: Space::Global,
            transform: Transform::IDENTITY,
            cached_bone: CachedIndex::new(),
        }
    }
}

static GET_BONE_TRANSFORM: UnitDescriptor = UnitDescriptor {
    name: "GetBoneTransform",
    display_name: "Get Transform",
    category: "Hierarchy",
    keywords: &["GetBoneTransform", "GetTransform"],
    fields: &[
        FieldDescriptor::input("Bone", FieldKind::Name, "").constant(),
        SPACE,
        FieldDescriptor::output("Transform", FieldKind::Transform, "identity"),
    ],
};

impl Evaluable for GetBoneTransform {
    fn evaluate(&mut self, ctx: &mut ExecuteContext<'_>) {
        self.transform = match ctx.resolve(&mut self.cached_bone, &self.bone, GET_BONE_TRANSFORM.name)
        {
            Some(idx) => transform_in(ctx.hierarchy, idx, self.space),
            None => Transform::IDENTITY,
        };
    }
}

impl Describe for GetBoneTransform {
    fn descriptor() -> &'static UnitDescriptor {
        &GET_BONE_TRANSFORM
    }

    fn unit_label(&self) -> String {
        label(GET_BONE_TRANSFORM.display_name, &self.bone)
    }
}
