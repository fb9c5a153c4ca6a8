// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed control values and their declared bounds.

use glam::DVec3;
use kurbo::Vec2;

use crate::transform::{Rotator, Transform};

/// The value type a control carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlType {
    /// A boolean toggle.
    Bool,
    /// A scalar.
    Float,
    /// A planar vector.
    Vector2D,
    /// A position; drives the control's translation.
    Vector,
    /// An Euler rotation; drives the control's rotation.
    Rotator,
    /// A full transform; drives the control's local transform.
    Transform,
}

impl ControlType {
    /// Returns whether values of this type live in the control's transform.
    #[inline]
    #[must_use]
    pub const fn is_spatial(self) -> bool {
        matches!(self, Self::Vector | Self::Rotator | Self::Transform)
    }
}

/// A typed control value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlValue {
    /// See [`ControlType::Bool`].
    Bool(bool),
    /// See [`ControlType::Float`].
    Float(f64),
    /// See [`ControlType::Vector2D`].
    Vector2D(Vec2),
    /// See [`ControlType::Vector`].
    Vector(DVec3),
    /// See [`ControlType::Rotator`].
    Rotator(Rotator),
    /// See [`ControlType::Transform`].
    Transform(Transform),
}

impl ControlValue {
    /// Returns the type of this value.
    #[must_use]
    pub const fn control_type(&self) -> ControlType {
        match self {
            Self::Bool(_) => ControlType::Bool,
            Self::Float(_) => ControlType::Float,
            Self::Vector2D(_) => ControlType::Vector2D,
            Self::Vector(_) => ControlType::Vector,
            Self::Rotator(_) => ControlType::Rotator,
            Self::Transform(_) => ControlType::Transform,
        }
    }

    /// Returns the identity value of the given type.
    #[must_use]
    pub const fn identity(ty: ControlType) -> Self {
        match ty {
            ControlType::Bool => Self::Bool(false),
            ControlType::Float => Self::Float(0.0),
            ControlType::Vector2D => Self::Vector2D(Vec2::ZERO),
            ControlType::Vector => Self::Vector(DVec3::ZERO),
            ControlType::Rotator => Self::Rotator(Rotator::ZERO),
            ControlType::Transform => Self::Transform(Transform::IDENTITY),
        }
    }

    /// Returns the boolean, if this is a [`Bool`](Self::Bool).
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the scalar, if this is a [`Float`](Self::Float).
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match *self {
            Self::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the planar vector, if this is a [`Vector2D`](Self::Vector2D).
    #[must_use]
    pub const fn as_vector2d(&self) -> Option<Vec2> {
        match *self {
            Self::Vector2D(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the position, if this is a [`Vector`](Self::Vector).
    #[must_use]
    pub const fn as_vector(&self) -> Option<DVec3> {
        match *self {
            Self::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the rotation, if this is a [`Rotator`](Self::Rotator).
    #[must_use]
    pub const fn as_rotator(&self) -> Option<Rotator> {
        match *self {
            Self::Rotator(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the transform, if this is a [`Transform`](Self::Transform).
    #[must_use]
    pub const fn as_transform(&self) -> Option<Transform> {
        match *self {
            Self::Transform(v) => Some(v),
            _ => None,
        }
    }

    /// Applies a spatial value onto `local`, returning the new local transform.
    ///
    /// Non-spatial values leave `local` unchanged.
    #[must_use]
    pub fn apply_to(&self, local: Transform) -> Transform {
        match *self {
            Self::Vector(v) => local.with_translation(v),
            Self::Rotator(r) => local.with_rotation(r.to_quat()),
            Self::Transform(t) => t,
            Self::Bool(_) | Self::Float(_) | Self::Vector2D(_) => local,
        }
    }

    /// Re-reads a spatial value of the same type from `local`.
    ///
    /// Non-spatial values are returned unchanged.
    #[must_use]
    pub fn read_from(&self, local: &Transform) -> Self {
        match *self {
            Self::Vector(_) => Self::Vector(local.translation),
            Self::Rotator(_) => Self::Rotator(Rotator::from_quat(local.rotation)),
            Self::Transform(_) => Self::Transform(*local),
            other => other,
        }
    }
}

/// Value and declared bounds of a control element.
///
/// The bounds are metadata for consumers that need range context. They are
/// never enforced on write.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlSettings {
    /// The current value.
    pub value: ControlValue,
    /// Declared minimum.
    pub minimum: ControlValue,
    /// Declared maximum.
    pub maximum: ControlValue,
}

impl ControlSettings {
    /// Creates settings with identity bounds of the value's type.
    #[must_use]
    pub const fn new(value: ControlValue) -> Self {
        let ty = value.control_type();
        Self {
            value,
            minimum: ControlValue::identity(ty),
            maximum: ControlValue::identity(ty),
        }
    }

    /// Sets the declared bounds.
    ///
    /// Bounds whose type differs from the value's type are ignored.
    #[must_use]
    pub fn with_limits(mut self, minimum: ControlValue, maximum: ControlValue) -> Self {
        let ty = self.value.control_type();
        if minimum.control_type() == ty && maximum.control_type() == ty {
            self.minimum = minimum;
            self.maximum = maximum;
        }
        self
    }

    /// Returns the type of the control.
    #[inline]
    #[must_use]
    pub const fn control_type(&self) -> ControlType {
        self.value.control_type()
    }
}
