// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Translation/rotation/scale transform and Euler rotator.
//!
//! [`Transform`] is the value stored per hierarchy element. Composition
//! follows the column-vector convention used throughout the crate:
//! `a * b` applies `b` first, then `a`, so a global transform is always
//! `parent_global * local`.

use core::ops::Mul;

use glam::{DMat4, DQuat, DVec3, EulerRot};

/// Scale components with a magnitude below this are treated as zero when
/// taking reciprocals.
const SCALE_EPSILON: f64 = 1e-8;

/// A decomposed affine transform: scale, then rotate, then translate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Translation component.
    pub translation: DVec3,
    /// Rotation component. Expected to be normalized.
    pub rotation: DQuat,
    /// Per-axis scale component.
    pub scale: DVec3,
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        translation: DVec3::ZERO,
        rotation: DQuat::IDENTITY,
        scale: DVec3::ONE,
    };

    /// Creates a transform from its three components.
    #[inline]
    #[must_use]
    pub const fn new(translation: DVec3, rotation: DQuat, scale: DVec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Creates a pure translation.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            translation: DVec3::new(x, y, z),
            rotation: DQuat::IDENTITY,
            scale: DVec3::ONE,
        }
    }

    /// Creates a pure rotation.
    #[inline]
    #[must_use]
    pub const fn from_rotation(rotation: DQuat) -> Self {
        Self {
            translation: DVec3::ZERO,
            rotation,
            scale: DVec3::ONE,
        }
    }

    /// Creates a pure (possibly non-uniform) scale.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            translation: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
            scale: DVec3::new(sx, sy, sz),
        }
    }

    /// Returns this transform with the translation replaced.
    #[inline]
    #[must_use]
    pub const fn with_translation(mut self, translation: DVec3) -> Self {
        self.translation = translation;
        self
    }

    /// Returns this transform with the rotation replaced.
    #[inline]
    #[must_use]
    pub const fn with_rotation(mut self, rotation: DQuat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Returns this transform with the scale replaced.
    #[inline]
    #[must_use]
    pub const fn with_scale(mut self, scale: DVec3) -> Self {
        self.scale = scale;
        self
    }

    /// Expresses `self` relative to `parent`.
    ///
    /// This is the inverse of composition: `parent * self.relative_to(parent)`
    /// reproduces `self` up to floating-point error. Zero scale components on
    /// `parent` collapse the corresponding axis to zero instead of producing
    /// infinities.
    #[must_use]
    pub fn relative_to(&self, parent: &Self) -> Self {
        let inv_rotation = parent.rotation.inverse();
        let inv_scale = safe_recip(parent.scale);
        Self {
            translation: (inv_rotation * (self.translation - parent.translation)) * inv_scale,
            rotation: (inv_rotation * self.rotation).normalize(),
            scale: self.scale * inv_scale,
        }
    }

    /// Returns the inverse transform, such that `t * t.inverse()` is the identity
    /// for transforms with uniform scale.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self::IDENTITY.relative_to(self)
    }

    /// Interpolates towards `other`.
    ///
    /// Translation and scale are interpolated linearly; rotation uses a
    /// normalized lerp along the shortest arc. `t` is not clamped.
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            translation: self.translation.lerp(other.translation, t),
            rotation: self.rotation.lerp(other.rotation, t),
            scale: self.scale.lerp(other.scale, t),
        }
    }

    /// Transforms a point.
    #[inline]
    #[must_use]
    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.translation + self.rotation * (self.scale * point)
    }

    /// Converts to a column-major 4×4 matrix.
    #[inline]
    #[must_use]
    pub fn to_mat4(&self) -> DMat4 {
        DMat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Returns whether every component is within `max_abs_diff` of `other`.
    ///
    /// Rotations are compared up to sign, since `q` and `-q` describe the same
    /// orientation.
    #[must_use]
    pub fn abs_diff_eq(&self, other: &Self, max_abs_diff: f64) -> bool {
        self.translation.abs_diff_eq(other.translation, max_abs_diff)
            && self.scale.abs_diff_eq(other.scale, max_abs_diff)
            && (self.rotation.abs_diff_eq(other.rotation, max_abs_diff)
                || self.rotation.abs_diff_eq(-other.rotation, max_abs_diff))
    }

    /// Is this transform [finite]?
    ///
    /// [finite]: f64::is_finite
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.translation.is_finite() && self.rotation.is_finite() && self.scale.is_finite()
    }

    /// Is any component of this transform [NaN]?
    ///
    /// [NaN]: f64::is_nan
    #[inline]
    #[must_use]
    pub fn is_nan(&self) -> bool {
        self.translation.is_nan() || self.rotation.is_nan() || self.scale.is_nan()
    }
}

impl Default for Transform {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self {
            translation: self.transform_point(rhs.translation),
            rotation: self.rotation * rhs.rotation,
            scale: self.scale * rhs.scale,
        }
    }
}

fn safe_recip(v: DVec3) -> DVec3 {
    let r = |c: f64| if c.abs() < SCALE_EPSILON { 0.0 } else { 1.0 / c };
    DVec3::new(r(v.x), r(v.y), r(v.z))
}

/// An Euler rotation in degrees.
///
/// Converts to a quaternion as yaw about Z, then pitch about Y, then roll
/// about X (intrinsic Z-Y-X).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rotator {
    /// Rotation about the Y axis, in degrees.
    pub pitch: f64,
    /// Rotation about the Z axis, in degrees.
    pub yaw: f64,
    /// Rotation about the X axis, in degrees.
    pub roll: f64,
}

impl Rotator {
    /// The zero rotation.
    pub const ZERO: Self = Self {
        pitch: 0.0,
        yaw: 0.0,
        roll: 0.0,
    };

    /// Creates a rotator from pitch, yaw and roll in degrees.
    #[inline]
    #[must_use]
    pub const fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Converts to a unit quaternion.
    #[must_use]
    pub fn to_quat(self) -> DQuat {
        DQuat::from_euler(
            EulerRot::ZYX,
            self.yaw.to_radians(),
            self.pitch.to_radians(),
            self.roll.to_radians(),
        )
    }

    /// Converts a unit quaternion back to Euler angles.
    #[must_use]
    pub fn from_quat(q: DQuat) -> Self {
        let (yaw, pitch, roll) = q.to_euler(EulerRot::ZYX);
        Self {
            pitch: pitch.to_degrees(),
            yaw: yaw.to_degrees(),
            roll: roll.to_degrees(),
        }
    }

    /// Interpolates each angle linearly.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            pitch: self.pitch + (other.pitch - self.pitch) * t,
            yaw: self.yaw + (other.yaw - self.yaw) * t,
            roll: self.roll + (other.roll - self.roll) * t,
        }
    }
}
