// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Weight remapping and blending.

use crate::hierarchy::ControlValue;
use crate::transform::Transform;

/// Blend factors within this distance of 0 or 1 snap to a skip or an exact
/// write.
pub const BLEND_EPSILON: f64 = 1e-8;

/// The weight interval that maps onto the blend factor range `[0, 1]`.
///
/// The bounds may be given in either order. Weights outside the interval are
/// clamped, never extrapolated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightRange {
    /// Weight at which the change has no effect.
    pub minimum: f64,
    /// Weight at which the change is fully applied.
    pub maximum: f64,
}

impl Default for WeightRange {
    fn default() -> Self {
        Self::UNIT
    }
}

impl WeightRange {
    /// The interval `[0, 1]`.
    pub const UNIT: Self = Self {
        minimum: 0.0,
        maximum: 1.0,
    };

    /// Creates a range from its bounds.
    #[inline]
    #[must_use]
    pub const fn new(minimum: f64, maximum: f64) -> Self {
        Self { minimum, maximum }
    }

    /// Maps `weight` to a blend factor.
    ///
    /// Returns `None` when the change should be skipped: the factor is within
    /// [`BLEND_EPSILON`] of zero, the bounds nearly coincide, or the weight is
    /// NaN. A factor within [`BLEND_EPSILON`] of one is returned as exactly
    /// `1.0`.
    #[must_use]
    pub fn factor(self, weight: f64) -> Option<f64> {
        let (lo, hi) = if self.minimum <= self.maximum {
            (self.minimum, self.maximum)
        } else {
            (self.maximum, self.minimum)
        };
        if weight.is_nan() || hi - lo <= BLEND_EPSILON {
            return None;
        }
        let t = ((weight - lo) / (hi - lo)).clamp(0.0, 1.0);
        if t <= BLEND_EPSILON {
            None
        } else if t >= 1.0 - BLEND_EPSILON {
            Some(1.0)
        } else {
            Some(t)
        }
    }
}

/// Blends two transforms. A factor of exactly `1.0` returns `next` unchanged.
pub(crate) fn blend_transform(prev: &Transform, next: Transform, t: f64) -> Transform {
    if t >= 1.0 { next } else { prev.lerp(&next, t) }
}

/// Blends two control values of the same type.
///
/// Booleans switch to `next` once the factor reaches one half. Values of
/// differing types yield `next`.
pub(crate) fn blend_value(prev: ControlValue, next: ControlValue, t: f64) -> ControlValue {
    if t >= 1.0 {
        return next;
    }
    match (prev, next) {
        (ControlValue::Bool(_), ControlValue::Bool(b)) => {
            if t >= 0.5 {
                ControlValue::Bool(b)
            } else {
                prev
            }
        }
        (ControlValue::Float(a), ControlValue::Float(b)) => ControlValue::Float(a + (b - a) * t),
        (ControlValue::Vector2D(a), ControlValue::Vector2D(b)) => ControlValue::Vector2D(a.lerp(b, t)),
        (ControlValue::Vector(a), ControlValue::Vector(b)) => ControlValue::Vector(a.lerp(b, t)),
        (ControlValue::Rotator(a), ControlValue::Rotator(b)) => ControlValue::Rotator(a.lerp(b, t)),
        (ControlValue::Transform(a), ControlValue::Transform(b)) => {
            ControlValue::Transform(a.lerp(&b, t))
        }
        _ => next,
    }
}
