// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Evaluation units.
//!
//! A *unit* is a small struct of input fields (a target name, a value, a
//! space, a weight, ...) plus output fields, constructed once and evaluated
//! many times. Each [`evaluate`](Evaluable::evaluate) call borrows an
//! [`ExecuteContext`] for its duration, resolves its target through an owned
//! [`CachedIndex`], and reads or writes the hierarchy in place.
//!
//! Units are composed from three flat capabilities:
//!
//! - [`Evaluable`] runs the unit against a context.
//! - [`SpaceAdvisory`] tells an editor which element's space an input pin is
//!   authored in.
//! - [`Describe`] exposes the static [`UnitDescriptor`] and a display label.
//!
//! # Unresolved targets
//!
//! A name that does not resolve is not an error. Getters output identity
//! values and setters skip the write. Either way an
//! [`UnresolvedEvent`](crate::trace::UnresolvedEvent) is traced.

use alloc::string::String;

use crate::hierarchy::Hierarchy;
use crate::schema::UnitDescriptor;

mod blend;
mod cache;
mod context;
mod get;
mod modify;
mod set;

pub use blend::{BLEND_EPSILON, WeightRange};
pub use cache::{CachedIndex, CachedIndices};
pub use context::ExecuteContext;
pub use get::{
    GetBoneTransform, GetControlBool, GetControlFloat, GetControlRotator, GetControlTransform,
    GetControlVector, GetControlVector2D,
};
pub use modify::{ModifyBoneMode, ModifyBoneTarget, ModifyBoneTransforms};
pub use set::{SetBoneRotation, SetBoneScale, SetBoneTransform, SetBoneTranslation, SetControlValue};

/// The coordinate space a unit reads or writes in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Space {
    /// Relative to the element's parent.
    Local,
    /// Relative to the hierarchy root.
    Global,
}

impl Space {
    /// Returns the editor display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "LocalSpace",
            Self::Global => "GlobalSpace",
        }
    }
}

/// A unit that can be run against a hierarchy.
pub trait Evaluable {
    /// Runs the unit once.
    ///
    /// Units borrow the context only for the duration of the call.
    fn evaluate(&mut self, ctx: &mut ExecuteContext<'_>);
}

/// Editor advice on the coordinate space of input pins.
pub trait SpaceAdvisory {
    /// Returns the name of the element whose space the pin at `pin_path`
    /// should be authored in, or `None` for no advice.
    ///
    /// Malformed paths yield `None`.
    fn advise_space(&self, pin_path: &str, hierarchy: &Hierarchy) -> Option<String>;
}

/// Static metadata of a unit type.
pub trait Describe {
    /// Returns the unit's field descriptor table.
    fn descriptor() -> &'static UnitDescriptor
    where
        Self: Sized;

    /// Returns the label shown on the unit's graph node.
    fn unit_label(&self) -> String;
}

/// Returns the descriptors of every unit in this crate.
#[must_use]
pub fn descriptors() -> [&'static UnitDescriptor; 13] {
    [
        GetControlBool::descriptor(),
        GetControlFloat::descriptor(),
        GetControlVector2D::descriptor(),
        GetControlVector::descriptor(),
        GetControlRotator::descriptor(),
        GetControlTransform::descriptor(),
        GetBoneTransform::descriptor(),
        SetBoneTransform::descriptor(),
        SetBoneTranslation::descriptor(),
        SetBoneRotation::descriptor(),
        SetBoneScale::descriptor(),
        SetControlValue::descriptor(),
        ModifyBoneTransforms::descriptor(),
    ]
}

/// Formats a node label as the display name followed by the target, if any.
fn label(display_name: &str, target: &str) -> String {
    let mut out = String::from(display_name);
    if !target.is_empty() {
        out.push(' ');
        out.push_str(target);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_names_are_unique() {
        let all = descriptors();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn label_omits_empty_target() {
        assert_eq!(label("Set Translation", "hand_l"), "Set Translation hand_l");
        assert_eq!(label("Set Translation", ""), "Set Translation");
    }
}
