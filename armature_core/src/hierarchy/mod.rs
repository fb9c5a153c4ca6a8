// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rig hierarchy data model.
//!
//! A rig is a forest of *elements*, each a bone or a control. Each element has:
//!
//! - An identity: a unique name, resolved to a raw slot index with
//!   [`index_of`](Hierarchy::index_of), and an [`ElementId`] generational
//!   handle for host-side construction.
//! - Topology: parent, first-child, and sibling links forming an ordered
//!   forest. Cycles are rejected.
//! - A **local transform** relative to its parent.
//! - A **global transform**, always `parent_global * local` once evaluated.
//!   Roots have `global == local`.
//! - For controls, a typed [`ControlValue`] with declared minimum and maximum.
//!
//! Elements are stored in struct-of-arrays layout with index-based handles.
//!
//! # Two write paths
//!
//! Host-side edits through handles are deferred and settled by
//! [`evaluate`](Hierarchy::evaluate) (see [`dirty`](crate::dirty)). Unit
//! writes through the `*_at` setters take effect immediately, with explicit
//! control over propagation to descendants.

mod control;
mod evaluate;
mod id;
mod space;
mod store;
mod traverse;

pub use control::{ControlSettings, ControlType, ControlValue};
pub use evaluate::HierarchyChanges;
pub use id::{ElementId, ElementKind, INVALID};
pub use store::Hierarchy;
pub use traverse::{Children, Descendants};
