// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Host-side edits made through [`ElementId`](crate::hierarchy::ElementId)
//! handles are deferred: they mark a channel in an [`understory_dirty`]
//! tracker and global transforms are brought up to date by the next
//! [`Hierarchy::evaluate`](crate::hierarchy::Hierarchy::evaluate).
//!
//! - [`TRANSFORM`] uses [`EagerPolicy`](understory_dirty::EagerPolicy) and a
//!   child-to-parent dependency edge, so marking an element also marks every
//!   descendant whose global transform is derived from it.
//! - [`TOPOLOGY`] is marked on create, destroy, attach, detach and rename. It
//!   does not propagate; it only forces a traversal-order rebuild.
//!
//! Unit writes through the `*_at` setters bypass this tracker and update
//! global transforms immediately.

use understory_dirty::Channel;

/// Local transform changed; global transforms of the element and its
/// descendants must be recomputed.
pub const TRANSFORM: Channel = Channel::new(0);

/// Hierarchy structure changed; triggers traversal order rebuild.
pub const TOPOLOGY: Channel = Channel::new(1);
