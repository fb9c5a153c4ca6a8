// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rig hierarchy container and transform evaluation units.
//!
//! `armature_core` provides a named hierarchy of bones and controls with
//! local and derived global transforms, and the *units* that an external
//! graph evaluator invokes once per tick to read and write it. It is `no_std`
//! compatible (with `alloc`) and uses struct-of-arrays storage with index
//! handles.
//!
//! # Architecture
//!
//! ```text
//!   Host (asset load, editing)
//!       │  create_bone / add_child / set_local_transform
//!       ▼
//!   Hierarchy ──► evaluate() ──► HierarchyChanges
//!       │
//!       │  ExecuteContext { &mut Hierarchy, Tracer, tick }
//!       ▼
//!   Unit::evaluate()
//!       ├─ CachedIndex::resolve(name)      name ──► slot index
//!       ├─ local_to_global / global_to_local
//!       └─ set_*_at(idx, value, propagate) immediate write
//! ```
//!
//! **[`hierarchy`]**: Struct-of-arrays element store with generational
//! handles, a name index, and a topology version. Global transforms are
//! `parent_global * local`; roots take their local transform exactly.
//!
//! **[`dirty`]**: Dirty channels for deferred host-side edits, via
//! `understory_dirty`.
//!
//! **[`transform`]**: Translation/rotation/scale transform and Euler rotator
//! over `glam` f64 types.
//!
//! **[`units`]**: Getters, setters, and the multi-bone modifier, together
//! with the [`CachedIndex`](units::CachedIndex) memoization cell, weight
//! blending, and editor space advice.
//!
//! **[`schema`]**: Declarative field descriptors for each unit, consumed by
//! editor and serialization layers. Evaluation never reads them.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! unit instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod dirty;
pub mod hierarchy;
pub mod schema;
pub mod trace;
pub mod transform;
pub mod units;
