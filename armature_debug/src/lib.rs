// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and JSON export for armature diagnostics.
//!
//! This crate provides [`TraceSink`](armature_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`] writes one human-readable line per event.
//! - [`recorder::RecorderSink`] keeps a compact binary recording, played
//!   back with [`recorder::decode`].
//! - [`export::to_json`] writes a recording as a JSON array.
//!
//! [`schema::write_descriptors`] dumps every unit's pin table as JSON for
//! editors.

pub mod export;
pub mod pretty;
pub mod recorder;
pub mod schema;
