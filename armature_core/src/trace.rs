// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for unit evaluation.
//!
//! Units and [`ExecuteContext`](crate::units::ExecuteContext) report what
//! they did to a [`TraceSink`]: which unit ran, which names failed to
//! resolve, which slots were written, and how far writes propagated. Every
//! sink method has an empty default body.
//!
//! Events flow through a [`Tracer`], which holds an optional sink borrowed
//! for the duration of a context. Without the `trace` feature the tracer
//! holds no sink at all and its methods are empty.
//!
//! # Crate features
//!
//! - `trace`: routes [`Tracer`] calls to the sink.

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which part of an element a unit wrote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WriteKind {
    /// The local transform.
    Local,
    /// The global transform (stored as the equivalent local).
    Global,
    /// A typed control value.
    Value,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Marks the beginning of a unit's evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitBeginEvent {
    /// Evaluation tick.
    pub tick: u64,
    /// Unit type name.
    pub unit: &'static str,
}

/// Marks the end of a unit's evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitEndEvent {
    /// Evaluation tick.
    pub tick: u64,
    /// Unit type name.
    pub unit: &'static str,
}

/// Emitted when a unit's target name does not resolve.
///
/// The unit substitutes identity values (getters) or skips the write
/// (setters).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnresolvedEvent<'a> {
    /// Evaluation tick.
    pub tick: u64,
    /// Unit type name.
    pub unit: &'static str,
    /// The name that failed to resolve.
    pub target: &'a str,
}

/// Emitted after a unit writes to an element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WriteEvent {
    /// Evaluation tick.
    pub tick: u64,
    /// Unit type name.
    pub unit: &'static str,
    /// Raw slot index of the written element.
    pub index: u32,
    /// What was written.
    pub kind: WriteKind,
    /// Effective blend factor in `[0, 1]`.
    pub weight: f64,
    /// Whether descendants were re-derived.
    pub propagate: bool,
}

/// Emitted when a write re-derived descendant global transforms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PropagateEvent {
    /// Evaluation tick.
    pub tick: u64,
    /// Raw slot index of the written element.
    pub root: u32,
    /// Number of descendants whose global transform was re-derived.
    pub descendants: usize,
}

/// Emitted after deferred host edits were settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvaluateEvent {
    /// Evaluation tick.
    pub tick: u64,
    /// Number of global transforms recomputed.
    pub recomputed: usize,
    /// Whether the hierarchy structure changed since the last settle.
    pub topology_changed: bool,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from unit evaluation.
///
/// Implement only the events of interest; the rest default to no-ops.
pub trait TraceSink {
    /// Called before a unit evaluates.
    fn on_unit_begin(&mut self, e: &UnitBeginEvent) {
        _ = e;
    }

    /// Called after a unit evaluates.
    fn on_unit_end(&mut self, e: &UnitEndEvent) {
        _ = e;
    }

    /// Called when a unit's target name does not resolve.
    fn on_unresolved(&mut self, e: &UnresolvedEvent<'_>) {
        _ = e;
    }

    /// Called after a unit writes to an element.
    fn on_write(&mut self, e: &WriteEvent) {
        _ = e;
    }

    /// Called after a write re-derived descendants.
    fn on_propagate(&mut self, e: &PropagateEvent) {
        _ = e;
    }

    /// Called after deferred host edits were settled.
    fn on_evaluate(&mut self, e: &EvaluateEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Forwards events to a borrowed [`TraceSink`], if any.
///
/// Units never hold a tracer themselves; they reach it through the context.
/// With the `trace` feature disabled, calls are empty.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl Default for Tracer<'_> {
    fn default() -> Self {
        Self::none()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that forwards to `sink`.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer with no sink.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`UnitBeginEvent`].
    #[inline]
    pub fn unit_begin(&mut self, e: &UnitBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_unit_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`UnitEndEvent`].
    #[inline]
    pub fn unit_end(&mut self, e: &UnitEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_unit_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`UnresolvedEvent`].
    #[inline]
    pub fn unresolved(&mut self, e: &UnresolvedEvent<'_>) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_unresolved(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`WriteEvent`].
    #[inline]
    pub fn write(&mut self, e: &WriteEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_write(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PropagateEvent`].
    #[inline]
    pub fn propagate(&mut self, e: &PropagateEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_propagate(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`EvaluateEvent`].
    #[inline]
    pub fn evaluate(&mut self, e: &EvaluateEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_evaluate(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_write() -> WriteEvent {
        WriteEvent {
            tick: 3,
            unit: "SetBoneTransform",
            index: 1,
            kind: WriteKind::Local,
            weight: 1.0,
            propagate: true,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_unit_begin(&UnitBeginEvent {
            tick: 0,
            unit: "GetControlFloat",
        });
        sink.on_write(&sample_write());
        sink.on_unresolved(&UnresolvedEvent {
            tick: 0,
            unit: "GetControlFloat",
            target: "missing",
        });
    }

    #[test]
    fn tracer_without_sink_is_silent() {
        let mut tracer = Tracer::none();
        tracer.write(&sample_write());
        tracer.propagate(&PropagateEvent {
            tick: 0,
            root: 0,
            descendants: 4,
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_forwards_unit_events() {
        use alloc::vec::Vec;

        struct RecordingSink {
            writes: Vec<u32>,
        }
        impl TraceSink for RecordingSink {
            fn on_write(&mut self, e: &WriteEvent) {
                self.writes.push(e.index);
            }
        }

        let mut sink = RecordingSink { writes: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.write(&sample_write());
        // The tracer's borrow ends here.
        drop(tracer);
        assert_eq!(sink.writes, &[1]);
    }
}
