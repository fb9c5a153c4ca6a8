// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-call evaluation context.

use crate::hierarchy::{Hierarchy, HierarchyChanges, INVALID};
use crate::trace::{
    EvaluateEvent, PropagateEvent, Tracer, UnitBeginEvent, UnitEndEvent, UnresolvedEvent,
    WriteEvent, WriteKind,
};

use super::cache::{CachedIndex, CachedIndices};
use super::{Describe, Evaluable};

/// Everything a unit may touch during one evaluation.
///
/// The host builds a context around its hierarchy for each tick (or each
/// unit call) and hands it to units by mutable reference. Units never retain
/// it. There is no ambient global state: services a unit needs are passed in
/// by the host, either through this context or the unit's own fields.
#[derive(Debug)]
pub struct ExecuteContext<'a> {
    /// The hierarchy units read and write.
    pub hierarchy: &'a mut Hierarchy,
    /// Receives trace events.
    pub tracer: Tracer<'a>,
    /// Index of the current evaluation tick.
    pub tick: u64,
}

impl<'a> ExecuteContext<'a> {
    /// Creates a context without tracing.
    #[must_use]
    pub fn new(hierarchy: &'a mut Hierarchy, tick: u64) -> Self {
        Self {
            hierarchy,
            tracer: Tracer::none(),
            tick,
        }
    }

    /// Creates a context that reports to `tracer`.
    #[must_use]
    pub fn with_tracer(hierarchy: &'a mut Hierarchy, tracer: Tracer<'a>, tick: u64) -> Self {
        Self {
            hierarchy,
            tracer,
            tick,
        }
    }

    /// Evaluates `unit`, bracketed by begin and end trace events.
    pub fn run<U: Evaluable + Describe>(&mut self, unit: &mut U) {
        let name = U::descriptor().name;
        self.tracer.unit_begin(&UnitBeginEvent {
            tick: self.tick,
            unit: name,
        });
        unit.evaluate(self);
        self.tracer.unit_end(&UnitEndEvent {
            tick: self.tick,
            unit: name,
        });
    }

    /// Settles deferred host edits through
    /// [`Hierarchy::evaluate`](Hierarchy::evaluate) and traces the result.
    pub fn settle(&mut self) -> HierarchyChanges {
        let changes = self.hierarchy.evaluate();
        self.tracer.evaluate(&EvaluateEvent {
            tick: self.tick,
            recomputed: changes.transforms.len(),
            topology_changed: changes.topology_changed,
        });
        changes
    }

    /// Resolves `name` through `cache`, tracing a miss.
    pub(crate) fn resolve(
        &mut self,
        cache: &mut CachedIndex,
        name: &str,
        unit: &'static str,
    ) -> Option<u32> {
        let idx = cache.resolve(name, self.hierarchy);
        self.check_resolved(idx, name, unit)
    }

    /// Resolves the `i`th target of a multi-target unit, tracing a miss.
    pub(crate) fn resolve_nth(
        &mut self,
        cache: &mut CachedIndices,
        i: usize,
        name: &str,
        unit: &'static str,
    ) -> Option<u32> {
        let idx = cache.resolve(i, name, self.hierarchy);
        self.check_resolved(idx, name, unit)
    }

    fn check_resolved(&mut self, idx: u32, name: &str, unit: &'static str) -> Option<u32> {
        if idx == INVALID {
            self.tracer.unresolved(&UnresolvedEvent {
                tick: self.tick,
                unit,
                target: name,
            });
            None
        } else {
            Some(idx)
        }
    }

    /// Traces a completed write and, if it propagated, the re-derivation.
    pub(crate) fn record_write(
        &mut self,
        unit: &'static str,
        index: u32,
        kind: WriteKind,
        weight: f64,
        propagate: bool,
        descendants: usize,
    ) {
        self.tracer.write(&WriteEvent {
            tick: self.tick,
            unit,
            index,
            kind,
            weight,
            propagate,
        });
        if propagate {
            self.tracer.propagate(&PropagateEvent {
                tick: self.tick,
                root: index,
                descendants,
            });
        }
    }
}
