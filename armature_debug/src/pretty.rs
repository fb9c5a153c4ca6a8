// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use armature_core::trace::{
    EvaluateEvent, PropagateEvent, TraceSink, UnitBeginEvent, UnitEndEvent, UnresolvedEvent,
    WriteEvent, WriteKind,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn kind_name(kind: WriteKind) -> &'static str {
    match kind {
        WriteKind::Local => "local",
        WriteKind::Global => "global",
        WriteKind::Value => "value",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_unit_begin(&mut self, e: &UnitBeginEvent) {
        let _ = writeln!(self.writer, "[unit:begin] tick={} {}", e.tick, e.unit);
    }

    fn on_unit_end(&mut self, e: &UnitEndEvent) {
        let _ = writeln!(self.writer, "[unit:end] tick={} {}", e.tick, e.unit);
    }

    fn on_unresolved(&mut self, e: &UnresolvedEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[unresolved] tick={} {} target={:?}",
            e.tick, e.unit, e.target,
        );
    }

    fn on_write(&mut self, e: &WriteEvent) {
        let _ = writeln!(
            self.writer,
            "[write] tick={} {} index={} {} weight={:.3} propagate={}",
            e.tick,
            e.unit,
            e.index,
            kind_name(e.kind),
            e.weight,
            e.propagate,
        );
    }

    fn on_propagate(&mut self, e: &PropagateEvent) {
        let _ = writeln!(
            self.writer,
            "[propagate] tick={} root={} descendants={}",
            e.tick, e.root, e.descendants,
        );
    }

    fn on_evaluate(&mut self, e: &EvaluateEvent) {
        let topology = if e.topology_changed { "changed" } else { "same" };
        let _ = writeln!(
            self.writer,
            "[evaluate] tick={} recomputed={} topology={topology}",
            e.tick, e.recomputed,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_print_write() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_write(&WriteEvent {
            tick: 12,
            unit: "SetBoneTranslation",
            index: 3,
            kind: WriteKind::Global,
            weight: 0.5,
            propagate: false,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.starts_with("[write]"), "got: {output}");
        assert!(output.contains("tick=12"), "got: {output}");
        assert!(output.contains("global weight=0.500"), "got: {output}");
    }

    #[test]
    fn pretty_print_unresolved_quotes_target() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_unresolved(&UnresolvedEvent {
            tick: 0,
            unit: "GetControlVector",
            target: "arm ctrl",
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            output,
            "[unresolved] tick=0 GetControlVector target=\"arm ctrl\"\n"
        );
    }

    #[test]
    fn one_line_per_event() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_unit_begin(&UnitBeginEvent {
            tick: 1,
            unit: "ModifyBoneTransforms",
        });
        sink.on_propagate(&PropagateEvent {
            tick: 1,
            root: 0,
            descendants: 8,
        });
        sink.on_unit_end(&UnitEndEvent {
            tick: 1,
            unit: "ModifyBoneTransforms",
        });
        sink.on_evaluate(&EvaluateEvent {
            tick: 2,
            recomputed: 0,
            topology_changed: false,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "[propagate] tick=1 root=0 descendants=8");
        assert_eq!(lines[3], "[evaluate] tick=2 recomputed=0 topology=same");
    }
}
