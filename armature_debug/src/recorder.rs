// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as little-endian records. Names are stored length-prefixed.
//! [`decode`] reads them back as an iterator of [`RecordedEvent`].

use armature_core::trace::{
    EvaluateEvent, PropagateEvent, TraceSink, UnitBeginEvent, UnitEndEvent, UnresolvedEvent,
    WriteEvent, WriteKind,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_UNIT_BEGIN: u8 = 1;
const TAG_UNIT_END: u8 = 2;
const TAG_UNRESOLVED: u8 = 3;
const TAG_WRITE: u8 = 4;
const TAG_PROPAGATE: u8 = 5;
const TAG_EVALUATE: u8 = 6;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_str(&mut self, s: &str) {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "names longer than u32::MAX bytes are truncated for recording"
        )]
        let len = s.len().min(u32::MAX as usize) as u32;
        self.write_u32(len);
        self.buf.extend_from_slice(&s.as_bytes()[..len as usize]);
    }

    fn write_kind(&mut self, k: WriteKind) {
        self.write_u8(match k {
            WriteKind::Local => 0,
            WriteKind::Global => 1,
            WriteKind::Value => 2,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_unit_begin(&mut self, e: &UnitBeginEvent) {
        self.write_u8(TAG_UNIT_BEGIN);
        self.write_u64(e.tick);
        self.write_str(e.unit);
    }

    fn on_unit_end(&mut self, e: &UnitEndEvent) {
        self.write_u8(TAG_UNIT_END);
        self.write_u64(e.tick);
        self.write_str(e.unit);
    }

    fn on_unresolved(&mut self, e: &UnresolvedEvent<'_>) {
        self.write_u8(TAG_UNRESOLVED);
        self.write_u64(e.tick);
        self.write_str(e.unit);
        self.write_str(e.target);
    }

    fn on_write(&mut self, e: &WriteEvent) {
        self.write_u8(TAG_WRITE);
        self.write_u64(e.tick);
        self.write_str(e.unit);
        self.write_u32(e.index);
        self.write_kind(e.kind);
        self.write_f64(e.weight);
        self.write_u8(u8::from(e.propagate));
    }

    fn on_propagate(&mut self, e: &PropagateEvent) {
        self.write_u8(TAG_PROPAGATE);
        self.write_u64(e.tick);
        self.write_u32(e.root);
        self.write_u64(e.descendants as u64);
    }

    fn on_evaluate(&mut self, e: &EvaluateEvent) {
        self.write_u8(TAG_EVALUATE);
        self.write_u64(e.tick);
        self.write_u64(e.recomputed as u64);
        self.write_u8(u8::from(e.topology_changed));
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
///
/// Names are owned, so recordings outlive the units that produced them.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`UnitBeginEvent`].
    UnitBegin {
        /// Evaluation tick.
        tick: u64,
        /// Unit type name.
        unit: String,
    },
    /// A [`UnitEndEvent`].
    UnitEnd {
        /// Evaluation tick.
        tick: u64,
        /// Unit type name.
        unit: String,
    },
    /// An [`UnresolvedEvent`].
    Unresolved {
        /// Evaluation tick.
        tick: u64,
        /// Unit type name.
        unit: String,
        /// The name that failed to resolve.
        target: String,
    },
    /// A [`WriteEvent`].
    Write {
        /// Evaluation tick.
        tick: u64,
        /// Unit type name.
        unit: String,
        /// Raw slot index of the written element.
        index: u32,
        /// What was written.
        kind: WriteKind,
        /// Effective blend factor.
        weight: f64,
        /// Whether descendants were re-derived.
        propagate: bool,
    },
    /// A [`PropagateEvent`].
    Propagate(PropagateEvent),
    /// An [`EvaluateEvent`].
    Evaluate(EvaluateEvent),
}

impl RecordedEvent {
    /// Returns the tick the event was recorded in.
    #[must_use]
    pub fn tick(&self) -> u64 {
        match self {
            Self::UnitBegin { tick, .. }
            | Self::UnitEnd { tick, .. }
            | Self::Unresolved { tick, .. }
            | Self::Write { tick, .. } => *tick,
            Self::Propagate(e) => e.tick,
            Self::Evaluate(e) => e.tick,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_bytes(&mut self, n: usize) -> Option<&[u8]> {
        if self.remaining() < n {
            return None;
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        Some(self.read_bytes(1)?[0])
    }

    fn read_u32(&mut self) -> Option<u32> {
        Some(u32::from_le_bytes(self.read_bytes(4)?.try_into().ok()?))
    }

    fn read_u64(&mut self) -> Option<u64> {
        Some(u64::from_le_bytes(self.read_bytes(8)?.try_into().ok()?))
    }

    fn read_f64(&mut self) -> Option<f64> {
        Some(f64::from_bits(self.read_u64()?))
    }

    fn read_usize(&mut self) -> Option<usize> {
        usize::try_from(self.read_u64()?).ok()
    }

    fn read_string(&mut self) -> Option<String> {
        let len = self.read_u32()? as usize;
        let bytes = self.read_bytes(len)?;
        Some(String::from_utf8_lossy(bytes).into_owned())
    }

    fn read_kind(&mut self) -> Option<WriteKind> {
        Some(match self.read_u8()? {
            0 => WriteKind::Local,
            1 => WriteKind::Global,
            2 => WriteKind::Value,
            _ => return None,
        })
    }

    fn decode_unit_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::UnitBegin {
            tick: self.read_u64()?,
            unit: self.read_string()?,
        })
    }

    fn decode_unit_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::UnitEnd {
            tick: self.read_u64()?,
            unit: self.read_string()?,
        })
    }

    fn decode_unresolved(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Unresolved {
            tick: self.read_u64()?,
            unit: self.read_string()?,
            target: self.read_string()?,
        })
    }

    fn decode_write(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Write {
            tick: self.read_u64()?,
            unit: self.read_string()?,
            index: self.read_u32()?,
            kind: self.read_kind()?,
            weight: self.read_f64()?,
            propagate: self.read_u8()? != 0,
        })
    }

    fn decode_propagate(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Propagate(PropagateEvent {
            tick: self.read_u64()?,
            root: self.read_u32()?,
            descendants: self.read_usize()?,
        }))
    }

    fn decode_evaluate(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Evaluate(EvaluateEvent {
            tick: self.read_u64()?,
            recomputed: self.read_usize()?,
            topology_changed: self.read_u8()? != 0,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_UNIT_BEGIN => self.decode_unit_begin(),
            TAG_UNIT_END => self.decode_unit_end(),
            TAG_UNRESOLVED => self.decode_unresolved(),
            TAG_WRITE => self.decode_write(),
            TAG_PROPAGATE => self.decode_propagate(),
            TAG_EVALUATE => self.decode_evaluate(),
            _ => None, // unknown tag: stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
