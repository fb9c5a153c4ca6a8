// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON export of binary recordings.
//!
//! [`to_json`] decodes a byte buffer produced by
//! [`RecorderSink`](crate::recorder::RecorderSink) and writes a pretty-printed
//! JSON array with one object per event.

use std::io::{self, Write};

use armature_core::trace::WriteKind;
use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

fn kind_name(kind: WriteKind) -> &'static str {
    match kind {
        WriteKind::Local => "local",
        WriteKind::Global => "global",
        WriteKind::Value => "value",
    }
}

fn event_to_json(event: &RecordedEvent) -> Value {
    match event {
        RecordedEvent::UnitBegin { tick, unit } => json!({
            "event": "unit_begin",
            "tick": tick,
            "unit": unit,
        }),
        RecordedEvent::UnitEnd { tick, unit } => json!({
            "event": "unit_end",
            "tick": tick,
            "unit": unit,
        }),
        RecordedEvent::Unresolved { tick, unit, target } => json!({
            "event": "unresolved",
            "tick": tick,
            "unit": unit,
            "target": target,
        }),
        RecordedEvent::Write {
            tick,
            unit,
            index,
            kind,
            weight,
            propagate,
        } => json!({
            "event": "write",
            "tick": tick,
            "unit": unit,
            "index": index,
            "kind": kind_name(*kind),
            "weight": weight,
            "propagate": propagate,
        }),
        RecordedEvent::Propagate(e) => json!({
            "event": "propagate",
            "tick": e.tick,
            "root": e.root,
            "descendants": e.descendants,
        }),
        RecordedEvent::Evaluate(e) => json!({
            "event": "evaluate",
            "tick": e.tick,
            "recomputed": e.recomputed,
            "topology_changed": e.topology_changed,
        }),
    }
}

/// Converts a binary recording into a JSON array of event objects.
pub fn to_value(bytes: &[u8]) -> Value {
    Value::Array(decode(bytes).map(|e| event_to_json(&e)).collect())
}

/// Writes a binary recording to `writer` as pretty-printed JSON.
///
/// # Errors
///
/// Returns any I/O error from the writer.
pub fn to_json(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(writer, &to_value(bytes))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use armature_core::trace::{
        EvaluateEvent, PropagateEvent, TraceSink, UnitBeginEvent, UnresolvedEvent, WriteEvent,
    };

    use super::*;
    use crate::recorder::RecorderSink;

    fn sample_recording() -> Vec<u8> {
        let mut rec = RecorderSink::new();
        rec.on_unit_begin(&UnitBeginEvent {
            tick: 3,
            unit: "SetBoneRotation",
        });
        rec.on_unresolved(&UnresolvedEvent {
            tick: 3,
            unit: "SetBoneRotation",
            target: "hand_l",
        });
        rec.on_write(&WriteEvent {
            tick: 3,
            unit: "SetBoneRotation",
            index: 2,
            kind: WriteKind::Local,
            weight: 0.25,
            propagate: true,
        });
        rec.on_propagate(&PropagateEvent {
            tick: 3,
            root: 2,
            descendants: 5,
        });
        rec.on_evaluate(&EvaluateEvent {
            tick: 4,
            recomputed: 7,
            topology_changed: false,
        });
        rec.into_bytes()
    }

    #[test]
    fn exports_one_object_per_event() {
        let mut out = Vec::new();
        to_json(&sample_recording(), &mut out).unwrap();

        let parsed: Value = serde_json::from_slice(&out).unwrap();
        let events = parsed.as_array().unwrap();
        assert_eq!(events.len(), 5);
        assert_eq!(events[0]["event"], "unit_begin");
        assert_eq!(events[1]["target"], "hand_l");
        assert_eq!(events[2]["kind"], "local");
        assert_eq!(events[2]["weight"], 0.25);
        assert_eq!(events[2]["propagate"], true);
        assert_eq!(events[3]["descendants"], 5);
        assert_eq!(events[4]["tick"], 4);
        assert_eq!(events[4]["topology_changed"], false);
    }

    #[test]
    fn empty_recording_is_empty_array() {
        assert_eq!(to_value(&[]), json!([]));
    }
}
