// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON export of unit descriptors.
//!
//! Editors that do not link `armature_core` can load this document to build
//! pin widgets and defaults.

use std::io::{self, Write};

use armature_core::schema::{FieldDescriptor, UnitDescriptor};
use armature_core::units::descriptors;
use serde_json::{Value, json};

fn field_to_json(field: &FieldDescriptor) -> Value {
    let ui_range = field
        .ui_range
        .map_or(Value::Null, |(min, max)| json!([min, max]));
    json!({
        "name": field.name,
        "kind": field.kind.as_str(),
        "direction": field.direction.as_str(),
        "default": field.default,
        "ui_range": ui_range,
        "constant": field.constant,
    })
}

/// Converts one descriptor into a JSON object.
pub fn descriptor_to_json(descriptor: &UnitDescriptor) -> Value {
    json!({
        "name": descriptor.name,
        "display_name": descriptor.display_name,
        "category": descriptor.category,
        "keywords": descriptor.keywords,
        "fields": descriptor.fields.iter().map(field_to_json).collect::<Vec<_>>(),
    })
}

/// Writes every unit descriptor to `writer` as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns any I/O error from the writer.
pub fn write_descriptors(writer: &mut dyn Write) -> io::Result<()> {
    let units: Vec<Value> = descriptors()
        .iter()
        .map(|d| descriptor_to_json(d))
        .collect();
    serde_json::to_writer_pretty(writer, &units)?;
    Ok(())
}
