//! Output shaping: project a serialized entity through a projection.

use serde_json::{Map, Value};

use super::{Field, FieldKind, Projection};

/// Render `source` (a serialized entity, possibly enriched with child
/// collections) through `projection`.
///
/// Only registered fields appear in the output, in no particular JSON
/// key order. Missing source keys render as `null` (or `[]` for nested
/// lists). Choice fields flagged `as_label` render their display label.
pub fn render(projection: &Projection, source: &Value) -> Value {
    let src = source.as_object();
    let mut out = Map::with_capacity(projection.fields.len());
    for field in projection.fields {
        let raw = src
            .and_then(|m| m.get(field.name))
            .cloned()
            .unwrap_or(Value::Null);
        out.insert(field.name.to_string(), render_field(field, raw));
    }
    Value::Object(out)
}

fn render_field(field: &Field, raw: Value) -> Value {
    match field.kind {
        FieldKind::Choice(choices) if field.as_label => match raw.as_str() {
            Some(code) => choices
                .iter()
                .find(|(value, _)| *value == code)
                .map(|(_, label)| Value::String((*label).to_string()))
                // Unknown code: pass the stored value through untouched.
                .unwrap_or(raw),
            None => raw,
        },
        FieldKind::Nested(nested) => {
            if raw.is_object() {
                render(nested, &raw)
            } else {
                Value::Null
            }
        }
        FieldKind::NestedList(nested) => match raw.as_array() {
            Some(items) => Value::Array(items.iter().map(|v| render(nested, v)).collect()),
            None => Value::Array(Vec::new()),
        },
        _ => raw,
    }
}
