//! Input shaping: check an incoming payload against a projection and
//! keep only what the operation may write.
//!
//! Unregistered and read-only keys are dropped silently — this is what
//! guarantees that client-supplied identifiers never reach storage.

use serde_json::{Map, Value};

use super::{Field, FieldKind, Projection};

/// Validate `payload` against `projection`.
///
/// `strict` enforces required fields (create); updates pass `false` so a
/// partial payload is acceptable. Returns the sanitized writable subset.
pub fn validate(
    projection: &Projection,
    payload: &Value,
    strict: bool,
) -> Result<Map<String, Value>, String> {
    let obj = payload
        .as_object()
        .ok_or_else(|| "payload must be a JSON object".to_string())?;

    let mut out = Map::new();
    for field in projection.fields {
        if field.read_only {
            continue;
        }
        match obj.get(field.name) {
            Some(Value::Null) => {
                if field.required {
                    return Err(format!("field `{}` may not be null", field.name));
                }
                out.insert(field.name.to_string(), Value::Null);
            }
            Some(value) => {
                let checked = check_field(field, value)?;
                out.insert(field.name.to_string(), checked);
            }
            None => {
                if strict && field.required {
                    return Err(format!("field `{}` is required", field.name));
                }
            }
        }
    }
    Ok(out)
}

fn check_field(field: &Field, value: &Value) -> Result<Value, String> {
    match field.kind {
        FieldKind::Integer => {
            if !value.is_i64() && !value.is_u64() {
                return Err(format!("field `{}` must be an integer", field.name));
            }
            Ok(value.clone())
        }
        FieldKind::Boolean => {
            if !value.is_boolean() {
                return Err(format!("field `{}` must be a boolean", field.name));
            }
            Ok(value.clone())
        }
        FieldKind::String | FieldKind::DateTime => {
            let s = value
                .as_str()
                .ok_or_else(|| format!("field `{}` must be a string", field.name))?;
            if let Some(max) = field.max_length {
                if s.chars().count() > max as usize {
                    return Err(format!(
                        "field `{}` exceeds maximum length {}",
                        field.name, max
                    ));
                }
            }
            Ok(value.clone())
        }
        FieldKind::Choice(choices) => {
            let s = value
                .as_str()
                .ok_or_else(|| format!("field `{}` must be a string", field.name))?;
            if !choices.iter().any(|(code, _)| *code == s) {
                return Err(format!("unknown value `{}` for field `{}`", s, field.name));
            }
            Ok(value.clone())
        }
        FieldKind::Reference(_) => {
            if !value.is_string() {
                return Err(format!("field `{}` must be an id string", field.name));
            }
            Ok(value.clone())
        }
        FieldKind::ReferenceList(_) => {
            let items = value
                .as_array()
                .ok_or_else(|| format!("field `{}` must be an array of ids", field.name))?;
            if items.iter().any(|v| !v.is_string()) {
                return Err(format!("field `{}` must contain only id strings", field.name));
            }
            Ok(value.clone())
        }
        FieldKind::Nested(nested) => {
            let checked = validate(nested, value, false)
                .map_err(|e| format!("in `{}`: {}", field.name, e))?;
            Ok(Value::Object(checked))
        }
        FieldKind::NestedList(nested) => {
            let items = value
                .as_array()
                .ok_or_else(|| format!("field `{}` must be an array", field.name))?;
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let checked = validate(nested, item, false)
                    .map_err(|e| format!("in `{}`: {}", field.name, e))?;
                out.push(Value::Object(checked));
            }
            Ok(Value::Array(out))
        }
    }
}
