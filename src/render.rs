//! Display-safe rendering of backend values.
//!
//! The agentic chat and notification endpoints return either plain strings
//! or structured objects (`{type, title, message}`, `{text}`, `{content}`)
//! for the same logical field. Everything that ends up in front of a user
//! goes through [`render_safe`], which accepts any JSON value and always
//! produces a string.

use log::debug;
use serde::Serialize;
use serde_json::{Map, Number, Value};

/// Shown when a value cannot be serialized at all
pub const UNDISPLAYABLE: &str = "Unable to display content";

/// Render any JSON value as display text. Never fails.
pub fn render_safe(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => render_number(n),
        Value::Array(items) => items.iter().map(render_safe).collect::<Vec<_>>().join("\n"),
        Value::Object(map) => render_object(map),
    }
}

/// Render any serializable value. Serialization failures (self-referential
/// data, maps with unsupported keys, failing `Serialize` impls) produce
/// [`UNDISPLAYABLE`] instead of an error.
pub fn render_serialize<T: Serialize + ?Sized>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(value) => render_safe(&value),
        Err(e) => {
            debug!("Value could not be serialized for display: {}", e);
            UNDISPLAYABLE.to_string()
        }
    }
}

fn render_object(map: &Map<String, Value>) -> String {
    match (truthy_field(map, "title"), truthy_field(map, "message")) {
        // Notification shape, with or without `type`
        (Some(title), Some(message)) => {
            return format!("{}: {}", render_safe(title), render_safe(message))
        }
        (None, Some(message)) => return render_safe(message),
        (Some(title), None) => return render_safe(title),
        (None, None) => {}
    }

    if let Some(text) = truthy_field(map, "text").or_else(|| truthy_field(map, "content")) {
        return render_safe(text);
    }

    serde_json::to_string_pretty(map).unwrap_or_else(|_| UNDISPLAYABLE.to_string())
}

/// Integral floats print without a fractional part, as a browser would show them.
pub(crate) fn render_number(n: &Number) -> String {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                return format!("{}", f as i64);
            }
        }
    }
    n.to_string()
}

pub(crate) fn truthy_field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|value| is_truthy(value))
}

/// JavaScript truthiness: `null`, `false`, `0` and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
