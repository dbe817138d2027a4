//! Readers for JSON values of unknown shape, as found in browser-era
//! storage. Coercions follow the rules that data was written under: lists
//! read as their comma joined items, objects as an opaque label.

use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};

const OBJECT_TEXT: &str = "[object Object]";

/// `deserialize_with` target keeping an explicit `null` apart from an absent
/// field (the latter being handled by `#[serde(default)]`).
pub fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn number_text(n: &Number) -> String {
    match (n.as_i64(), n.as_u64(), n.as_f64()) {
        (Some(i), _, _) => i.to_string(),
        (_, Some(u), _) => u.to_string(),
        (_, _, Some(f)) => f.to_string(),
        _ => n.to_string(),
    }
}

/// Text rendering of any value. `null` inside a list renders empty.
fn text_of(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_text(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => text_of(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => OBJECT_TEXT.to_string(),
    }
}

/// Text of a value that counts as set: a non empty string, a non zero
/// number, `true`, or any list or object.
pub fn truthy_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().map_or(true, |f| f != 0.0) => Some(number_text(n)),
        Value::Bool(true) => Some("true".to_string()),
        Value::Array(_) | Value::Object(_) => Some(text_of(value)),
        _ => None,
    }
}

fn text_to_number(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() {
        0.0
    } else {
        text.parse().unwrap_or(f64::NAN)
    }
}

/// Numeric reading of a stored value. Absent or unparsable values are
/// NaN, `null`, `false` and blank strings are zero. Lists read as their
/// text, so `[3]` is 3 and `[]` is 0.
pub fn to_number(value: Option<&Value>) -> f64 {
    match value {
        None => f64::NAN,
        Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => text_to_number(s),
        Some(list @ Value::Array(_)) => text_to_number(&text_of(list)),
        Some(Value::Object(_)) => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lists_and_objects_count_as_set() {
        assert_eq!(truthy_text(&json!([3])).as_deref(), Some("3"));
        assert_eq!(truthy_text(&json!(["a", null, 2.5])).as_deref(), Some("a,,2.5"));
        assert_eq!(truthy_text(&json!([])).as_deref(), Some(""));
        assert_eq!(truthy_text(&json!({"a": 1})).as_deref(), Some(OBJECT_TEXT));
        assert_eq!(truthy_text(&json!(0)), None);
        assert_eq!(truthy_text(&json!(false)), None);
        assert_eq!(truthy_text(&json!(null)), None);
    }

    #[test]
    fn numbers_render_without_trailing_fraction() {
        assert_eq!(truthy_text(&json!(2.0)).as_deref(), Some("2"));
        assert_eq!(truthy_text(&json!(12)).as_deref(), Some("12"));
        assert_eq!(truthy_text(&json!(0.5)).as_deref(), Some("0.5"));
    }

    #[test]
    fn list_numbers_read_through_their_text() {
        assert_eq!(to_number(Some(&json!([3]))), 3.0);
        assert_eq!(to_number(Some(&json!([[" 4 "]]))), 4.0);
        assert_eq!(to_number(Some(&json!([null]))), 0.0);
        assert_eq!(to_number(Some(&json!([]))), 0.0);
        assert!(to_number(Some(&json!([1, 2]))).is_nan());
        assert!(to_number(Some(&json!([true]))).is_nan());
        assert!(to_number(Some(&json!({"v": 3}))).is_nan());
        assert!(to_number(None).is_nan());
    }
}
