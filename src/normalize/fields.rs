//! Field-priority lookups over loosely-shaped JSON records.
//!
//! Every entity normalizer declares its precedence as an ordered key table
//! (`FieldTable`) and resolves it with one of two semantics:
//!
//! - [`first_present`]: first candidate that is not `null` (amounts, counts)
//! - [`first_truthy`]: first candidate that is non-empty / non-zero / non-false
//!   (names, ids, nested containers)
//!
//! Lookups on strings, arrays or scalars simply find nothing.

use serde_json::{Map, Value};

/// Ordered candidate keys; earlier keys win.
pub type FieldTable = &'static [&'static str];

pub fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn first_present<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| record.get(*k))
        .find(|v| !v.is_null())
}

pub fn first_truthy<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| record.get(*k))
        .find(|v| is_truthy(v))
}

/// Render a scalar as display text. Objects, arrays, booleans and empty
/// strings have no text form.
pub fn value_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First truthy candidate that has a text form.
pub fn first_text(record: &Value, keys: &[&str]) -> Option<String> {
    first_truthy(record, keys).and_then(value_text)
}

/// First truthy candidate, kept only if it is an object.
///
/// A truthy string or array in an earlier slot shadows later keys: the
/// container is then treated as empty rather than falling through.
pub fn truthy_object<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a Map<String, Value>> {
    first_truthy(record, keys).and_then(Value::as_object)
}

/// Walk a dotted path (`"user.referralTree"`), returning the value if every
/// hop is an object key.
pub fn path<'a>(record: &'a Value, dotted: &str) -> Option<&'a Value> {
    dotted
        .split('.')
        .try_fold(record, |cur, key| cur.get(key))
        .filter(|v| !v.is_null())
}

/// First truthy value across several dotted paths.
pub fn first_truthy_path<'a>(record: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    paths
        .iter()
        .filter_map(|p| path(record, p))
        .find(|v| is_truthy(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn present_skips_null_but_keeps_zero() {
        let v = json!({"a": null, "b": 0, "c": 5});
        assert_eq!(first_present(&v, &["a", "b", "c"]), Some(&json!(0)));
    }

    #[test]
    fn truthy_skips_empty_and_zero() {
        let v = json!({"a": "", "b": 0, "c": false, "d": "x"});
        assert_eq!(first_truthy(&v, &["a", "b", "c", "d"]), Some(&json!("x")));
    }

    #[test]
    fn lookups_on_non_objects_find_nothing() {
        assert!(first_present(&json!("user-1"), &["id"]).is_none());
        assert!(first_truthy(&json!([1, 2]), &["id"]).is_none());
        assert!(first_text(&Value::Null, &["id"]).is_none());
    }

    #[test]
    fn string_container_shadows_later_objects() {
        let v = json!({"bank": "HDFC", "bankInfo": {"ifsc": "X"}});
        assert!(truthy_object(&v, &["bank", "bankInfo"]).is_none());
    }

    #[test]
    fn dotted_paths() {
        let v = json!({"user": {"referralTree": {"levels": []}}});
        assert!(path(&v, "user.referralTree").is_some());
        assert!(path(&v, "item.referralTree").is_none());
        assert_eq!(
            first_truthy_path(&v, &["referralTree", "user.referralTree"]),
            Some(&json!({"levels": []}))
        );
    }

    #[test]
    fn numbers_render_as_text() {
        assert_eq!(value_text(&json!(42)), Some("42".into()));
        assert_eq!(value_text(&json!(true)), None);
    }
}
