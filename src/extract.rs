//! Dotted-path field extraction over arbitrarily nested JSON payloads.
//!
//! A path like `content.context` or `name.given` descends through objects and
//! transparently fans out across arrays at any depth, splicing the per-element
//! results back into a single flat list. Absent fields anywhere along the path
//! yield "no value", never an error.

use serde_json::Value;

/// Result of a path extraction.
///
/// Distinguishes a single terminal value (which may itself be an array stored
/// in the payload) from a list spliced together while fanning out across
/// intermediate arrays. [`Extracted::into_values`] collapses both into a flat
/// value list for callers that treat results uniformly.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted<'a> {
    /// The value found at the end of the path.
    Value(&'a Value),
    /// Values collected across one or more intermediate arrays.
    Spliced(Vec<&'a Value>),
}

impl<'a> Extracted<'a> {
    /// Flatten into a list of leaf values. A terminal array contributes its
    /// elements, a terminal scalar or object contributes itself.
    pub fn into_values(self) -> Vec<&'a Value> {
        match self {
            Extracted::Value(Value::Array(items)) => items.iter().collect(),
            Extracted::Value(value) => vec![value],
            Extracted::Spliced(values) => values,
        }
    }
}

/// Split a dotted path into its field segments.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('.').collect()
}

/// Look up `path` inside `node`.
///
/// Contract, applied recursively:
/// - if `node` is not an object, or lacks `path[0]` (a `null` value counts as
///   lacking), the result is `None`;
/// - if `path` has a single segment, the result is the value under it;
/// - otherwise descend: an array child applies the remaining path to every
///   element and splices the results flat (absent elements are skipped), any
///   other child recurses directly.
pub fn extract<'a>(node: &'a Value, path: &[&str]) -> Option<Extracted<'a>> {
    let (first, rest) = path.split_first()?;
    let child = match node.as_object().and_then(|map| map.get(*first)) {
        Some(value) if !value.is_null() => value,
        _ => return None,
    };
    if rest.is_empty() {
        return Some(Extracted::Value(child));
    }
    match child {
        Value::Array(items) => {
            let mut spliced = Vec::new();
            for item in items {
                match extract(item, rest) {
                    Some(Extracted::Value(Value::Array(inner))) => spliced.extend(inner.iter()),
                    Some(Extracted::Value(value)) => spliced.push(value),
                    Some(Extracted::Spliced(values)) => spliced.extend(values),
                    None => {}
                }
            }
            if spliced.is_empty() {
                None
            } else {
                Some(Extracted::Spliced(spliced))
            }
        }
        other => extract(other, rest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_segment_returns_value() {
        let data = json!({"subject": {"reference": "Patient/1"}});
        let found = extract(&data, &split_path("subject")).unwrap();
        assert_eq!(found.into_values(), vec![&json!({"reference": "Patient/1"})]);
    }

    #[test]
    fn descends_through_objects() {
        let data = json!({"a": {"b": {"c": 1}}});
        let found = extract(&data, &split_path("a.b.c")).unwrap();
        assert_eq!(found.into_values(), vec![&json!(1)]);
    }

    #[test]
    fn fans_out_across_arrays() {
        let data = json!({"a": {"b": [{"c": 1}, {"c": 2}]}});
        let found = extract(&data, &split_path("a.b.c")).unwrap();
        assert_eq!(found.into_values(), vec![&json!(1), &json!(2)]);
    }

    #[test]
    fn splices_nested_lists_one_level() {
        // Each element's own list result is spliced into the outer result.
        let data = json!({"name": [
            {"given": ["Zoe", "Ann"]},
            {"given": ["Z"]},
        ]});
        let found = extract(&data, &split_path("name.given")).unwrap();
        assert_eq!(
            found.into_values(),
            vec![&json!("Zoe"), &json!("Ann"), &json!("Z")]
        );
    }

    #[test]
    fn terminal_array_flattens_in_into_values() {
        let data = json!({"name": [{"family": "Aberi"}]});
        let found = extract(&data, &split_path("name")).unwrap();
        assert_eq!(found.into_values(), vec![&json!({"family": "Aberi"})]);
    }

    #[test]
    fn absent_segments_yield_none() {
        let data = json!({"a": {"b": [{"c": 1}]}});
        assert!(extract(&data, &split_path("a.x.c")).is_none());
        assert!(extract(&data, &split_path("x")).is_none());
        assert!(extract(&data, &split_path("a.b.x")).is_none());
    }

    #[test]
    fn null_counts_as_absent() {
        let data = json!({"a": null});
        assert!(extract(&data, &split_path("a")).is_none());
        assert!(extract(&data, &split_path("a.b")).is_none());
    }

    #[test]
    fn scalar_mid_path_yields_none() {
        let data = json!({"a": 3});
        assert!(extract(&data, &split_path("a.b")).is_none());
    }
}
