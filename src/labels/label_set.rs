//! Label sets and their resolution against a document.

use super::{LabelError, NamedPath};
use crate::coercion::CoercionError;
use crate::path::ExtractedValue;
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// Label names mapped to values, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet {
    labels: BTreeMap<String, String>,
}

impl LabelSet {
    /// Creates an empty label set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a label, returning the value it replaced.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.labels.insert(name.into(), value.into())
    }

    /// Returns the value of a label.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.labels.get(name).map(String::as_str)
    }

    /// Returns the number of labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if there are no labels.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns label names in order.
    pub fn names(&self) -> Vec<&str> {
        self.labels.keys().map(String::as_str).collect()
    }

    /// Returns label values in name order.
    pub fn values(&self) -> Vec<&str> {
        self.labels.values().map(String::as_str).collect()
    }
}

/// Converts an extracted value into label text.
pub fn label_text(value: &ExtractedValue<'_>) -> Result<String, CoercionError> {
    match value {
        ExtractedValue::String(s) => Ok((*s).to_string()),
        ExtractedValue::Number(n) => Ok(number_text(n)),
        ExtractedValue::Boolean(b) => Ok(b.to_string()),
        ExtractedValue::Array(_) | ExtractedValue::Other(_) => {
            Err(CoercionError::UnsupportedType { kind: value.kind() })
        }
    }
}

/// Integers print exactly; floats use the shortest round-trip form, which
/// for `f64` never switches to exponent notation. Numbers beyond `f64`
/// keep their literal text.
fn number_text(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        n.as_f64().map_or_else(|| n.to_string(), |f| f.to_string())
    }
}

/// Resolves every named path into a label set.
///
/// Duplicate names keep the last value; a warning is logged.
pub fn resolve_labels(paths: &[NamedPath], document: &Value) -> Result<LabelSet, LabelError> {
    let mut labels = LabelSet::new();

    for named in paths {
        let value = named
            .path
            .evaluate(document)
            .map_err(|source| LabelError::Path {
                label: named.name.clone(),
                source,
            })?;
        let text = label_text(&value).map_err(|source| LabelError::Uncoercible {
            label: named.name.clone(),
            source,
        })?;

        if let Some(previous) = labels.insert(named.name.clone(), text) {
            tracing::warn!(
                label = %named.name,
                previous = %previous,
                "Duplicate label name, keeping the last value"
            );
        }
    }

    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn named(param: &str) -> NamedPath {
        NamedPath::parse(param).unwrap()
    }

    #[test]
    fn test_label_text() {
        let doc = json!({"s": "eu-west", "i": 42, "f": 0.25, "big": 1e21, "t": true, "neg": -7});
        let labels = resolve_labels(
            &[
                named("$.s"),
                named("$.i"),
                named("$.f"),
                named("$.big"),
                named("$.t"),
                named("$.neg"),
            ],
            &doc,
        )
        .unwrap();

        assert_eq!(labels.get("s"), Some("eu-west"));
        assert_eq!(labels.get("i"), Some("42"));
        assert_eq!(labels.get("f"), Some("0.25"));
        assert_eq!(labels.get("big"), Some("1000000000000000000000"));
        assert_eq!(labels.get("t"), Some("true"));
        assert_eq!(labels.get("neg"), Some("-7"));
    }

    #[test]
    fn test_out_of_range_number_label_keeps_literal() {
        let doc: Value = serde_json::from_str(r#"{"id": 1e400, "n": 1.50}"#).unwrap();
        let labels = resolve_labels(&[named("$.id"), named("$.n")], &doc).unwrap();
        assert_eq!(labels.get("id"), Some("1e400"));
        assert_eq!(labels.get("n"), Some("1.5"));
    }

    #[test]
    fn test_names_are_ordered() {
        let doc = json!({"b": "2", "a": "1"});
        let labels = resolve_labels(&[named("$.b"), named("$.a")], &doc).unwrap();
        assert_eq!(labels.names(), vec!["a", "b"]);
        assert_eq!(labels.values(), vec!["1", "2"]);
    }

    #[test]
    fn test_missing_label_fails() {
        let doc = json!({"a": "1"});
        let err = resolve_labels(&[named("$.a"), named("$.zone")], &doc).unwrap_err();
        assert!(matches!(err, LabelError::Path { ref label, .. } if label == "zone"));
    }

    #[test]
    fn test_structured_label_fails() {
        let doc = json!({"list": [1], "obj": {}, "nil": null});
        for path in ["$.list", "$.obj", "$.nil"] {
            let err = resolve_labels(&[named(path)], &doc).unwrap_err();
            assert!(matches!(err, LabelError::Uncoercible { .. }), "{path}");
        }
    }

    #[test]
    fn test_duplicate_names_last_wins() {
        let doc = json!({"x": {"host": "a"}, "y": {"host": "b"}});
        let labels = resolve_labels(&[named("$.x.host"), named("$.y.host")], &doc).unwrap();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels.get("host"), Some("b"));
    }

    #[test]
    fn test_no_labels() {
        let labels = resolve_labels(&[], &json!({})).unwrap();
        assert!(labels.is_empty());
    }
}
