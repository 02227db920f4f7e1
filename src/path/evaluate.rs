//! Path evaluation against a decoded document.

use super::{PathError, PathExpression, Segment};
use serde_json::{Number, Value};
use std::fmt;

/// Longest JSON excerpt carried in a not-found diagnostic.
const FRAGMENT_LIMIT: usize = 80;

/// The value a path resolved to, borrowed from the document.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractedValue<'a> {
    /// A JSON number, as written in the document.
    Number(&'a Number),
    /// A JSON string.
    String(&'a str),
    /// A JSON boolean.
    Boolean(bool),
    /// Either an array in the document or the matches of a wildcard path.
    Array(Vec<&'a Value>),
    /// `null` or an object.
    Other(&'a Value),
}

impl<'a> ExtractedValue<'a> {
    fn from_value(value: &'a Value) -> Self {
        match value {
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Bool(b) => Self::Boolean(*b),
            Value::Array(items) => Self::Array(items.iter().collect()),
            Value::Null | Value::Object(_) => Self::Other(value),
        }
    }

    /// Returns the JSON type name of the value.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Boolean(_) => "boolean",
            Self::Array(_) => "array",
            Self::Other(value) => kind_of(value),
        }
    }
}

/// Returns the JSON type name of a value.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Why a segment failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundReason {
    /// The object has no such key.
    MissingKey,
    /// The index is outside the array.
    IndexOutOfBounds {
        /// Length of the array.
        len: usize,
    },
    /// The node is a scalar and has no children.
    NotAContainer {
        /// JSON type of the node.
        kind: &'static str,
    },
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingKey => f.write_str("no such key in object"),
            Self::IndexOutOfBounds { len } => {
                write!(f, "index out of bounds for array of length {len}")
            }
            Self::NotAContainer { kind } => write!(f, "cannot descend into {kind}"),
        }
    }
}

impl PathExpression {
    /// Evaluates the expression against a document.
    ///
    /// Until a wildcard is reached every segment must resolve, and the first
    /// one that does not yields [`PathError::NotFound`]. After a wildcard the
    /// result is always [`ExtractedValue::Array`]; matches that lack a later
    /// segment are dropped instead of failing.
    pub fn evaluate<'a>(&self, document: &'a Value) -> Result<ExtractedValue<'a>, PathError> {
        let segments = self.segments();
        let mut node = document;

        for (position, segment) in segments.iter().enumerate() {
            if *segment == Segment::Wildcard {
                let matches = children(node).ok_or_else(|| {
                    self.not_found(
                        position,
                        node,
                        NotFoundReason::NotAContainer {
                            kind: kind_of(node),
                        },
                    )
                })?;
                return Ok(ExtractedValue::Array(select_all(
                    matches,
                    &segments[position + 1..],
                )));
            }
            node = step(node, segment).map_err(|reason| self.not_found(position, node, reason))?;
        }

        Ok(ExtractedValue::from_value(node))
    }

    fn not_found(&self, position: usize, node: &Value, reason: NotFoundReason) -> PathError {
        let segments = self.segments();
        let visited = segments[..position]
            .iter()
            .fold(String::from("$"), |mut acc, segment| {
                acc.push_str(&segment.to_string());
                acc
            });

        PathError::NotFound {
            expression: self.as_str().to_string(),
            segment: segments[position].to_string(),
            position,
            visited,
            reason,
            fragment: fragment(node),
        }
    }
}

/// Applies a key or index segment to one node.
fn step<'a>(node: &'a Value, segment: &Segment) -> Result<&'a Value, NotFoundReason> {
    match (segment, node) {
        (Segment::Key(key), Value::Object(map)) => map.get(key).ok_or(NotFoundReason::MissingKey),
        (Segment::Index(index), Value::Array(items)) => resolve_index(*index, items.len())
            .map(|i| &items[i])
            .ok_or(NotFoundReason::IndexOutOfBounds { len: items.len() }),
        // A key on an array or an index on an object is a type mismatch as
        // much as descending into a scalar.
        _ => Err(NotFoundReason::NotAContainer {
            kind: kind_of(node),
        }),
    }
}

fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let resolved = if index < 0 { len + index } else { index };
    if (0..len).contains(&resolved) {
        usize::try_from(resolved).ok()
    } else {
        None
    }
}

fn children(node: &Value) -> Option<Vec<&Value>> {
    match node {
        Value::Array(items) => Some(items.iter().collect()),
        Value::Object(map) => Some(map.values().collect()),
        _ => None,
    }
}

fn select_all<'a>(mut matches: Vec<&'a Value>, rest: &[Segment]) -> Vec<&'a Value> {
    for segment in rest {
        matches = match segment {
            Segment::Wildcard => matches.into_iter().filter_map(children).flatten().collect(),
            _ => matches
                .into_iter()
                .filter_map(|node| step(node, segment).ok())
                .collect(),
        };
    }
    matches
}

fn fragment(node: &Value) -> String {
    let mut text = node.to_string();
    if text.len() > FRAGMENT_LIMIT {
        let mut cut = FRAGMENT_LIMIT;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
        text.push_str("...");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eval<'a>(expr: &str, doc: &'a Value) -> Result<ExtractedValue<'a>, PathError> {
        PathExpression::compile(expr).unwrap().evaluate(doc)
    }

    #[test]
    fn test_scalar_kinds() {
        let doc = json!({"n": 23, "s": "37", "b": true, "z": null, "o": {}});
        assert!(matches!(
            eval("$.n", &doc),
            Ok(ExtractedValue::Number(n)) if n.as_i64() == Some(23)
        ));
        assert_eq!(eval("$.s", &doc).unwrap(), ExtractedValue::String("37"));
        assert_eq!(eval("$.b", &doc).unwrap(), ExtractedValue::Boolean(true));
        assert_eq!(eval("$.z", &doc).unwrap().kind(), "null");
        assert_eq!(eval("$.o", &doc).unwrap().kind(), "object");
    }

    #[test]
    fn test_dotted_key() {
        let doc = json!({"field.x.y": 37});
        assert!(matches!(
            eval(r#"$["field.x.y"]"#, &doc),
            Ok(ExtractedValue::Number(n)) if n.as_f64() == Some(37.0)
        ));
        // The dot form splits the key and misses.
        assert!(eval("$.field.x.y", &doc).is_err());
    }

    #[test]
    fn test_array_result_is_not_an_error() {
        let doc = json!({"items": [1, 2, 3]});
        match eval("$.items", &doc).unwrap() {
            ExtractedValue::Array(items) => assert_eq!(items.len(), 3),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_indices() {
        let doc = json!({"items": [{"x": 1}, {"x": 2}, {"x": 3}]});
        assert!(matches!(
            eval("$.items[2].x", &doc),
            Ok(ExtractedValue::Number(n)) if n.as_i64() == Some(3)
        ));
        assert!(matches!(
            eval("$.items[-3].x", &doc),
            Ok(ExtractedValue::Number(n)) if n.as_i64() == Some(1)
        ));
        assert!(matches!(
            eval("$.items[3]", &doc),
            Err(PathError::NotFound { reason: NotFoundReason::IndexOutOfBounds { len: 3 }, .. })
        ));
        assert!(matches!(
            eval("$.items[-4]", &doc),
            Err(PathError::NotFound { reason: NotFoundReason::IndexOutOfBounds { len: 3 }, .. })
        ));
    }

    #[test]
    fn test_missing_key_diagnostics() {
        let doc = json!({"field": 19});
        let err = eval("$.undefined", &doc).unwrap_err();
        match &err {
            PathError::NotFound {
                segment,
                position,
                visited,
                reason,
                fragment,
                ..
            } => {
                assert_eq!(segment, ".undefined");
                assert_eq!(*position, 0);
                assert_eq!(visited, "$");
                assert_eq!(*reason, NotFoundReason::MissingKey);
                assert_eq!(fragment, r#"{"field":19}"#);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(err.to_string().contains("undefined"));
    }

    #[test]
    fn test_descending_into_scalar_fails() {
        let doc = json!({"a": {"b": 5}});
        let err = eval("$.a.b.c", &doc).unwrap_err();
        assert!(matches!(
            err,
            PathError::NotFound {
                position: 2,
                reason: NotFoundReason::NotAContainer { kind: "number" },
                ref visited,
                ..
            } if visited == "$.a.b"
        ));
        assert!(eval("$.a[0]", &doc).is_err());
    }

    #[test]
    fn test_wildcards_collect_matches() {
        let doc = json!({"items": [{"x": 1}, {"y": 2}, {"x": 3}]});
        match eval("$.items[*].x", &doc).unwrap() {
            ExtractedValue::Array(matches) => assert_eq!(matches, vec![&json!(1), &json!(3)]),
            other => panic!("unexpected {other:?}"),
        }
        match eval("$.*", &doc).unwrap() {
            ExtractedValue::Array(matches) => assert_eq!(matches.len(), 1),
            other => panic!("unexpected {other:?}"),
        }
        match eval("$.items[*].missing", &doc).unwrap() {
            ExtractedValue::Array(matches) => assert!(matches.is_empty()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_wildcard_on_scalar_fails() {
        let doc = json!({"n": 1});
        assert!(matches!(
            eval("$.n[*]", &doc),
            Err(PathError::NotFound { reason: NotFoundReason::NotAContainer { .. }, .. })
        ));
    }

    #[test]
    fn test_fragment_is_truncated() {
        let doc = json!({"long": "é".repeat(100)});
        let err = eval("$.long.x", &doc).unwrap_err();
        match err {
            PathError::NotFound { fragment, .. } => {
                assert!(fragment.ends_with("..."));
                assert!(fragment.len() <= FRAGMENT_LIMIT + 3);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_evaluation_is_repeatable() {
        let doc = json!({"a": [true, "x", 1.5]});
        let path = PathExpression::compile("$.a[*]").unwrap();
        assert_eq!(path.evaluate(&doc).unwrap(), path.evaluate(&doc).unwrap());
    }
}
