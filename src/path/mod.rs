//! Path expressions over decoded JSON documents.
//!
//! A path is compiled once from its textual form and can then be evaluated
//! against any number of documents. The dialect is a small JSONPath subset:
//!
//! ```text
//! $                      root
//! .name                  object key (ends at the next `.` or `[`)
//! ["key.with.dots"]      object key, any characters ('single' quotes work too)
//! [3] / [-1]             array index, negative counts from the end
//! .* / [*]               every child of an array or object
//! ```
//!
//! Keys containing dots are common in the documents this exporter probes
//! (for example `ossstore.1.$CONFIG_SHARDS$.$DEFAULT_SHARD$`), so the bracket
//! form is the only way to address them.
//!
//! # Example
//!
//! ```
//! use json_exporter::path::{ExtractedValue, PathExpression};
//!
//! let doc = serde_json::json!({ "field.x.y": 37 });
//! let path = PathExpression::compile(r#"$["field.x.y"]"#).unwrap();
//!
//! match path.evaluate(&doc).unwrap() {
//!     ExtractedValue::Number(n) => assert_eq!(n.as_f64(), Some(37.0)),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

mod evaluate;
mod parser;

pub use evaluate::{kind_of, ExtractedValue, NotFoundReason};
pub use parser::{PathExpression, Segment};

use thiserror::Error;

/// Errors produced while compiling or evaluating a path expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The expression is not in the supported dialect.
    #[error("invalid path expression `{expression}` at offset {position}: {reason}")]
    Invalid {
        /// The expression as given.
        expression: String,
        /// Character offset of the problem.
        position: usize,
        /// What is wrong there.
        reason: String,
    },

    /// A segment did not resolve against the document.
    #[error(
        "segment `{segment}` of `{expression}` not found: {reason} at `{visited}` (value: {fragment})"
    )]
    NotFound {
        /// The whole expression.
        expression: String,
        /// The segment that failed, rendered in path syntax.
        segment: String,
        /// Zero-based index of the failing segment.
        position: usize,
        /// The path prefix that did resolve.
        visited: String,
        /// Why the segment failed.
        reason: NotFoundReason,
        /// Truncated JSON of the node the failing segment was applied to.
        fragment: String,
    },
}
