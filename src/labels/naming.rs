//! Label naming rules.
//!
//! Names are derived lexically from the path text, independently of how the
//! path evaluates: split on `.` and take the last piece. A bracketed key
//! containing dots therefore derives from its tail (`$["a.b"]` gives `b"]`,
//! sanitized to `b__`); use an explicit name for those.

use crate::path::{PathError, PathExpression};

/// Prefix applied to names that would otherwise be invalid or reserved.
const NAME_PREFIX: &str = "label_";

/// Derives a label name from the last `.` segment of a path string.
pub fn derive_label_name(path: &str) -> String {
    let last = path.rsplit('.').next().unwrap_or(path);
    sanitize_label_name(last)
}

/// Maps an arbitrary string onto a valid Prometheus label name.
///
/// Characters outside `[A-Za-z0-9_]` become `_`. Names that are empty,
/// start with a digit, or start with the reserved `__` are prefixed.
pub fn sanitize_label_name(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    let needs_prefix = cleaned.is_empty()
        || cleaned.starts_with(|c: char| c.is_ascii_digit())
        || cleaned.starts_with("__");

    if needs_prefix {
        format!("{NAME_PREFIX}{cleaned}")
    } else {
        cleaned
    }
}

/// A path paired with the name it is exported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedPath {
    /// Sanitized name.
    pub name: String,
    /// Compiled path.
    pub path: PathExpression,
}

impl NamedPath {
    /// Creates a named path, sanitizing the name.
    pub fn new(name: &str, path: PathExpression) -> Self {
        Self {
            name: sanitize_label_name(name),
            path,
        }
    }

    /// Parses a query parameter value.
    ///
    /// A value starting with `$` is a bare path and is named after its last
    /// segment. Otherwise the text up to the first `=` is the name and the
    /// rest is the path: `host=$.meta.hostname`.
    pub fn parse(param: &str) -> Result<Self, PathError> {
        match param.split_once('=') {
            Some((name, path)) if !param.starts_with('$') => {
                Ok(Self::new(name, PathExpression::compile(path)?))
            }
            _ => Ok(Self {
                name: derive_label_name(param),
                path: PathExpression::compile(param)?,
            }),
        }
    }
}
