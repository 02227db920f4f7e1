//! Label resolution.
//!
//! Each requested label is a named path. The path is evaluated against the
//! probed document and the result becomes the label value: strings verbatim,
//! numbers in plain decimal, booleans as `true`/`false`. Arrays, objects and
//! `null` cannot be labels. Labels are mandatory once requested, so the first
//! failure aborts the whole resolution.

mod label_set;
mod naming;

pub use label_set::{label_text, resolve_labels, LabelSet};
pub use naming::{derive_label_name, sanitize_label_name, NamedPath};

use crate::coercion::CoercionError;
use crate::path::PathError;
use thiserror::Error;

/// Errors produced while resolving labels.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LabelError {
    /// The label's path did not resolve.
    #[error("label `{label}` could not be resolved")]
    Path {
        /// Label name.
        label: String,
        #[source]
        source: PathError,
    },

    /// The resolved value cannot be label text.
    #[error("label `{label}` has no text form")]
    Uncoercible {
        /// Label name.
        label: String,
        #[source]
        source: CoercionError,
    },
}
