//! Probe failure taxonomy.

use super::FetchError;
use crate::coercion::CoercionError;
use crate::labels::LabelError;
use crate::metrics::MetricsError;
use crate::path::PathError;
use axum::http::StatusCode;
use std::error::Error as _;
use thiserror::Error;

/// Every way a probe can fail.
///
/// Each variant maps to one HTTP status and one pipeline stage. None of them
/// affect other probes.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// A required query parameter is absent or empty.
    #[error("missing required parameter `{0}`")]
    MissingParameter(&'static str),

    /// A query parameter has an unusable value.
    #[error("invalid parameter `{parameter}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        parameter: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A `jsonpath`, `label` or `field` value does not compile.
    #[error("invalid path expression in `{parameter}`")]
    InvalidPathExpression {
        /// Parameter name.
        parameter: &'static str,
        #[source]
        source: PathError,
    },

    /// The same label or field name requested twice under strict labels.
    #[error("{kind} `{name}` is requested more than once")]
    LabelCollision {
        /// `label` or `field`.
        kind: &'static str,
        /// The repeated name.
        name: String,
    },

    /// The target could not be fetched.
    #[error("failed to fetch target")]
    TransportFailure(#[from] FetchError),

    /// The body is not JSON.
    #[error("target returned malformed JSON")]
    MalformedPayload(#[from] serde_json::Error),

    /// A value or label path did not resolve.
    #[error("could not resolve {what}")]
    PathNotFound {
        /// What was being resolved.
        what: String,
        #[source]
        source: PathError,
    },

    /// A resolved value cannot become a gauge or label.
    #[error("could not coerce {what}")]
    UncoercibleValue {
        /// What was being coerced.
        what: String,
        #[source]
        source: CoercionError,
    },

    /// The probe registry could not be built or encoded.
    #[error("failed to encode probe metrics")]
    Exposition(#[from] MetricsError),
}

impl ProbeError {
    /// Returns the HTTP status for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingParameter(_)
            | Self::InvalidParameter { .. }
            | Self::InvalidPathExpression { .. }
            | Self::LabelCollision { .. } => StatusCode::BAD_REQUEST,
            Self::PathNotFound { .. } | Self::UncoercibleValue { .. } => StatusCode::NOT_FOUND,
            Self::TransportFailure(_) | Self::MalformedPayload(_) | Self::Exposition(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the pipeline stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::MissingParameter(_)
            | Self::InvalidParameter { .. }
            | Self::InvalidPathExpression { .. }
            | Self::LabelCollision { .. } => "validate",
            Self::TransportFailure(_) => "fetch",
            Self::MalformedPayload(_) => "decode",
            Self::PathNotFound { .. } => "resolve",
            Self::UncoercibleValue { .. } => "coerce",
            Self::Exposition(_) => "emit",
        }
    }

    /// Renders the error with its whole source chain.
    pub fn report(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(err) = source {
            message.push_str(": ");
            message.push_str(&err.to_string());
            source = err.source();
        }
        message
    }
}

impl From<LabelError> for ProbeError {
    fn from(err: LabelError) -> Self {
        match err {
            LabelError::Path { label, source } => Self::PathNotFound {
                what: format!("label `{label}`"),
                source,
            },
            LabelError::Uncoercible { label, source } => Self::UncoercibleValue {
                what: format!("label `{label}`"),
                source,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathExpression;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ProbeError::MissingParameter("target").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ProbeError::LabelCollision {
                kind: "label",
                name: "host".into(),
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ProbeError::UncoercibleValue {
                what: "jsonpath".into(),
                source: CoercionError::UnsupportedType { kind: "null" },
            }
            .status_code(),
            StatusCode::NOT_FOUND
        );
        let malformed = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(
            ProbeError::from(malformed).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_report_includes_source_chain() {
        let doc = serde_json::json!({"field": 19});
        let source = PathExpression::compile("$.undefined")
            .unwrap()
            .evaluate(&doc)
            .unwrap_err();
        let err = ProbeError::PathNotFound {
            what: "jsonpath".into(),
            source,
        };

        let report = err.report();
        assert!(report.starts_with("could not resolve jsonpath: segment `.undefined`"));
        assert_eq!(err.stage(), "resolve");
    }

    #[test]
    fn test_label_errors_map_to_taxonomy() {
        let err: ProbeError = LabelError::Uncoercible {
            label: "zone".into(),
            source: CoercionError::UnsupportedType { kind: "array" },
        }
        .into();
        assert!(
            matches!(err, ProbeError::UncoercibleValue { ref what, .. } if what == "label `zone`")
        );
    }
}
