//! Conversion of extracted values into gauge values.
//!
//! Precedence, first match wins:
//!
//! | Extracted | Gauge |
//! |-----------|-------|
//! | number    | `n * multiplier` |
//! | boolean   | `1.0`/`0.0`, scaled unless booleans are exempt |
//! | string    | strict float parse of the whole string, then scaled |
//! | array     | element count, then scaled |
//! | null, object | error |
//!
//! A gauge is always finite; anything that would produce NaN or an infinity
//! is rejected.

mod gauge;

pub use gauge::{coerce, CoercionPolicy, GaugeValue};

use thiserror::Error;

/// Reasons a value cannot become a gauge or label.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoercionError {
    /// A string that does not parse as a float.
    #[error("non-numeric string {value:?}")]
    NonNumericString {
        /// The string as found.
        value: String,
    },

    /// `null`, an object, or a structured value used as a label.
    #[error("unsupported type {kind}")]
    UnsupportedType {
        /// JSON type of the value.
        kind: &'static str,
    },

    /// NaN or an infinity, before or after scaling.
    #[error("non-finite value {value}")]
    NonFinite {
        /// The rejected value.
        value: f64,
    },
}
