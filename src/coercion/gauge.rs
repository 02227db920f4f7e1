//! Gauge coercion.

use super::CoercionError;
use crate::path::ExtractedValue;
use serde_json::Number;
use std::fmt;

/// A finite value ready for export.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct GaugeValue(f64);

impl GaugeValue {
    fn checked(value: f64) -> Result<Self, CoercionError> {
        if value.is_finite() {
            Ok(Self(value))
        } else {
            Err(CoercionError::NonFinite { value })
        }
    }

    /// Returns the raw value.
    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl fmt::Display for GaugeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<GaugeValue> for f64 {
    fn from(value: GaugeValue) -> Self {
        value.0
    }
}

/// How extracted values are scaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoercionPolicy {
    /// Factor applied to every coerced value.
    pub multiplier: f64,
    /// Whether booleans are scaled too. When false they export as exactly
    /// `1` or `0`.
    pub scale_booleans: bool,
}

impl Default for CoercionPolicy {
    fn default() -> Self {
        Self {
            multiplier: 1.0,
            scale_booleans: true,
        }
    }
}

impl CoercionPolicy {
    /// Creates a policy with the given multiplier that also scales booleans.
    pub fn scaled(multiplier: f64) -> Self {
        Self {
            multiplier,
            ..Default::default()
        }
    }

    /// Coerces an extracted value into a gauge.
    pub fn coerce(&self, value: &ExtractedValue<'_>) -> Result<GaugeValue, CoercionError> {
        let (raw, scale) = match value {
            ExtractedValue::Number(n) => (number_value(n), true),
            ExtractedValue::Boolean(b) => (if *b { 1.0 } else { 0.0 }, self.scale_booleans),
            ExtractedValue::String(s) => match s.parse::<f64>() {
                Ok(parsed) => (parsed, true),
                Err(_) => {
                    return Err(CoercionError::NonNumericString {
                        value: (*s).to_string(),
                    })
                }
            },
            ExtractedValue::Array(items) => (items.len() as f64, true),
            ExtractedValue::Other(_) => {
                return Err(CoercionError::UnsupportedType { kind: value.kind() })
            }
        };

        // "inf" and "NaN" parse as floats but are not gauge values.
        let raw = GaugeValue::checked(raw)?.get();
        GaugeValue::checked(if scale { raw * self.multiplier } else { raw })
    }
}

/// Numbers keep their literal text, so `1e400` decodes fine and only
/// fails here, as an infinity.
fn number_value(n: &Number) -> f64 {
    n.as_f64()
        .or_else(|| n.to_string().parse().ok())
        .unwrap_or(f64::NAN)
}

/// Coerces a value with `multiplier`, scaling booleans.
pub fn coerce(value: &ExtractedValue<'_>, multiplier: f64) -> Result<GaugeValue, CoercionError> {
    CoercionPolicy::scaled(multiplier).coerce(value)
}
