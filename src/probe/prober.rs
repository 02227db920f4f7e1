//! The probe pipeline.

use super::{HttpFetcher, ProbeError, ProbeRequest};
use crate::coercion::{CoercionPolicy, GaugeValue};
use crate::config::ProbeConfig;
use crate::labels::{resolve_labels, LabelSet};
use crate::path::PathExpression;
use serde_json::Value;
use std::time::{Duration, Instant};

/// Values extracted from one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// The primary gauge.
    pub value: GaugeValue,
    /// Labels for the primary gauge.
    pub labels: LabelSet,
    /// Extra labelless gauges, in request order, one per name.
    pub fields: Vec<(String, GaugeValue)>,
}

/// Outcome of one probe.
#[derive(Debug)]
pub struct ProbeResult {
    /// Whether every stage succeeded.
    pub success: bool,
    /// The primary gauge, on success.
    pub value: Option<GaugeValue>,
    /// Extra labelless gauges.
    pub fields: Vec<(String, GaugeValue)>,
    /// Labels for the primary gauge.
    pub labels: LabelSet,
    /// Wall time of the whole probe.
    pub duration: Duration,
    /// The failure, if any.
    pub error: Option<ProbeError>,
}

impl ProbeResult {
    fn succeeded(extraction: Extraction, duration: Duration) -> Self {
        Self {
            success: true,
            value: Some(extraction.value),
            fields: extraction.fields,
            labels: extraction.labels,
            duration,
            error: None,
        }
    }

    fn failed(error: ProbeError, duration: Duration) -> Self {
        Self {
            success: false,
            value: None,
            fields: Vec::new(),
            labels: LabelSet::new(),
            duration,
            error: Some(error),
        }
    }
}

/// Runs probes.
///
/// Each call is independent: validate, fetch, decode, resolve labels,
/// resolve and coerce the value. The first failing stage ends the probe.
#[derive(Debug, Clone)]
pub struct Prober {
    config: ProbeConfig,
    fetcher: HttpFetcher,
}

impl Prober {
    /// Creates a prober.
    pub fn new(config: ProbeConfig) -> Result<Self, ProbeError> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self { config, fetcher })
    }

    /// Returns the probe settings.
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Runs one probe from raw query parameters.
    pub async fn probe(&self, params: &[(String, String)]) -> ProbeResult {
        let start = Instant::now();
        let target = params
            .iter()
            .find(|(k, _)| k == "target")
            .map_or("", |(_, v)| v.as_str());

        match self.run(params).await {
            Ok(extraction) => {
                tracing::debug!(
                    url = %target,
                    value = %extraction.value,
                    labels = extraction.labels.len(),
                    "Probe succeeded"
                );
                ProbeResult::succeeded(extraction, start.elapsed())
            }
            Err(err) => {
                tracing::warn!(
                    url = %target,
                    stage = err.stage(),
                    error = %err.report(),
                    "Probe failed"
                );
                ProbeResult::failed(err, start.elapsed())
            }
        }
    }

    async fn run(&self, params: &[(String, String)]) -> Result<Extraction, ProbeError> {
        let pairs = params.iter().map(|(k, v)| (k.as_str(), v.as_str()));
        let request = ProbeRequest::from_query(pairs, &self.config)?;
        let payload = self.fetcher.fetch(&request.target).await?;
        self.extract(&request, &payload)
    }

    /// Decodes a payload and extracts every value the request asks for.
    ///
    /// Duplicate field names keep the last value, like labels.
    pub fn extract(
        &self,
        request: &ProbeRequest,
        payload: &[u8],
    ) -> Result<Extraction, ProbeError> {
        let document: Value = serde_json::from_slice(payload)?;
        let labels = resolve_labels(&request.labels, &document)?;

        let policy = CoercionPolicy {
            multiplier: request.multiplier,
            scale_booleans: self.config.scale_booleans,
        };
        let value = gauge("jsonpath".to_string(), &request.value_path, &document, &policy)?;

        let mut fields: Vec<(String, GaugeValue)> = Vec::with_capacity(request.fields.len());
        for field in &request.fields {
            let what = format!("field `{}`", field.name);
            let value = gauge(what, &field.path, &document, &policy)?;
            match fields.iter_mut().find(|(name, _)| *name == field.name) {
                Some(slot) => {
                    let previous = slot.1;
                    tracing::warn!(
                        field = %field.name,
                        previous = %previous,
                        "Duplicate field name, keeping the last value"
                    );
                    slot.1 = value;
                }
                None => fields.push((field.name.clone(), value)),
            }
        }

        Ok(Extraction {
            value,
            labels,
            fields,
        })
    }
}

fn gauge(
    what: String,
    path: &PathExpression,
    document: &Value,
    policy: &CoercionPolicy,
) -> Result<GaugeValue, ProbeError> {
    let extracted = match path.evaluate(document) {
        Ok(extracted) => extracted,
        Err(source) => return Err(ProbeError::PathNotFound { what, source }),
    };
    policy
        .coerce(&extracted)
        .map_err(|source| ProbeError::UncoercibleValue { what, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coercion::CoercionError;

    fn prober() -> Prober {
        Prober::new(ProbeConfig::default()).unwrap()
    }

    fn request(params: &[(&str, &str)]) -> ProbeRequest {
        let mut all = vec![("target", "http://unused/")];
        all.extend_from_slice(params);
        ProbeRequest::from_query(all, &ProbeConfig::default()).unwrap()
    }

    #[test]
    fn test_extract_number() {
        let extraction = prober()
            .extract(&request(&[("jsonpath", "$.field")]), br#"{"field": 23}"#)
            .unwrap();
        assert_eq!(extraction.value.get(), 23.0);
        assert!(extraction.labels.is_empty());
    }

    #[test]
    fn test_extract_array_length() {
        let extraction = prober()
            .extract(&request(&[("jsonpath", "$.items")]), br#"{"items":[1,2,3]}"#)
            .unwrap();
        assert_eq!(extraction.value.get(), 3.0);
    }

    #[test]
    fn test_extract_with_labels_fields_and_multiplier() {
        let payload = br#"{"used": "512", "meta": {"host": "db1", "primary": true}, "errors": 4}"#;
        let extraction = prober()
            .extract(
                &request(&[
                    ("jsonpath", "$.used"),
                    ("multiple", "1024"),
                    ("label", "$.meta.host"),
                    ("label", "role=$.meta.primary"),
                    ("field", "$.errors"),
                ]),
                payload,
            )
            .unwrap();

        assert_eq!(extraction.value.get(), 512.0 * 1024.0);
        assert_eq!(extraction.labels.get("host"), Some("db1"));
        assert_eq!(extraction.labels.get("role"), Some("true"));
        assert_eq!(extraction.fields.len(), 1);
        assert_eq!(extraction.fields[0].0, "errors");
        assert_eq!(extraction.fields[0].1.get(), 4096.0);
    }

    #[test]
    fn test_boolean_scaling_follows_config() {
        let config = ProbeConfig {
            scale_booleans: false,
            ..Default::default()
        };
        let prober = Prober::new(config).unwrap();
        let extraction = prober
            .extract(&request(&[("jsonpath", "$.up"), ("multiple", "5")]), br#"{"up": true}"#)
            .unwrap();
        assert_eq!(extraction.value.get(), 1.0);
    }

    #[test]
    fn test_malformed_payload() {
        let err = prober()
            .extract(&request(&[("jsonpath", "$.a")]), b"<html>oops</html>")
            .unwrap_err();
        assert!(matches!(err, ProbeError::MalformedPayload(_)));
    }

    #[test]
    fn test_label_failure_precedes_value() {
        let err = prober()
            .extract(
                &request(&[("jsonpath", "$.missing"), ("label", "$.zone")]),
                br#"{"a": 1}"#,
            )
            .unwrap_err();
        assert!(matches!(err, ProbeError::PathNotFound { ref what, .. } if what == "label `zone`"));
    }

    #[test]
    fn test_value_failures() {
        let err = prober()
            .extract(&request(&[("jsonpath", "$.undefined")]), br#"{"field": 19}"#)
            .unwrap_err();
        assert!(matches!(err, ProbeError::PathNotFound { .. }));
        assert!(err.report().contains("undefined"));

        let err = prober()
            .extract(&request(&[("jsonpath", "$.field")]), br#"{"field": "abc"}"#)
            .unwrap_err();
        assert!(matches!(err, ProbeError::UncoercibleValue { .. }));

        let err = prober()
            .extract(&request(&[("jsonpath", "$.field")]), br#"{"field": null}"#)
            .unwrap_err();
        assert!(matches!(err, ProbeError::UncoercibleValue { .. }));
    }

    #[test]
    fn test_out_of_range_value_is_uncoercible() {
        let err = prober()
            .extract(&request(&[("jsonpath", "$.v")]), br#"{"v": 1e400}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ProbeError::UncoercibleValue {
                source: CoercionError::NonFinite { .. },
                ..
            }
        ));
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
        assert_eq!(err.stage(), "coerce");
    }

    #[test]
    fn test_out_of_range_number_elsewhere_is_ignored() {
        let extraction = prober()
            .extract(
                &request(&[("jsonpath", "$.v")]),
                br#"{"v": 5, "other": 1e400}"#,
            )
            .unwrap();
        assert_eq!(extraction.value.get(), 5.0);
    }

    #[test]
    fn test_duplicate_fields_keep_last_value() {
        let extraction = prober()
            .extract(
                &request(&[
                    ("jsonpath", "$.a"),
                    ("field", "x=$.a"),
                    ("field", "y=$.a"),
                    ("field", "x=$.b"),
                ]),
                br#"{"a": 1, "b": 2}"#,
            )
            .unwrap();

        let fields: Vec<_> = extraction
            .fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.get()))
            .collect();
        assert_eq!(fields, vec![("x", 2.0), ("y", 1.0)]);
    }

    #[tokio::test]
    async fn test_probe_reports_validation_failure() {
        let result = prober()
            .probe(&[("jsonpath".to_string(), "$.a".to_string())])
            .await;
        assert!(!result.success);
        assert!(result.value.is_none());
        assert!(matches!(result.error, Some(ProbeError::MissingParameter("target"))));
    }
}
