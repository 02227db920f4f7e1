//! Operational metrics of the exporter itself.

use super::MetricsError;
use crate::probe::ProbeResult;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};

/// Process-wide registry served on `/metrics`.
///
/// Holds only counts and timings of probes, never probed values.
pub struct ExporterMetrics {
    registry: Registry,
    probes_total: IntCounterVec,
    probe_duration: Histogram,
}

impl ExporterMetrics {
    /// Creates the registry with all exporter metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let probes_total = IntCounterVec::new(
            Opts::new(
                "json_exporter_probes_total",
                "Probes handled, by outcome (success or the failing stage)",
            ),
            &["outcome"],
        )?;
        let probe_duration = Histogram::with_opts(HistogramOpts::new(
            "json_exporter_probe_duration_seconds",
            "Time taken by probes, failures included",
        ))?;

        registry.register(Box::new(probes_total.clone()))?;
        registry.register(Box::new(probe_duration.clone()))?;

        Ok(Self {
            registry,
            probes_total,
            probe_duration,
        })
    }

    /// Records the outcome of one probe.
    pub fn observe(&self, result: &ProbeResult) {
        let outcome = result.error.as_ref().map_or("success", |e| e.stage());
        self.probes_total.with_label_values(&[outcome]).inc();
        self.probe_duration.observe(result.duration.as_secs_f64());
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::LabelSet;
    use crate::probe::ProbeError;
    use std::time::Duration;

    fn result(error: Option<ProbeError>) -> ProbeResult {
        ProbeResult {
            success: error.is_none(),
            value: None,
            fields: Vec::new(),
            labels: LabelSet::new(),
            duration: Duration::from_millis(20),
            error,
        }
    }

    #[test]
    fn test_registry_creation() {
        assert!(ExporterMetrics::new().is_ok());
    }

    #[test]
    fn test_observe_counts_outcomes() {
        let metrics = ExporterMetrics::new().unwrap();
        metrics.observe(&result(None));
        metrics.observe(&result(None));
        metrics.observe(&result(Some(ProbeError::MissingParameter("target"))));

        let output = metrics.encode().unwrap();
        assert!(output.contains(r#"json_exporter_probes_total{outcome="success"} 2"#));
        assert!(output.contains(r#"json_exporter_probes_total{outcome="validate"} 1"#));
        assert!(output.contains("json_exporter_probe_duration_seconds_count 3"));
    }
}
