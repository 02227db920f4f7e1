//! Per-probe metrics registry.

use super::MetricsError;
use crate::probe::ProbeResult;
use prometheus::{Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};

/// A registry holding the metrics of exactly one probe.
///
/// Built from a [`ProbeResult`], encoded once, then dropped. Nothing is
/// shared between probes, so concurrent probes can never collide on
/// registration.
pub struct ProbeRegistry {
    registry: Registry,
}

impl ProbeRegistry {
    /// Builds the registry for a probe result.
    pub fn from_result(result: &ProbeResult) -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let success = Gauge::new(
            "probe_success",
            "Displays whether or not the probe was a success",
        )?;
        let duration = Gauge::new(
            "probe_duration_seconds",
            "Returns how long the probe took to complete in seconds",
        )?;
        registry.register(Box::new(success.clone()))?;
        registry.register(Box::new(duration.clone()))?;

        success.set(if result.success { 1.0 } else { 0.0 });
        duration.set(result.duration.as_secs_f64());

        if let Some(value) = result.value {
            if result.labels.is_empty() {
                let gauge = Gauge::new("value", "Retrieved value")?;
                registry.register(Box::new(gauge.clone()))?;
                gauge.set(value.get());
            } else {
                let opts = Opts::new("value", "Retrieved value");
                let gauge = GaugeVec::new(opts, &result.labels.names())?;
                registry.register(Box::new(gauge.clone()))?;
                gauge.with_label_values(&result.labels.values()).set(value.get());
            }
        }

        if !result.fields.is_empty() {
            let fields = GaugeVec::new(
                Opts::new("json_field", "Additional value retrieved from the target"),
                &["field"],
            )?;
            registry.register(Box::new(fields.clone()))?;
            for (name, value) in &result.fields {
                fields.with_label_values(&[name.as_str()]).set(value.get());
            }
        }

        Ok(Self { registry })
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
