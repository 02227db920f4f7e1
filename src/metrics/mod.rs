//! Prometheus exposition for probes and for the exporter itself.
//!
//! # Probe metrics
//!
//! Every `/probe` request builds its own registry, encodes it and drops it:
//! - `probe_success` - 1 when the probe succeeded
//! - `probe_duration_seconds` - time the probe took
//! - `value` - the extracted gauge, labelled with the requested labels
//! - `json_field{field}` - extra values requested with `field=`
//!
//! # Exporter metrics
//!
//! Served on `/metrics` from one process-wide registry:
//! - `json_exporter_probes_total{outcome}` - probes by outcome
//! - `json_exporter_probe_duration_seconds` - probe time histogram
//!
//! # Example
//!
//! ```no_run
//! use json_exporter::config::ProbeConfig;
//! use json_exporter::metrics::{ExporterMetrics, ExporterServer};
//! use json_exporter::probe::Prober;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let prober = Prober::new(ProbeConfig::default())?;
//! let metrics = ExporterMetrics::new()?;
//! let server = ExporterServer::new(([0, 0, 0, 0], 9116).into(), prober, metrics);
//! server.run(async { let _ = tokio::signal::ctrl_c().await; }).await?;
//! # Ok(())
//! # }
//! ```

mod exporter;
mod probe_registry;
mod server;

pub use exporter::ExporterMetrics;
pub use probe_registry::ProbeRegistry;
pub use server::{router, ExporterServer, ServerError};

use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registration or encoding failed.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}
