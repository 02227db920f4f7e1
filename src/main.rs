//! JSON Exporter CLI
//!
//! Serves `/probe`, `/metrics` and a small index page until interrupted.

use clap::Parser;
use json_exporter::{
    config::ExporterConfig,
    metrics::{ExporterMetrics, ExporterServer},
    probe::Prober,
};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Prometheus exporter for values inside JSON HTTP endpoints.
#[derive(Debug, Parser)]
#[command(name = "json-exporter", version)]
struct Cli {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// The address to listen on for HTTP requests.
    #[arg(long)]
    listen_address: Option<String>,

    /// Probe timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Path used when a probe has no `jsonpath` parameter.
    #[arg(long)]
    default_jsonpath: Option<String>,

    /// Verify TLS certificates of probe targets.
    #[arg(long)]
    verify_tls: bool,

    /// Reject probes that request the same label or field name twice.
    #[arg(long)]
    strict_labels: bool,
}

impl Cli {
    fn load_config(&self) -> Result<ExporterConfig, json_exporter::config::ConfigError> {
        let mut config = match &self.config {
            Some(path) => ExporterConfig::from_file(path)?,
            None => ExporterConfig::default(),
        };

        if let Some(addr) = &self.listen_address {
            config.server.listen_address = addr.clone();
        }
        if let Some(timeout) = self.timeout {
            config.probe.timeout_secs = timeout;
        }
        if let Some(path) = &self.default_jsonpath {
            config.probe.default_jsonpath = Some(path.clone());
        }
        if self.verify_tls {
            config.probe.insecure_skip_verify = false;
        }
        if self.strict_labels {
            config.probe.strict_labels = true;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("JSON Exporter v{}", json_exporter::VERSION);

    let cli = Cli::parse();
    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(path) = &config.probe.default_jsonpath {
        info!(path = %path, "Default jsonpath configured");
    }

    if let Err(e) = run(config).await {
        error!("Exporter failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: ExporterConfig) -> Result<(), Box<dyn std::error::Error>> {
    let bind_addr = config.server.socket_addr()?;
    let prober = Prober::new(config.probe)?;
    let metrics = ExporterMetrics::new()?;

    let server = ExporterServer::new(bind_addr, prober, metrics);
    server
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
