//! Exporter configuration.
//!
//! Settings come from built-in defaults, optionally overridden by a TOML
//! file and then by command-line flags.
//!
//! TLS certificate verification of probe targets is **disabled** by default:
//! the exporter is meant for internal endpoints with self-signed
//! certificates. Set `insecure_skip_verify = false` to verify.

use serde::{Deserialize, Serialize};
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

/// Longest allowed probe timeout.
const MAX_TIMEOUT_SECS: u64 = 300;

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Listen address does not resolve.
    #[error("invalid listen address `{0}`")]
    InvalidListenAddress(String),
    /// Timeout outside 1-300 seconds.
    #[error("invalid probe timeout (must be 1-300 seconds)")]
    InvalidTimeout,
    /// Zero body limit.
    #[error("max_body_bytes must be greater than zero")]
    InvalidBodyLimit,
    /// Default path does not compile.
    #[error("invalid default jsonpath: {0}")]
    InvalidDefaultPath(String),
    /// Config file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// Config file is not valid TOML for this format.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on. A bare `:port` listens on all interfaces.
    pub listen_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: ":9116".to_string(),
        }
    }
}

impl ServerConfig {
    /// Resolves the listen address to a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let invalid = || ConfigError::InvalidListenAddress(self.listen_address.clone());
        let address = if self.listen_address.starts_with(':') {
            format!("0.0.0.0{}", self.listen_address)
        } else {
            self.listen_address.clone()
        };
        address
            .to_socket_addrs()
            .map_err(|_| invalid())?
            .next()
            .ok_or_else(invalid)
    }
}

/// Per-probe behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Path used when a probe has no `jsonpath` parameter. There is no
    /// built-in default.
    pub default_jsonpath: Option<String>,
    /// Bound on the whole outbound fetch, body included.
    pub timeout_secs: u64,
    /// Skip TLS certificate verification of targets.
    pub insecure_skip_verify: bool,
    /// Largest accepted response body.
    pub max_body_bytes: usize,
    /// Apply the multiplier to boolean values.
    pub scale_booleans: bool,
    /// Reject probes that request the same label or field name twice.
    pub strict_labels: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            default_jsonpath: None,
            timeout_secs: 10,
            insecure_skip_verify: true,
            max_body_bytes: 10 * 1024 * 1024, // 10 MiB
            scale_booleans: true,
            strict_labels: false,
        }
    }
}

impl ProbeConfig {
    /// Returns the fetch timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validates the probe settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 || self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::InvalidTimeout);
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::InvalidBodyLimit);
        }
        if let Some(path) = &self.default_jsonpath {
            crate::path::PathExpression::compile(path)
                .map_err(|e| ConfigError::InvalidDefaultPath(e.to_string()))?;
        }
        Ok(())
    }
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExporterConfig {
    /// Listener settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Probe settings.
    #[serde(default)]
    pub probe: ProbeConfig,
}

impl ExporterConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config: ExporterConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.socket_addr()?;
        self.probe.validate()
    }
}
