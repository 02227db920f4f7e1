//! Outbound fetch of probe targets.

use crate::config::ProbeConfig;
use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use std::time::Duration;
use thiserror::Error;

/// Transport-level failures.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be configured.
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    /// The exchange did not finish in time.
    #[error("request to {target} timed out after {timeout:?}")]
    Timeout {
        /// Requested URL.
        target: String,
        /// The configured bound.
        timeout: Duration,
    },

    /// Connection, TLS or protocol failure.
    #[error("request to {target} failed")]
    Request {
        /// Requested URL.
        target: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The body grew past `max_body_bytes`.
    #[error("response from {target} exceeds {limit} bytes")]
    BodyTooLarge {
        /// Requested URL.
        target: String,
        /// The configured limit.
        limit: usize,
    },
}

/// Fetches JSON payloads over HTTP(S).
///
/// One attempt per call, bounded by the configured timeout over the whole
/// exchange. Connections are not kept alive between probes and proxy
/// environment variables are ignored.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
    max_body_bytes: usize,
}

impl HttpFetcher {
    /// Creates a fetcher from probe settings.
    pub fn new(config: &ProbeConfig) -> Result<Self, FetchError> {
        if config.insecure_skip_verify {
            tracing::warn!("TLS certificate verification of probe targets is disabled");
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .danger_accept_invalid_certs(config.insecure_skip_verify)
            .pool_max_idle_per_host(0)
            .no_proxy()
            .user_agent(concat!("json-exporter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            timeout: config.timeout(),
            max_body_bytes: config.max_body_bytes,
        })
    }

    /// Fetches the body of `target`.
    ///
    /// The target's HTTP status is not interpreted: health endpoints often
    /// answer 503 with exactly the JSON worth probing.
    pub async fn fetch(&self, target: &Url) -> Result<Vec<u8>, FetchError> {
        let mut response = self
            .client
            .get(target.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.classify(target, e))?;

        tracing::debug!(url = %target, status = %response.status(), "Target responded");

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.classify(target, e))? {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(FetchError::BodyTooLarge {
                    target: target.to_string(),
                    limit: self.max_body_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }

    fn classify(&self, target: &Url, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                target: target.to_string(),
                timeout: self.timeout,
            }
        } else {
            FetchError::Request {
                target: target.to_string(),
                source: err,
            }
        }
    }
}
