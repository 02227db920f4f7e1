//! HTTP server for the probe and metrics endpoints.

use super::{ExporterMetrics, ProbeRegistry};
use crate::probe::{ProbeError, ProbeResult, Prober};
use axum::{
    extract::{Query, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;

/// Content type of the Prometheus text format.
const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

const INDEX_PAGE: &str = r#"<html>
<head><title>Json Exporter</title></head>
<body>
<h1>Json Exporter</h1>
<p><a href="/probe">Run a probe</a></p>
<p><a href="/metrics">Metrics</a></p>
</body>
</html>
"#;

/// Errors that can occur during server operations.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen address could not be bound.
    #[error("failed to bind to address: {0}")]
    Bind(#[from] std::io::Error),

    /// The server stopped with an error.
    #[error("server error: {0}")]
    Server(String),
}

/// Shared state for the handlers.
struct AppState {
    prober: Prober,
    metrics: ExporterMetrics,
}

/// Builds the exporter's router.
pub fn router(prober: Prober, metrics: ExporterMetrics) -> Router {
    let state = Arc::new(AppState { prober, metrics });

    Router::new()
        .route("/", get(index_handler))
        .route("/probe", get(probe_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTP server for probes and exporter metrics.
pub struct ExporterServer {
    bind_addr: SocketAddr,
    router: Router,
}

impl ExporterServer {
    /// Creates a new server.
    pub fn new(bind_addr: SocketAddr, prober: Prober, metrics: ExporterMetrics) -> Self {
        Self {
            bind_addr,
            router: router(prober, metrics),
        }
    }

    /// Starts the HTTP server.
    ///
    /// Runs until `shutdown` completes, then drains in-flight requests.
    pub async fn run<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(self.bind_addr).await?;

        tracing::info!(addr = %self.bind_addr, "Exporter listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Server(e.to_string()))?;

        tracing::info!("Exporter stopped");
        Ok(())
    }
}

/// Handler for the / endpoint.
async fn index_handler() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

/// Handler for the /probe endpoint.
async fn probe_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let result = state.prober.probe(&params).await;
    state.metrics.observe(&result);
    probe_response(&result)
}

fn probe_response(result: &ProbeResult) -> Response {
    if let Some(err) = &result.error {
        return error_response(err);
    }

    match ProbeRegistry::from_result(result).and_then(|registry| registry.encode()) {
        Ok(output) => {
            (StatusCode::OK, [(CONTENT_TYPE, METRICS_CONTENT_TYPE)], output).into_response()
        }
        Err(e) => error_response(&ProbeError::from(e)),
    }
}

fn error_response(err: &ProbeError) -> Response {
    (
        err.status_code(),
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        format!("probe failed during {}: {}\n", err.stage(), err.report()),
    )
        .into_response()
}

/// Handler for the /metrics endpoint.
async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.encode() {
        Ok(output) => {
            (StatusCode::OK, [(CONTENT_TYPE, METRICS_CONTENT_TYPE)], output).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {}", e),
        )
            .into_response(),
    }
}

/// Handler for the /health endpoint.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
