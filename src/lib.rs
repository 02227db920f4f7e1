//! JSON Exporter Library
//!
//! A Prometheus exporter that probes HTTP endpoints returning JSON, extracts
//! values with path expressions and republishes them as gauges.
//!
//! # Architecture
//!
//! Each probe is a one-shot pipeline:
//!
//! ```text
//! request → fetch → decode → path → coercion → exposition
//!                              ↓
//!                           labels
//! ```
//!
//! # Design Principles
//!
//! - **Isolated probes**: every probe gets its own metrics registry; a failing
//!   probe never affects another
//! - **Total coercion**: every JSON value either has a defined gauge value or
//!   a typed error
//! - **Errors as status codes**: failures are 4xx/5xx responses, never a
//!   silent `200` with `probe_success 0`
//! - **No state between probes**: no caching, retries or polling
//!
//! # Example
//!
//! ```
//! use json_exporter::{coercion, path::PathExpression};
//!
//! let doc = serde_json::json!({ "items": [1, 2, 3], "ratio": "0.5" });
//!
//! let items = PathExpression::compile("$.items").unwrap();
//! let count = coercion::coerce(&items.evaluate(&doc).unwrap(), 1.0).unwrap();
//! assert_eq!(count.get(), 3.0);
//!
//! let ratio = PathExpression::compile("$.ratio").unwrap();
//! let percent = coercion::coerce(&ratio.evaluate(&doc).unwrap(), 100.0).unwrap();
//! assert_eq!(percent.get(), 50.0);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod coercion;
pub mod config;
pub mod labels;
pub mod metrics;
pub mod path;
pub mod probe;

// Re-export commonly used types at crate root
pub use coercion::{CoercionError, CoercionPolicy, GaugeValue};
pub use config::{ExporterConfig, ProbeConfig, ServerConfig};
pub use labels::{LabelSet, NamedPath};
pub use path::{ExtractedValue, PathError, PathExpression};
pub use probe::{ProbeError, ProbeRequest, ProbeResult, Prober};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
