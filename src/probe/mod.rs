//! Probe orchestration.
//!
//! A probe runs these stages strictly in order and stops at the first
//! failure:
//!
//! ```text
//! validate → fetch → decode → labels → value → coerce → emit
//! ```
//!
//! Failures never escape a probe. They come back inside the
//! [`ProbeResult`] and are turned into an HTTP error by the server.

mod error;
mod fetch;
mod prober;
mod request;

pub use error::ProbeError;
pub use fetch::{FetchError, HttpFetcher};
pub use prober::{Extraction, ProbeResult, Prober};
pub use request::{parse_multiplier, ProbeRequest};
