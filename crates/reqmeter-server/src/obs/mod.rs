//! Server-side metrics: the request counter and tokio runtime gauges.
//!
//! The registry and encoder live in `reqmeter-core`; this module only defines
//! what the server itself records.

pub mod metrics;
pub mod runtime;

pub use metrics::{HttpMetrics, RequestLabels};
pub use runtime::RuntimeCollector;
