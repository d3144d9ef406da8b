//! In-process metrics with Prometheus text exposition.
//!
//! Counters keep their per-label values as atomics in a `DashMap`, keyed by
//! the label values in declaration order. Everything the registry renders
//! goes through a [`MetricFamily`] snapshot first, then through the text
//! encoder, so collectors never format text themselves.

pub mod counter;
pub mod encode;
pub mod family;
pub mod labels;
pub mod process;
pub mod registry;

pub use counter::{Counter, CounterVec};
pub use encode::TEXT_CONTENT_TYPE;
pub use family::{Desc, MetricFamily, MetricKind, Sample, Value};
pub use labels::LabelSet;
pub use process::ProcessCollector;
pub use registry::{Collector, Registry};
