//! reqmeter core: metric model, counters, registry and the text exposition encoder.
//!
//! This crate owns everything that can be said about a metric without an HTTP
//! server or async runtime around it, so the server crate and tests can share
//! one registry implementation.
//!
//! Panics, `unwrap`, and `expect` are compile-denied here. Every fallible path
//! surfaces as `ReqMeterError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metrics;

/// Shared result type.
pub use error::{ReqMeterError, Result};
