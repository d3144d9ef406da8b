//! reqmeter server library entry.
//!
//! Wires config, the metrics registry, and the HTTP handlers into an axum
//! router. Consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod error;
pub mod handlers;
pub mod obs;
pub mod router;
