use std::borrow::Cow;
use std::sync::Arc;

use axum::http::{Method, StatusCode};
use reqmeter_core::error::Result;
use reqmeter_core::metrics::{Counter, LabelSet, Registry};

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";

/// Labels of `http_requests_total`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLabels {
    pub method: Method,
    pub status: StatusCode,
}

impl RequestLabels {
    pub fn new(method: Method, status: StatusCode) -> Self {
        Self { method, status }
    }
}

impl LabelSet for RequestLabels {
    const NAMES: &'static [&'static str] = &["method", "status"];

    fn values(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.method.as_str()),
            Cow::Borrowed(self.status.as_str()),
        ]
    }
}

#[derive(Clone)]
pub struct HttpMetrics {
    requests: Counter<RequestLabels>,
}

impl HttpMetrics {
    pub fn new() -> Result<Self> {
        Ok(Self {
            requests: Counter::new(HTTP_REQUESTS_TOTAL, "Total HTTP requests")?,
        })
    }

    /// Register every server metric with `registry`.
    pub fn register(&self, registry: &Registry) -> Result<()> {
        registry.register(Arc::new(self.requests.clone()))
    }

    pub fn record(&self, method: Method, status: StatusCode) {
        let labels = RequestLabels::new(method, status);
        self.requests.inc(&labels);
        tracing::debug!(
            method = %labels.method,
            status = labels.status.as_u16(),
            "request counted"
        );
    }

    /// Current count for one method/status pair; 0 if never seen.
    pub fn count(&self, method: Method, status: StatusCode) -> u64 {
        self.requests
            .get(&RequestLabels::new(method, status))
            .unwrap_or(0)
    }
}
