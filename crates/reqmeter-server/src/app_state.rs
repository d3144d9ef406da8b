//! Shared application state.
//!
//! The registry is built here once at startup and handed to handlers through
//! axum `State`; there is no process-global registry.

use std::sync::Arc;

use reqmeter_core::error::Result;
use reqmeter_core::metrics::{ProcessCollector, Registry};
use tokio::runtime::Handle;

use crate::config::ServerConfig;
use crate::obs::{HttpMetrics, RuntimeCollector};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    registry: Registry,
    http: HttpMetrics,
}

impl AppState {
    /// Build application state.
    /// Registration errors (e.g. duplicate names) are returned so main can abort.
    pub fn new(cfg: &ServerConfig) -> Result<Self> {
        let registry = Registry::new();

        // 1) Default process/runtime bundle
        if cfg.metrics.default_metrics {
            collect_default_metrics(&registry, &cfg.metrics.prefix)?;
        }

        // 2) Request counter
        let http = HttpMetrics::new()?;
        http.register(&registry)?;

        let families = registry.len()?;
        tracing::info!(families, "metrics registry ready");

        Ok(Self {
            inner: Arc::new(AppStateInner { registry, http }),
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn http(&self) -> &HttpMetrics {
        &self.inner.http
    }
}

/// Register the process and tokio runtime collectors.
///
/// Inside a runtime this also starts the task that measures scheduler lag;
/// outside one the lag gauge stays at 0.
pub fn collect_default_metrics(registry: &Registry, prefix: &str) -> Result<()> {
    registry.register(Arc::new(ProcessCollector::with_prefix(prefix)?))?;

    let runtime = Arc::new(RuntimeCollector::new(prefix));
    registry.register(runtime.clone())?;
    if Handle::try_current().is_ok() {
        runtime.spawn_lag_monitor();
    } else {
        tracing::debug!("no tokio runtime, scheduler lag not measured");
    }
    Ok(())
}
