//! tokio runtime gauges, the scheduler counterpart of the process bundle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use tokio::runtime::Handle;
use tokio::time::{self, Duration, Instant};

use reqmeter_core::error::Result;
use reqmeter_core::metrics::{Collector, Desc, MetricFamily, MetricKind};

const WORKERS: (&str, &str) = (
    "tokio_runtime_workers",
    "Number of worker threads used by the runtime.",
);
const ALIVE_TASKS: (&str, &str) = (
    "tokio_runtime_alive_tasks",
    "Number of alive tasks in the runtime.",
);
const LAG: (&str, &str) = (
    "tokio_runtime_lag_seconds",
    "Lag of the scheduler in seconds.",
);

/// Sleep length of the lag monitor. Lag is how late each wake-up arrives.
pub const LAG_SAMPLE_INTERVAL: Duration = Duration::from_millis(10);

/// Reads the runtime of whichever thread renders. Outside a runtime only the
/// lag gauge is reported.
pub struct RuntimeCollector {
    prefix: String,
    lag_nanos: Arc<AtomicU64>,
}

impl RuntimeCollector {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            lag_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start the task that keeps the lag gauge current. Must be called from
    /// within a tokio runtime. The task ends once the collector is dropped.
    pub fn spawn_lag_monitor(&self) {
        let lag = Arc::downgrade(&self.lag_nanos);
        tokio::spawn(monitor_lag(lag));
    }

    /// Most recent scheduler lag.
    pub fn lag(&self) -> Duration {
        Duration::from_nanos(self.lag_nanos.load(Ordering::Relaxed))
    }

    fn name(&self, base: &str) -> String {
        format!("{}{}", self.prefix, base)
    }
}

async fn monitor_lag(lag: Weak<AtomicU64>) {
    loop {
        let start = Instant::now();
        time::sleep(LAG_SAMPLE_INTERVAL).await;
        let late = start.elapsed().saturating_sub(LAG_SAMPLE_INTERVAL);

        let Some(cell) = lag.upgrade() else {
            return;
        };
        let nanos = u64::try_from(late.as_nanos()).unwrap_or(u64::MAX);
        cell.store(nanos, Ordering::Relaxed);
    }
}

impl Collector for RuntimeCollector {
    fn describe(&self) -> Vec<Desc> {
        [WORKERS, ALIVE_TASKS, LAG]
            .into_iter()
            .map(|(name, help)| Desc {
                name: self.name(name),
                help: help.to_string(),
                kind: MetricKind::Gauge,
            })
            .collect()
    }

    fn collect(&self) -> Result<Vec<MetricFamily>> {
        let mut out = Vec::with_capacity(3);
        if let Ok(handle) = Handle::try_current() {
            let m = handle.metrics();
            out.push(MetricFamily::gauge(
                self.name(WORKERS.0),
                WORKERS.1,
                m.num_workers() as f64,
            ));
            out.push(MetricFamily::gauge(
                self.name(ALIVE_TASKS.0),
                ALIVE_TASKS.1,
                m.num_alive_tasks() as f64,
            ));
        }
        out.push(MetricFamily::gauge(
            self.name(LAG.0),
            LAG.1,
            self.lag().as_secs_f64(),
        ));
        Ok(out)
    }
}
