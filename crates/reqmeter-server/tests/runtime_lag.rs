//! Scheduler lag gauge.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use reqmeter_core::metrics::{Collector, Registry, Value};
use reqmeter_server::app_state;
use reqmeter_server::obs::RuntimeCollector;

#[tokio::test]
async fn blocked_runtime_shows_up_as_lag() {
    let rt = RuntimeCollector::new("");
    rt.spawn_lag_monitor();
    assert_eq!(rt.lag(), Duration::ZERO);

    // Let the monitor start its first sleep, then hold the only thread.
    tokio::task::yield_now().await;
    std::thread::sleep(Duration::from_millis(80));
    tokio::time::sleep(Duration::from_millis(1)).await;

    assert!(rt.lag() >= Duration::from_millis(30), "lag = {:?}", rt.lag());

    let lag = rt
        .collect()
        .unwrap()
        .into_iter()
        .find(|f| f.name == "tokio_runtime_lag_seconds")
        .expect("lag family");
    match lag.samples[0].value {
        Value::Float(v) => assert!(v >= 0.03),
        Value::Int(_) => panic!("lag is a float gauge"),
    }
}

#[test]
fn default_metrics_without_runtime_report_zero_lag() {
    let registry = Registry::new();
    app_state::collect_default_metrics(&registry, "").unwrap();

    let out = registry.render().unwrap();
    assert!(out.contains("\ntokio_runtime_lag_seconds 0\n"));
    assert!(!out.contains("tokio_runtime_workers "));
}
