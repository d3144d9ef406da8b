//! End-to-end checks against the real router on a loopback port.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use reqmeter_core::error::{ReqMeterError, Result};
use reqmeter_core::metrics::{Collector, Desc, MetricFamily, MetricKind, TEXT_CONTENT_TYPE};
use reqmeter_server::{app_state::AppState, config, router};

struct Reply {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

impl Reply {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

async fn spawn(cfg: config::ServerConfig) -> (SocketAddr, AppState) {
    let state = AppState::new(&cfg).expect("state");
    let app = router::build_router(state.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

async fn get(addr: SocketAddr, path: &str) -> Reply {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let req = format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    stream.write_all(req.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let raw = String::from_utf8(raw).unwrap();

    let (head, body) = raw.split_once("\r\n\r\n").expect("header terminator");
    let mut lines = head.lines();
    let status = lines
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .and_then(|s| s.parse().ok())
        .expect("status line");
    let headers = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    Reply {
        status,
        headers,
        body: body.to_string(),
    }
}

#[tokio::test]
async fn index_and_error_bodies() {
    let (addr, _) = spawn(config::ServerConfig::default()).await;

    let ok = get(addr, "/").await;
    assert_eq!(ok.status, 200);
    assert_eq!(ok.body, "OK");

    let err = get(addr, "/error").await;
    assert_eq!(err.status, 500);
    assert_eq!(err.body, "ERROR");
}

#[tokio::test]
async fn scrape_after_traffic() {
    let (addr, _) = spawn(config::ServerConfig::default()).await;

    for _ in 0..3 {
        get(addr, "/").await;
    }
    get(addr, "/error").await;

    let m = get(addr, "/metrics").await;
    assert_eq!(m.status, 200);
    assert_eq!(m.header("content-type"), Some(TEXT_CONTENT_TYPE));
    assert!(m
        .body
        .lines()
        .any(|l| l == r#"http_requests_total{method="GET",status="200"} 3"#));
    assert!(m
        .body
        .lines()
        .any(|l| l == r#"http_requests_total{method="GET",status="500"} 1"#));
    assert!(m.body.contains("# HELP http_requests_total Total HTTP requests\n"));
    assert!(m.body.contains("process_start_time_seconds "));
    assert!(m.body.contains("tokio_runtime_workers "));
}

#[tokio::test]
async fn metrics_scrape_has_no_side_effect() {
    let mut cfg = config::ServerConfig::default();
    cfg.metrics.default_metrics = false;
    let (addr, state) = spawn(cfg).await;

    get(addr, "/").await;
    let a = get(addr, "/metrics").await;
    let b = get(addr, "/metrics").await;
    assert_eq!(a.body, b.body);
    assert!(!a.body.contains("process_"));
    assert!(!a.body.contains("status=\"500\""));

    use axum::http::{Method, StatusCode};
    assert_eq!(state.http().count(Method::GET, StatusCode::OK), 1);
}

#[tokio::test]
async fn counts_are_exact_for_any_sequence() {
    let mut cfg = config::ServerConfig::default();
    cfg.metrics.default_metrics = false;
    let (addr, _) = spawn(cfg).await;

    let n = 11;
    for i in 0..n {
        get(addr, if i % 3 == 0 { "/error" } else { "/" }).await;
    }
    let errors = (0..n).filter(|i| i % 3 == 0).count();

    let m = get(addr, "/metrics").await;
    assert!(m.body.contains(&format!(
        "http_requests_total{{method=\"GET\",status=\"200\"}} {}\n",
        n - errors
    )));
    assert!(m.body.contains(&format!(
        "http_requests_total{{method=\"GET\",status=\"500\"}} {errors}\n"
    )));
}

#[tokio::test]
async fn prefixed_default_metrics() {
    let mut cfg = config::ServerConfig::default();
    cfg.metrics.prefix = "demo_".into();
    let (addr, _) = spawn(cfg).await;

    let m = get(addr, "/metrics").await;
    assert!(m.body.contains("demo_process_start_time_seconds "));
    assert!(m.body.contains("demo_tokio_runtime_workers "));
    assert!(m.body.contains("demo_tokio_runtime_lag_seconds "));
    assert!(m.body.contains("# TYPE http_requests_total counter\n"));
}

struct Broken;

impl Collector for Broken {
    fn describe(&self) -> Vec<Desc> {
        vec![Desc {
            name: "broken".into(),
            help: "always fails".into(),
            kind: MetricKind::Gauge,
        }]
    }

    fn collect(&self) -> Result<Vec<MetricFamily>> {
        Err(ReqMeterError::Internal("sensor unavailable".into()))
    }
}

#[tokio::test]
async fn render_failure_is_a_500() {
    let (addr, state) = spawn(config::ServerConfig::default()).await;
    state.registry().register(Arc::new(Broken)).unwrap();

    let m = get(addr, "/metrics").await;
    assert_eq!(m.status, 500);
    let body: serde_json::Value = serde_json::from_str(&m.body).unwrap();
    assert_eq!(body["error"], "INTERNAL");

    // Request handlers are unaffected.
    assert_eq!(get(addr, "/").await.status, 200);
}

#[test]
fn duplicate_request_counter_aborts_startup() {
    let state = AppState::new(&config::ServerConfig::default()).unwrap();
    let again = reqmeter_server::obs::HttpMetrics::new().unwrap();
    let err = again.register(state.registry()).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "DUPLICATE_NAME");
}
