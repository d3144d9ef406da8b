#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use reqmeter_server::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
server:
  listen: "0.0.0.0:3000"
metrics:
  default_metric: true # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.server.listen, "0.0.0.0:3000");
    assert!(cfg.metrics.default_metrics);
    assert!(cfg.metrics.prefix.is_empty());
}

#[test]
fn defaults_match_minimal_file() {
    let cfg = config::ServerConfig::default();
    cfg.validate().expect("defaults are valid");
    assert_eq!(cfg.server.listen_addr().unwrap().port(), 3000);
}

#[test]
fn rejects_other_versions() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn rejects_bad_listen_and_prefix() {
    let bad_listen = r#"
version: 1
server:
  listen: "localhost"
"#;
    let err = config::load_from_str(bad_listen).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");

    let bad_prefix = r#"
version: 1
metrics:
  prefix: "my-app_"
"#;
    let err = config::load_from_str(bad_prefix).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn full_config() {
    let ok = r#"
version: 1
server:
  listen: "127.0.0.1:9100"
metrics:
  default_metrics: false
  prefix: "demo_"
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.server.listen_addr().unwrap().port(), 9100);
    assert!(!cfg.metrics.default_metrics);
    assert_eq!(cfg.metrics.prefix, "demo_");
}
