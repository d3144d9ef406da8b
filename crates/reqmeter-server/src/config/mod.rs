//! Server config loader (strict parsing).

pub mod schema;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use reqmeter_core::error::{ReqMeterError, Result};

pub use schema::{MetricsSection, ServerConfig, ServerSection};

/// Env var naming an explicit config file.
pub const CONFIG_ENV: &str = "REQMETER_CONFIG";
/// Looked up in the working directory when `CONFIG_ENV` is unset.
pub const DEFAULT_PATH: &str = "reqmeter.yaml";

pub fn load_from_file(path: impl AsRef<Path>) -> Result<ServerConfig> {
    let path = path.as_ref();
    let s = fs::read_to_string(path).map_err(|e| {
        ReqMeterError::Internal(format!("read config {} failed: {e}", path.display()))
    })?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ServerConfig> {
    let cfg: ServerConfig = serde_yaml::from_str(s)
        .map_err(|e| ReqMeterError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Resolve the config for the binary.
///
/// An explicit `REQMETER_CONFIG` must exist. The default path is optional;
/// without it the built-in defaults apply.
pub fn load() -> Result<ServerConfig> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return load_from_file(path);
    }
    match fs::read_to_string(DEFAULT_PATH) {
        Ok(s) => load_from_str(&s),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(path = DEFAULT_PATH, "no config file, using defaults");
            Ok(ServerConfig::default())
        }
        Err(e) => Err(ReqMeterError::Internal(format!(
            "read config {DEFAULT_PATH} failed: {e}"
        ))),
    }
}
