use std::net::SocketAddr;

use reqmeter_core::error::{ReqMeterError, Result};
use reqmeter_core::metrics::labels;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ReqMeterError::UnsupportedVersion);
        }

        self.server.validate()?;
        self.metrics.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|_| {
            ReqMeterError::BadRequest(format!(
                "server.listen must be a socket address, got {:?}",
                self.listen
            ))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:3000".into()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Register the process and runtime collectors.
    #[serde(default = "default_true")]
    pub default_metrics: bool,

    /// Prepended to default metric names.
    #[serde(default)]
    pub prefix: String,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            default_metrics: true,
            prefix: String::new(),
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        if !self.prefix.is_empty() {
            labels::validate_metric_name(&self.prefix).map_err(|_| {
                ReqMeterError::BadRequest(format!(
                    "metrics.prefix is not a valid metric name prefix: {:?}",
                    self.prefix
                ))
            })?;
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}
