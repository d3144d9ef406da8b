//! Snapshot types produced by collectors and consumed by the encoder.

use std::fmt;

/// Exposition type of a metric family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

/// Static description of one family a collector exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Desc {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
}

/// Sample value. Counters stay integral so they render without a fraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(u64),
    Float(f64),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) if v.is_nan() => f.write_str("NaN"),
            Value::Float(v) if v.is_infinite() => {
                f.write_str(if v > 0.0 { "+Inf" } else { "-Inf" })
            }
            Value::Float(v) => write!(f, "{v}"),
        }
    }
}

/// One line of a family: label pairs in declaration order plus the value.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub labels: Vec<(String, String)>,
    pub value: Value,
}

impl Sample {
    pub fn unlabeled(value: Value) -> Self {
        Self { labels: Vec::new(), value }
    }
}

/// Point-in-time view of one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub samples: Vec<Sample>,
}

impl MetricFamily {
    pub fn new(desc: &Desc, samples: Vec<Sample>) -> Self {
        Self {
            name: desc.name.clone(),
            help: desc.help.clone(),
            kind: desc.kind,
            samples,
        }
    }

    /// Single unlabeled gauge, the shape every process metric takes.
    pub fn gauge(name: impl Into<String>, help: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            kind: MetricKind::Gauge,
            samples: vec![Sample::unlabeled(Value::Float(value))],
        }
    }

    /// Single unlabeled counter with a fractional value (CPU seconds).
    pub fn counter(name: impl Into<String>, help: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            kind: MetricKind::Counter,
            samples: vec![Sample::unlabeled(Value::Float(value))],
        }
    }
}
