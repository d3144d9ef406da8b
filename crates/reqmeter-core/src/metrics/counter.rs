//! Counters with labels.
//!
//! `CounterVec` takes labels as `(name, value)` pairs and checks them at run
//! time. `Counter<L>` wraps one with a [`LabelSet`] record so the label shape
//! is fixed by the type and increments cannot fail.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::error::Result;
use crate::metrics::family::{Desc, MetricFamily, MetricKind, Sample, Value};
use crate::metrics::labels::{self, LabelSet};
use crate::metrics::registry::Collector;

pub struct CounterVec {
    desc: Desc,
    label_names: Vec<String>,
    // Keyed by label values in `label_names` order.
    map: DashMap<Vec<String>, AtomicU64>,
}

impl CounterVec {
    pub fn new(name: &str, help: &str, label_names: &[&str]) -> Result<Self> {
        labels::validate_metric_name(name)?;
        labels::validate_label_names(label_names)?;
        Ok(Self {
            desc: Desc {
                name: name.to_string(),
                help: help.to_string(),
                kind: MetricKind::Counter,
            },
            label_names: label_names.iter().map(|n| n.to_string()).collect(),
            map: DashMap::new(),
        })
    }

    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) -> Result<()> {
        self.add(labels, 1)
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: &[(&str, &str)], v: u64) -> Result<()> {
        let key = labels::ordered_values(&self.label_names, labels)?;
        self.add_values(key, v);
        Ok(())
    }

    /// Current value for a label combination; `None` if never incremented.
    pub fn get(&self, labels: &[(&str, &str)]) -> Result<Option<u64>> {
        let key = labels::ordered_values(&self.label_names, labels)?;
        Ok(self.map.get(&key).map(|c| c.load(Ordering::Relaxed)))
    }

    pub(crate) fn add_values(&self, key: Vec<String>, v: u64) {
        // Fast path avoids cloning the key into a write lock for existing tuples.
        if let Some(counter) = self.map.get(&key) {
            counter.fetch_add(v, Ordering::Relaxed);
            return;
        }
        let counter = self.map.entry(key).or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    pub(crate) fn get_values(&self, key: &[String]) -> Option<u64> {
        self.map.get(key).map(|c| c.load(Ordering::Relaxed))
    }

    /// Snapshot ordered by label values so repeated renders are stable.
    pub fn family(&self) -> MetricFamily {
        let mut rows: Vec<(Vec<String>, u64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        let samples = rows
            .into_iter()
            .map(|(values, v)| Sample {
                labels: self.label_names.iter().cloned().zip(values).collect(),
                value: Value::Int(v),
            })
            .collect();
        MetricFamily::new(&self.desc, samples)
    }
}

impl Collector for CounterVec {
    fn describe(&self) -> Vec<Desc> {
        vec![self.desc.clone()]
    }

    fn collect(&self) -> Result<Vec<MetricFamily>> {
        Ok(vec![self.family()])
    }
}

/// Counter whose labels are a fixed-shape record.
///
/// Cheap to clone; clones share the same values.
pub struct Counter<L> {
    inner: Arc<CounterVec>,
    _labels: PhantomData<fn(&L)>,
}

impl<L> Clone for Counter<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _labels: PhantomData,
        }
    }
}

impl<L: LabelSet> Counter<L> {
    pub fn new(name: &str, help: &str) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(CounterVec::new(name, help, L::NAMES)?),
            _labels: PhantomData,
        })
    }

    pub fn inc(&self, labels: &L) {
        self.add(labels, 1);
    }

    pub fn add(&self, labels: &L, v: u64) {
        self.inner.add_values(Self::key(labels), v);
    }

    pub fn get(&self, labels: &L) -> Option<u64> {
        self.inner.get_values(&Self::key(labels))
    }

    fn key(labels: &L) -> Vec<String> {
        labels.values().into_iter().map(|v| v.into_owned()).collect()
    }
}

impl<L: LabelSet> Collector for Counter<L> {
    fn describe(&self) -> Vec<Desc> {
        self.inner.describe()
    }

    fn collect(&self) -> Result<Vec<MetricFamily>> {
        self.inner.collect()
    }
}
