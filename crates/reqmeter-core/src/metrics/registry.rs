//! Metric registry.
//!
//! Collectors are kept in registration order and render in that order. Names
//! are unique across every family of every collector; a rejected registration
//! leaves the registry untouched.

use std::collections::HashSet;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{ReqMeterError, Result};
use crate::metrics::encode::{self, TEXT_CONTENT_TYPE};
use crate::metrics::family::{Desc, MetricFamily};

/// Anything the registry can ask for metric families.
pub trait Collector: Send + Sync {
    /// Families this collector exposes. Must be stable for its lifetime.
    fn describe(&self) -> Vec<Desc>;

    /// Current values. Families missing from the result are skipped.
    fn collect(&self) -> Result<Vec<MetricFamily>>;
}

#[derive(Default)]
pub struct Registry {
    inner: RwLock<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    collectors: Vec<Arc<dyn Collector>>,
    names: HashSet<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, RegistryInner>> {
        self.inner
            .read()
            .map_err(|_| ReqMeterError::Internal("registry lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, RegistryInner>> {
        self.inner
            .write()
            .map_err(|_| ReqMeterError::Internal("registry lock poisoned".into()))
    }

    /// Add a collector. Fails with `DuplicateName` on any name collision.
    pub fn register(&self, collector: Arc<dyn Collector>) -> Result<()> {
        let descs = collector.describe();

        let mut inner = self.write()?;

        let mut incoming = HashSet::with_capacity(descs.len());
        for d in &descs {
            if inner.names.contains(&d.name) || !incoming.insert(d.name.clone()) {
                return Err(ReqMeterError::DuplicateName(d.name.clone()));
            }
        }

        inner.names.extend(incoming);
        inner.collectors.push(collector);
        tracing::debug!(families = descs.len(), "collector registered");
        Ok(())
    }

    /// Remove the collector that exposes `name`. Returns whether one was removed.
    pub fn unregister(&self, name: &str) -> Result<bool> {
        // Collectors are described outside the lock, same as in `register`.
        let collectors = self.read()?.collectors.clone();
        let Some((target, descs)) = collectors.into_iter().find_map(|c| {
            let descs = c.describe();
            descs.iter().any(|d| d.name == name).then_some((c, descs))
        }) else {
            return Ok(false);
        };

        let mut inner = self.write()?;
        let Some(pos) = inner
            .collectors
            .iter()
            .position(|c| Arc::ptr_eq(c, &target))
        else {
            // Removed by a concurrent caller.
            return Ok(false);
        };
        inner.collectors.remove(pos);
        for d in descs {
            inner.names.remove(&d.name);
        }
        Ok(true)
    }

    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.read()?.names.contains(name))
    }

    /// Number of registered metric families.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.names.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.names.is_empty())
    }

    /// Media type of [`render`](Self::render) output.
    pub fn content_type(&self) -> &'static str {
        TEXT_CONTENT_TYPE
    }

    /// Snapshot every collector in registration order.
    pub fn gather(&self) -> Result<Vec<MetricFamily>> {
        let collectors: Vec<Arc<dyn Collector>> = self.read()?.collectors.clone();

        let mut out = Vec::new();
        for c in collectors {
            out.extend(c.collect()?);
        }
        Ok(out)
    }

    /// Render all metrics in the text exposition format.
    pub fn render(&self) -> Result<String> {
        let families = self.gather()?;
        Ok(encode::encode(&families))
    }
}
