//! Per-host cache of observer instances.

use crate::config::ObserverConfig;
use crate::error::Result;
use crate::lifecycle::Lifecycle;
use crate::observer::DebouncedFoldObserver;
use foldsense_events::LogSinkRef;
use foldsense_posture::{HostId, LayoutSourceRef};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cache of live observers keyed by host.
///
/// Owned by whoever wires hosts together and passed where needed; there is
/// no global instance.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: Mutex<HashMap<HostId, Arc<DebouncedFoldObserver>>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the live observer for `host` on `lifecycle`, or attach a new one.
    ///
    /// A cached observer that was destroyed, or that belongs to an earlier
    /// lifecycle of the same host, is replaced.
    pub fn get_or_create(
        &self,
        lifecycle: &Lifecycle,
        host: &HostId,
        source: LayoutSourceRef,
        sink: LogSinkRef,
        config: ObserverConfig,
    ) -> Result<Arc<DebouncedFoldObserver>> {
        let mut observers = self.lock();
        if let Some(existing) = observers.get(host) {
            if !existing.is_destroyed() && existing.lifecycle().ptr_eq(lifecycle) {
                return Ok(Arc::clone(existing));
            }
        }

        let observer = DebouncedFoldObserver::attach(lifecycle, host.clone(), source, sink, config)?;
        if let Some(replaced) = observers.insert(host.clone(), Arc::clone(&observer)) {
            tracing::debug!(%host, "replacing cached fold observer");
            replaced.shutdown();
        }
        Ok(observer)
    }

    /// Cached live observer for `host`.
    pub fn get(&self, host: &HostId) -> Option<Arc<DebouncedFoldObserver>> {
        self.lock()
            .get(host)
            .filter(|observer| !observer.is_destroyed())
            .cloned()
    }

    pub fn remove(&self, host: &HostId) -> Option<Arc<DebouncedFoldObserver>> {
        self.lock().remove(host)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Shut down and forget every cached observer.
    ///
    /// Test isolation only: production code relies on host lifecycles.
    pub fn reset(&self) {
        let drained: Vec<_> = self.lock().drain().map(|(_, observer)| observer).collect();
        for observer in drained {
            observer.shutdown();
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<HostId, Arc<DebouncedFoldObserver>>> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
