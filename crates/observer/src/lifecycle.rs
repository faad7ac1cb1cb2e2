//! Host lifecycle signal.
//!
//! A [`Lifecycle`] mirrors the start/stop callbacks of the hosting screen and
//! fans them out to attached [`LifecycleObserver`]s. Transitions are applied
//! synchronously: when `stop()` returns, every observer has released its
//! resources.

use crate::error::{ObserverError, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::watch;

/// Phase of a host lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecyclePhase {
    /// Created, never started.
    #[default]
    Initialized,
    /// Visible and active.
    Started,
    /// Not active; may start again.
    Stopped,
    /// Terminal.
    Destroyed,
}

impl LifecyclePhase {
    pub fn is_active(self) -> bool {
        matches!(self, LifecyclePhase::Started)
    }
}

/// Receiver of lifecycle transitions.
///
/// Callbacks run on the thread that drives the lifecycle. They must not drive
/// the same lifecycle from inside a callback.
pub trait LifecycleObserver: Send + Sync {
    fn on_start(&self);

    fn on_stop(&self);

    /// Called once, after `on_stop` if the lifecycle was active.
    fn on_destroy(&self) {}
}

/// Cloneable handle to a host lifecycle.
#[derive(Clone, Default)]
pub struct Lifecycle {
    inner: Arc<LifecycleInner>,
}

struct LifecycleInner {
    phase: watch::Sender<LifecyclePhase>,
    observers: Mutex<Vec<Weak<dyn LifecycleObserver>>>,
    // Serializes transitions and observer registration.
    transition: Mutex<()>,
}

impl Default for LifecycleInner {
    fn default() -> Self {
        Self {
            phase: watch::Sender::new(LifecyclePhase::Initialized),
            observers: Mutex::new(Vec::new()),
            transition: Mutex::new(()),
        }
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> LifecyclePhase {
        *self.inner.phase.borrow()
    }

    /// Async view of the phase.
    pub fn watch(&self) -> watch::Receiver<LifecyclePhase> {
        self.inner.phase.subscribe()
    }

    /// Whether both handles refer to the same lifecycle.
    pub fn ptr_eq(&self, other: &Lifecycle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Attach an observer. It is held weakly.
    ///
    /// If the lifecycle is already started, `on_start` is called before this
    /// returns.
    pub fn add_observer(&self, observer: Arc<dyn LifecycleObserver>) -> Result<()> {
        let _transition = self.lock_transition();
        let phase = self.phase();
        if phase == LifecyclePhase::Destroyed {
            return Err(ObserverError::LifecycleDestroyed);
        }

        self.lock_observers().push(Arc::downgrade(&observer));
        if phase.is_active() {
            observer.on_start();
        }
        Ok(())
    }

    /// Enter the active phase. No-op if already started or destroyed.
    pub fn start(&self) {
        let _transition = self.lock_transition();
        match self.phase() {
            LifecyclePhase::Initialized | LifecyclePhase::Stopped => {}
            phase => {
                tracing::trace!(?phase, "lifecycle start ignored");
                return;
            }
        }

        self.inner.phase.send_replace(LifecyclePhase::Started);
        for observer in self.live_observers() {
            observer.on_start();
        }
    }

    /// Leave the active phase. No-op unless started.
    pub fn stop(&self) {
        let _transition = self.lock_transition();
        if !self.phase().is_active() {
            tracing::trace!(phase = ?self.phase(), "lifecycle stop ignored");
            return;
        }
        self.stop_locked();
    }

    /// Terminate the lifecycle, stopping it first if needed.
    pub fn destroy(&self) {
        let _transition = self.lock_transition();
        match self.phase() {
            LifecyclePhase::Destroyed => return,
            LifecyclePhase::Started => self.stop_locked(),
            LifecyclePhase::Initialized | LifecyclePhase::Stopped => {}
        }

        self.inner.phase.send_replace(LifecyclePhase::Destroyed);
        let observers = self.live_observers();
        self.lock_observers().clear();
        for observer in observers {
            observer.on_destroy();
        }
    }

    fn stop_locked(&self) {
        self.inner.phase.send_replace(LifecyclePhase::Stopped);
        for observer in self.live_observers() {
            observer.on_stop();
        }
    }

    /// Upgrade live observers, pruning dropped ones.
    fn live_observers(&self) -> Vec<Arc<dyn LifecycleObserver>> {
        let mut observers = self.lock_observers();
        observers.retain(|weak| weak.strong_count() > 0);
        observers.iter().filter_map(Weak::upgrade).collect()
    }

    fn lock_observers(&self) -> MutexGuard<'_, Vec<Weak<dyn LifecycleObserver>>> {
        self.inner
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_transition(&self) -> MutexGuard<'_, ()> {
        self.inner
            .transition
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifecycle")
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<&'static str>>,
    }

    impl Recorder {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl LifecycleObserver for Recorder {
        fn on_start(&self) {
            self.calls.lock().unwrap().push("start");
        }

        fn on_stop(&self) {
            self.calls.lock().unwrap().push("stop");
        }

        fn on_destroy(&self) {
            self.calls.lock().unwrap().push("destroy");
        }
    }

    #[test]
    fn test_transitions_are_dispatched() {
        let lifecycle = Lifecycle::new();
        let recorder = Arc::new(Recorder::default());
        lifecycle.add_observer(recorder.clone()).unwrap();

        lifecycle.start();
        lifecycle.stop();
        lifecycle.start();
        lifecycle.destroy();

        assert_eq!(
            recorder.calls(),
            vec!["start", "stop", "start", "stop", "destroy"]
        );
        assert_eq!(lifecycle.phase(), LifecyclePhase::Destroyed);
    }

    #[test]
    fn test_out_of_order_events_are_noops() {
        let lifecycle = Lifecycle::new();
        let recorder = Arc::new(Recorder::default());
        lifecycle.add_observer(recorder.clone()).unwrap();

        lifecycle.stop();
        lifecycle.start();
        lifecycle.start();
        lifecycle.stop();
        lifecycle.stop();

        assert_eq!(recorder.calls(), vec!["start", "stop"]);
        assert_eq!(lifecycle.phase(), LifecyclePhase::Stopped);
    }

    #[test]
    fn test_nothing_after_destroy() {
        let lifecycle = Lifecycle::new();
        let recorder = Arc::new(Recorder::default());
        lifecycle.add_observer(recorder.clone()).unwrap();

        lifecycle.destroy();
        lifecycle.start();
        lifecycle.destroy();

        assert_eq!(recorder.calls(), vec!["destroy"]);
        assert_eq!(
            lifecycle.add_observer(Arc::new(Recorder::default())),
            Err(ObserverError::LifecycleDestroyed)
        );
    }

    #[test]
    fn test_late_observer_is_started() {
        let lifecycle = Lifecycle::new();
        lifecycle.start();

        let recorder = Arc::new(Recorder::default());
        lifecycle.add_observer(recorder.clone()).unwrap();

        assert_eq!(recorder.calls(), vec!["start"]);
    }

    #[test]
    fn test_dropped_observer_is_not_called() {
        let lifecycle = Lifecycle::new();
        let kept = Arc::new(Recorder::default());
        let dropped = Arc::new(Recorder::default());
        lifecycle.add_observer(kept.clone()).unwrap();
        lifecycle.add_observer(dropped.clone()).unwrap();
        drop(dropped);

        lifecycle.start();

        assert_eq!(kept.calls(), vec!["start"]);
        assert_eq!(lifecycle.live_observers().len(), 1);
    }

    #[test]
    fn test_watch_follows_phase() {
        let lifecycle = Lifecycle::new();
        let rx = lifecycle.watch();
        assert_eq!(*rx.borrow(), LifecyclePhase::Initialized);

        lifecycle.start();
        assert_eq!(*rx.borrow(), LifecyclePhase::Started);
        assert!(lifecycle.clone().ptr_eq(&lifecycle));
        assert!(!lifecycle.ptr_eq(&Lifecycle::new()));
    }
}
