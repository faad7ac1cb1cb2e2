//! Debounced, lifecycle-gated fold state observer.
//!
//! While its lifecycle is started, the observer holds one subscription to the
//! layout source and runs a single session task over it. Every raw snapshot is
//! classified and becomes the pending candidate, restarting the debounce
//! window; when the window elapses without a newer snapshot the candidate is
//! committed if it differs from the current state.
//!
//! ```text
//!            start                 raw event            raw event
//! Inactive ─────────▶ ActiveIdle ────────────▶ ActivePending ◀──┐ (restart window)
//!    ▲                   ▲                        │  │          │
//!    │ stop / source end │   window elapsed       │  └──────────┘
//!    │                   └────────────────────────┘
//!    └──────────────────────── stop drops the candidate
//! ```

use crate::config::ObserverConfig;
use crate::error::{ObserverError, Result};
use crate::lifecycle::{Lifecycle, LifecycleObserver};
use foldsense_events::{log_messages, FoldStateChanged, LogSinkRef};
use foldsense_posture::{classify, FoldState, HostId, LayoutSourceRef, RawLayoutSnapshot};
use futures::stream::BoxStream;
use futures::StreamExt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Observable phase of a [`DebouncedFoldObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObserverPhase {
    /// No subscription.
    Inactive,
    /// Subscribed, no debounce window open.
    ActiveIdle,
    /// Subscribed, a candidate waits for its window to elapse.
    ActivePending,
    /// The host was destroyed; the observer never starts again.
    Destroyed,
}

/// Fold state observer attached to one host lifecycle.
pub struct DebouncedFoldObserver {
    shared: Arc<Shared>,
    lifecycle: Lifecycle,
    source: LayoutSourceRef,
}

struct Shared {
    host: HostId,
    config: ObserverConfig,
    sink: LogSinkRef,
    state_tx: watch::Sender<FoldState>,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    session: Option<Session>,
    pending: Option<FoldState>,
    generation: u64,
    destroyed: bool,
}

struct Session {
    generation: u64,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Inner {
    fn is_current(&self, generation: u64) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.generation == generation && !s.cancel.is_cancelled())
    }

    /// Drop the subscription and any pending candidate.
    fn end_session(&mut self) -> Option<u64> {
        self.pending = None;
        let session = self.session.take()?;
        session.cancel.cancel();
        session.task.abort();
        Some(session.generation)
    }
}

impl DebouncedFoldObserver {
    /// Create an observer for `host` and attach it to `lifecycle`.
    ///
    /// If the lifecycle is already started, observation begins immediately,
    /// which requires a tokio runtime on the calling thread.
    ///
    /// # Errors
    ///
    /// - `ObserverError::LifecycleDestroyed` if the lifecycle is destroyed
    /// - `ObserverError::NoRuntime` if the lifecycle is started outside a runtime
    pub fn attach(
        lifecycle: &Lifecycle,
        host: HostId,
        source: LayoutSourceRef,
        sink: LogSinkRef,
        config: ObserverConfig,
    ) -> Result<Arc<Self>> {
        if lifecycle.phase().is_active() {
            Handle::try_current().map_err(|e| ObserverError::NoRuntime(e.to_string()))?;
        }

        let observer = Arc::new(Self {
            shared: Arc::new(Shared {
                host,
                config,
                sink,
                state_tx: watch::Sender::new(FoldState::Unknown),
                inner: Mutex::new(Inner::default()),
            }),
            lifecycle: lifecycle.clone(),
            source,
        });
        lifecycle.add_observer(observer.clone())?;
        Ok(observer)
    }

    pub fn host(&self) -> &HostId {
        &self.shared.host
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// Last committed state; `Unknown` until the first commit.
    pub fn current_state(&self) -> FoldState {
        *self.shared.state_tx.borrow()
    }

    pub fn phase(&self) -> ObserverPhase {
        let inner = self.shared.lock();
        if inner.destroyed {
            return ObserverPhase::Destroyed;
        }
        match (&inner.session, inner.pending) {
            (None, _) => ObserverPhase::Inactive,
            (Some(_), None) => ObserverPhase::ActiveIdle,
            (Some(_), Some(_)) => ObserverPhase::ActivePending,
        }
    }

    /// Candidate waiting for its debounce window, if any.
    pub fn pending_candidate(&self) -> Option<FoldState> {
        self.shared.lock().pending
    }

    /// Committed states for as long as the current active period lasts.
    ///
    /// Lazy: on first poll it yields the committed state, then one item per
    /// committed transition. It ends when the observer stops. Polled while
    /// inactive, it yields the committed state once and ends. Call again after
    /// a restart for a fresh sequence.
    pub fn state_stream(&self) -> BoxStream<'static, FoldState> {
        let shared = Arc::clone(&self.shared);

        Box::pin(async_stream::stream! {
            let mut rx = shared.state_tx.subscribe();
            let session = shared.session_token();
            let committed = *rx.borrow_and_update();
            yield committed;

            if let Some(token) = session {
                loop {
                    let next = tokio::select! {
                        biased;
                        _ = token.cancelled() => None,
                        changed = rx.changed() => changed.ok().map(|()| *rx.borrow_and_update()),
                    };
                    match next {
                        Some(state) => yield state,
                        None => break,
                    }
                }
            }
        })
    }

    /// Replay-latest view of committed states, not gated by the lifecycle.
    pub fn watch_state(&self) -> watch::Receiver<FoldState> {
        self.shared.state_tx.subscribe()
    }

    /// Release the subscription and refuse to start again.
    ///
    /// The lifecycle's `destroy` does this; it is exposed for owners that
    /// discard an observer before its host goes away.
    pub fn shutdown(&self) {
        let mut inner = self.shared.lock();
        inner.destroyed = true;
        if let Some(generation) = inner.end_session() {
            tracing::debug!(host = %self.shared.host, generation, "fold observation shut down");
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.shared.lock().destroyed
    }

    fn start(&self) {
        let mut inner = self.shared.lock();
        if inner.destroyed || inner.session.is_some() {
            return;
        }

        let runtime = match Handle::try_current() {
            Ok(handle) => handle,
            Err(err) => {
                tracing::warn!(host = %self.shared.host, error = %err, "no tokio runtime, fold observation not started");
                return;
            }
        };

        inner.generation += 1;
        let generation = inner.generation;
        let cancel = CancellationToken::new();
        let updates = self.source.layout_updates(&self.shared.host);
        let task = runtime.spawn(run_session(
            Arc::clone(&self.shared),
            generation,
            updates,
            cancel.clone(),
        ));

        inner.pending = None;
        inner.session = Some(Session {
            generation,
            cancel,
            task,
        });
        tracing::debug!(host = %self.shared.host, generation, "fold observation started");
    }

    fn stop(&self) {
        let mut inner = self.shared.lock();
        if let Some(generation) = inner.end_session() {
            tracing::debug!(host = %self.shared.host, generation, "fold observation stopped");
        }
    }
}

impl LifecycleObserver for DebouncedFoldObserver {
    fn on_start(&self) {
        self.start();
    }

    fn on_stop(&self) {
        self.stop();
    }

    fn on_destroy(&self) {
        self.shutdown();
    }
}

impl Drop for DebouncedFoldObserver {
    fn drop(&mut self) {
        self.shared.lock().end_session();
    }
}

impl std::fmt::Debug for DebouncedFoldObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebouncedFoldObserver")
            .field("host", &self.shared.host)
            .field("state", &self.current_state())
            .field("phase", &self.phase())
            .finish()
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn session_token(&self) -> Option<CancellationToken> {
        self.lock().session.as_ref().map(|s| s.cancel.clone())
    }

    /// Returns false once the session is no longer current.
    fn set_pending(&self, generation: u64, candidate: FoldState) -> bool {
        let mut inner = self.lock();
        if !inner.is_current(generation) {
            return false;
        }
        inner.pending = Some(candidate);
        true
    }

    /// Commit the pending candidate if it changes the state.
    ///
    /// Runs under the lock so a concurrent stop either happens before (and the
    /// generation check fails) or after the commit, never during it.
    fn commit_pending(&self, generation: u64) -> bool {
        let mut inner = self.lock();
        if !inner.is_current(generation) {
            return false;
        }
        let Some(candidate) = inner.pending.take() else {
            return true;
        };

        let old = *self.state_tx.borrow();
        if candidate == old {
            return true;
        }

        self.state_tx.send_replace(candidate);
        let change = FoldStateChanged::new(self.host.clone(), old, candidate);
        self.sink
            .log(&self.config.log_tag, log_messages::STATE_CHANGED, change.to_args());
        true
    }

    fn source_ended(&self, generation: u64) {
        let mut inner = self.lock();
        if inner.is_current(generation) {
            inner.end_session();
            tracing::warn!(host = %self.host, generation, "layout source ended, fold observation stopped");
        }
    }
}

async fn run_session(
    shared: Arc<Shared>,
    generation: u64,
    mut updates: BoxStream<'static, RawLayoutSnapshot>,
    cancel: CancellationToken,
) {
    let debounce = shared.config.debounce;
    let mut deadline: Option<Instant> = None;

    loop {
        let timer = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now));

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            next = updates.next() => match next {
                Some(snapshot) => {
                    // Last value wins: overwrite the candidate and restart the window.
                    if !shared.set_pending(generation, classify(&snapshot)) {
                        return;
                    }
                    deadline = Some(Instant::now() + debounce);
                }
                None => {
                    shared.source_ended(generation);
                    return;
                }
            },
            _ = timer, if deadline.is_some() => {
                deadline = None;
                if !shared.commit_pending(generation) {
                    return;
                }
            }
        }
    }
}
