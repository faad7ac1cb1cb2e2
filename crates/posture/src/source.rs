//! Raw layout event sources.
//!
//! A `LayoutSource` is owned by the platform side. Observers only subscribe
//! to it and drop the stream to unsubscribe.

use crate::feature::RawLayoutSnapshot;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

/// Default per-host buffer of the broadcast bridge.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Identifies the host window whose layout is observed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostId(String);

impl HostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of raw layout snapshots for a host window.
pub trait LayoutSource: Send + Sync {
    /// Subscribe to layout updates for `host`.
    ///
    /// The subscription is live as soon as this returns. Dropping the stream
    /// unsubscribes. A stream that ends means the source terminated, either
    /// normally or because of a platform fault.
    fn layout_updates(&self, host: &HostId) -> BoxStream<'static, RawLayoutSnapshot>;
}

/// Type alias for shared layout source reference.
pub type LayoutSourceRef = Arc<dyn LayoutSource>;

/// Source for platforms without foldable displays. Never produces anything
/// and never ends.
pub struct NullLayoutSource;

impl LayoutSource for NullLayoutSource {
    fn layout_updates(&self, _host: &HostId) -> BoxStream<'static, RawLayoutSnapshot> {
        futures::stream::pending().boxed()
    }
}

/// Bridge between a platform callback and async subscribers.
///
/// The platform adapter calls [`publish`](Self::publish) from its layout
/// callback. Each subscriber sees the snapshots published after it
/// subscribed; nothing is buffered for hosts nobody listens to.
pub struct BroadcastLayoutSource {
    capacity: usize,
    channels: Mutex<HashMap<HostId, broadcast::Sender<RawLayoutSnapshot>>>,
}

impl Default for BroadcastLayoutSource {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl BroadcastLayoutSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// Deliver a snapshot to every current subscriber of `host`.
    ///
    /// Returns the number of subscribers that will receive it.
    pub fn publish(&self, host: &HostId, snapshot: RawLayoutSnapshot) -> usize {
        let channels = self.lock();
        match channels.get(host) {
            Some(tx) => tx.send(snapshot).unwrap_or(0),
            None => 0,
        }
    }

    /// End every open stream for `host`.
    ///
    /// Later subscriptions start a fresh channel.
    pub fn close(&self, host: &HostId) {
        if self.lock().remove(host).is_some() {
            tracing::debug!(%host, "layout source closed");
        }
    }

    /// Number of live subscriptions for `host`.
    pub fn subscriber_count(&self, host: &HostId) -> usize {
        self.lock()
            .get(host)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<HostId, broadcast::Sender<RawLayoutSnapshot>>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LayoutSource for BroadcastLayoutSource {
    fn layout_updates(&self, host: &HostId) -> BoxStream<'static, RawLayoutSnapshot> {
        // Subscribe eagerly so snapshots published before the first poll are kept.
        let mut rx = {
            let mut channels = self.lock();
            channels
                .entry(host.clone())
                .or_insert_with(|| broadcast::channel(self.capacity).0)
                .subscribe()
        };
        let host = host.clone();

        Box::pin(async_stream::stream! {
            loop {
                match rx.recv().await {
                    Ok(snapshot) => yield snapshot,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(%host, skipped, "layout subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{DisplayFeature, HingeState};

    fn flat() -> RawLayoutSnapshot {
        RawLayoutSnapshot::empty().with_feature(DisplayFeature::fold(HingeState::Flat))
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_dropped() {
        let source = BroadcastLayoutSource::new();
        let host = HostId::new("main");

        assert_eq!(source.publish(&host, flat()), 0);

        let mut updates = source.layout_updates(&host);
        assert_eq!(source.subscriber_count(&host), 1);
        assert_eq!(source.publish(&host, RawLayoutSnapshot::empty()), 1);
        assert_eq!(updates.next().await, Some(RawLayoutSnapshot::empty()));
    }

    #[tokio::test]
    async fn test_hosts_are_isolated() {
        let source = BroadcastLayoutSource::new();
        let main = HostId::new("main");
        let compose = HostId::new("compose");

        let mut main_updates = source.layout_updates(&main);
        let _compose_updates = source.layout_updates(&compose);

        assert_eq!(source.publish(&compose, flat()), 1);
        assert_eq!(source.publish(&main, RawLayoutSnapshot::empty()), 1);
        assert_eq!(main_updates.next().await, Some(RawLayoutSnapshot::empty()));
    }

    #[tokio::test]
    async fn test_dropping_stream_unsubscribes() {
        let source = BroadcastLayoutSource::new();
        let host = HostId::new("main");

        let updates = source.layout_updates(&host);
        assert_eq!(source.subscriber_count(&host), 1);
        drop(updates);
        assert_eq!(source.subscriber_count(&host), 0);
    }

    #[tokio::test]
    async fn test_close_ends_streams() {
        let source = BroadcastLayoutSource::new();
        let host = HostId::new("main");

        let mut updates = source.layout_updates(&host);
        source.publish(&host, flat());
        source.close(&host);

        assert_eq!(updates.next().await, Some(flat()));
        assert_eq!(updates.next().await, None);
        assert_eq!(source.subscriber_count(&host), 0);
    }

    #[tokio::test]
    async fn test_lagged_subscriber_keeps_latest() {
        let source = BroadcastLayoutSource::with_capacity(1);
        let host = HostId::new("main");

        let mut updates = source.layout_updates(&host);
        source.publish(&host, RawLayoutSnapshot::empty());
        source.publish(&host, flat());

        assert_eq!(updates.next().await, Some(flat()));
    }

    #[tokio::test]
    async fn test_null_source_is_silent() {
        let source = NullLayoutSource;
        let mut updates = source.layout_updates(&HostId::new("main"));
        let next = futures::FutureExt::now_or_never(updates.next());
        assert!(next.is_none());
    }
}
