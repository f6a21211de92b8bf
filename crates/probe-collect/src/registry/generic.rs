use crate::collaborators::WatchEvent;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tracing::{debug, info, warn};

/// `DRAINED -> LISTENING -> TEARDOWN -> BACKOFF -> LISTENING`. `Stop()`
/// reachable from any state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistryState {
    Drained,
    Listening,
    Teardown,
    Backoff,
}

pub type SubscribeFuture<K, V> = Pin<Box<dyn Future<Output = mpsc::Receiver<(K, WatchEvent<V>)>> + Send>>;

/// Reconnects and re-subscribes `subscribe` forever until `stop()` is
/// called; resets its maps before every (re)subscribe so a stale entry from
/// a previous session can never leak into the next. One writer (this loop),
/// many readers (`walk`), guarded by a `parking_lot::RwLock`.
pub struct EventRegistry<K, V>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    entries: RwLock<BTreeMap<K, V>>,
    state: RwLock<RegistryState>,
    quit: Notify,
    stopped: AtomicBool,
    kind: &'static str,
    on_event: RwLock<Option<Arc<dyn Fn(&K, &WatchEvent<V>) + Send + Sync>>>,
}

impl<K, V> EventRegistry<K, V>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(kind: &'static str) -> Arc<Self> {
        Arc::new(Self {
            entries: RwLock::new(BTreeMap::new()),
            state: RwLock::new(RegistryState::Drained),
            quit: Notify::new(),
            stopped: AtomicBool::new(false),
            kind,
            on_event: RwLock::new(None),
        })
    }

    /// Install a side-effect hook invoked with every raw event before it's
    /// applied to the map — the container registry uses this to start/stop
    /// per-container stats streams as containers come and go.
    pub fn set_on_event(&self, hook: Arc<dyn Fn(&K, &WatchEvent<V>) + Send + Sync>) {
        *self.on_event.write() = Some(hook);
    }

    pub fn state(&self) -> RegistryState {
        *self.state.read()
    }

    fn set_state(&self, state: RegistryState) {
        *self.state.write() = state;
    }

    /// Apply `visit` to every entry under a read lock. Callbacks must not
    /// block on I/O or call back into the registry — the lock is held for
    /// the duration of the walk.
    pub fn walk(&self, mut visit: impl FnMut(&K, &V)) {
        let entries = self.entries.read();
        for (key, value) in entries.iter() {
            visit(key, value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Request shutdown. Idempotent; does not block for the listener task
    /// to finish — callers awaiting full drain should hold on to the
    /// `JoinHandle` spawned alongside this registry.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.quit.notify_waiters();
    }

    fn quit_requested(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Drives the registry's state machine: reset-before-subscribe, apply
    /// events until the stream closes or `stop()` fires, teardown, back off,
    /// repeat. Intended to be the body of a spawned task; returns once
    /// `stop()` has been called.
    pub async fn run<F>(self: Arc<Self>, subscribe: F, backoff: Duration)
    where
        F: Fn() -> SubscribeFuture<K, V> + Send + Sync + 'static,
    {
        while !self.quit_requested() {
            self.set_state(RegistryState::Listening);
            self.entries.write().clear();
            info!(kind = self.kind, "registry entering LISTENING");

            let mut rx = subscribe().await;

            loop {
                tokio::select! {
                    _ = self.quit.notified() => {
                        self.set_state(RegistryState::Teardown);
                        info!(kind = self.kind, "registry stopped");
                        return;
                    }
                    event = rx.recv() => {
                        match event {
                            Some((key, watch_event)) => self.apply_event(key, watch_event),
                            None => break,
                        }
                    }
                }
            }

            self.set_state(RegistryState::Teardown);
            warn!(kind = self.kind, "event stream closed, backing off");
            self.set_state(RegistryState::Backoff);
            tokio::time::sleep(backoff).await;
        }
    }

    fn apply_event(&self, key: K, event: WatchEvent<V>) {
        if let Some(hook) = self.on_event.read().as_ref() {
            hook(&key, &event);
        }
        let mut entries = self.entries.write();
        match event {
            WatchEvent::Added(value) | WatchEvent::Modified(value) => {
                entries.insert(key, value);
            }
            WatchEvent::Deleted(_) => {
                entries.remove(&key);
            }
        }
        debug!(kind = self.kind, count = entries.len(), "registry applied event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn subscribe_once(
        events: Vec<(&'static str, WatchEvent<i32>)>,
        attempts: Arc<AtomicUsize>,
    ) -> impl Fn() -> SubscribeFuture<&'static str, i32> {
        move || {
            attempts.fetch_add(1, Ordering::SeqCst);
            let events = events.clone();
            Box::pin(async move {
                let (tx, rx) = mpsc::channel(events.len().max(1));
                for event in events {
                    tx.send(event).await.ok();
                }
                rx
            })
        }
    }

    #[tokio::test]
    async fn applies_added_and_deleted_events() {
        let registry = EventRegistry::<&'static str, i32>::new("test");
        let attempts = Arc::new(AtomicUsize::new(0));
        let subscribe = subscribe_once(
            vec![
                ("a", WatchEvent::Added(1)),
                ("b", WatchEvent::Added(2)),
                ("a", WatchEvent::Deleted(1)),
            ],
            attempts,
        );

        let r = registry.clone();
        let handle = tokio::spawn(async move { r.run(subscribe, Duration::from_millis(1)).await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        registry.stop();
        handle.await.unwrap();

        assert_eq!(registry.len(), 1);
        registry.walk(|k, v| assert_eq!((*k, *v), ("b", 2)));
    }

    #[tokio::test]
    async fn resets_maps_before_each_resubscribe() {
        let registry = EventRegistry::<&'static str, i32>::new("test");
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = attempts.clone();
        let subscribe = move || -> SubscribeFuture<&'static str, i32> {
            let n = attempts_clone.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                let (tx, rx) = mpsc::channel(2);
                if n == 0 {
                    tx.send(("x", WatchEvent::Added(99))).await.ok();
                    // rx is dropped here when this closure returns, closing the stream
                }
                rx
            })
        };

        let r = registry.clone();
        let handle = tokio::spawn(async move { r.run(subscribe, Duration::from_millis(5)).await });

        tokio::time::sleep(Duration::from_millis(30)).await;
        registry.stop();
        handle.await.unwrap();

        // x from the first subscription was torn down; the second subscription's
        // reset must have cleared it and the stream closed immediately this time.
        assert!(registry.is_empty());
        assert!(attempts.load(Ordering::SeqCst) >= 2);
    }
}
