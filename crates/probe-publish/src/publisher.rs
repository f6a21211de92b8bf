use crate::error::PublisherError;
use crate::sub::SubPublisher;
use parking_lot::{Mutex, RwLock};
use probe_wire::ReportEnvelope;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{info, warn};

/// A sub-publisher evicted after this many consecutive failures. The
/// resolver will `add` it back once it re-discovers the target.
const MAX_CONSECUTIVE_FAILURES: u32 = 5;

struct Entry {
    sub: Arc<dyn SubPublisher>,
    consecutive_failures: u32,
}

/// Fans a Report out to every configured target. `add` only stages a
/// pending entry; `publish` swaps the staged set into the live target map at
/// the start of each call, so `add` never blocks on or races the network I/O
/// `publish` does for the targets already live.
pub struct Publisher {
    targets: RwLock<BTreeMap<String, Entry>>,
    pending: Mutex<Vec<(String, Arc<dyn SubPublisher>)>>,
    closed: AtomicBool,
    in_flight: AtomicUsize,
    drained: Notify,
}

impl Publisher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            targets: RwLock::new(BTreeMap::new()),
            pending: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
            drained: Notify::new(),
        })
    }

    pub fn add(&self, sub: Arc<dyn SubPublisher>) {
        let key = sub.target().to_string();
        self.pending.lock().push((key, sub));
    }

    pub fn target_count(&self) -> usize {
        self.targets.read().len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    fn stage_pending(&self) {
        let staged = std::mem::take(&mut *self.pending.lock());
        if staged.is_empty() {
            return;
        }
        let mut targets = self.targets.write();
        for (key, sub) in staged {
            info!(target = %key, "publish target added");
            targets.insert(
                key,
                Entry {
                    sub,
                    consecutive_failures: 0,
                },
            );
        }
    }

    /// Forward `envelope` to every live target concurrently. A per-target
    /// failure is logged and counted; it never fails this call. A target
    /// that fails `MAX_CONSECUTIVE_FAILURES` times in a row is evicted.
    pub async fn publish(&self, envelope: &ReportEnvelope) -> Result<(), PublisherError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(PublisherError::Closed);
        }
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let result = self.publish_inner(envelope).await;
        if self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 && self.closed.load(Ordering::SeqCst) {
            self.drained.notify_waiters();
        }
        result
    }

    async fn publish_inner(&self, envelope: &ReportEnvelope) -> Result<(), PublisherError> {
        self.stage_pending();

        let snapshot: Vec<(String, Arc<dyn SubPublisher>)> = self
            .targets
            .read()
            .iter()
            .map(|(key, entry)| (key.clone(), entry.sub.clone()))
            .collect();

        let mut handles = Vec::with_capacity(snapshot.len());
        for (key, sub) in snapshot {
            let envelope = envelope.clone();
            handles.push(tokio::spawn(async move {
                let result = sub.publish(&envelope).await;
                (key, result)
            }));
        }

        let mut evict = Vec::new();
        for handle in handles {
            let Ok((key, result)) = handle.await else { continue };
            let mut targets = self.targets.write();
            let Some(entry) = targets.get_mut(&key) else { continue };
            match result {
                Ok(()) => entry.consecutive_failures = 0,
                Err(err) => {
                    entry.consecutive_failures += 1;
                    warn!(target = %key, error = %err, failures = entry.consecutive_failures, "publish failed");
                    if entry.consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                        evict.push(key);
                    }
                }
            }
        }

        if !evict.is_empty() {
            let mut targets = self.targets.write();
            for key in evict {
                targets.remove(&key);
                warn!(target = %key, "publish target evicted after repeated failures");
            }
        }

        Ok(())
    }

    /// Mark closed and wait for any publish call already in flight to
    /// finish. Does not prevent new `publish` calls from racing in before
    /// the close takes effect — callers are expected to stop calling
    /// `publish` before calling this.
    pub async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        while self.in_flight.load(Ordering::SeqCst) > 0 {
            self.drained.notified().await;
        }
        info!("publisher closed");
    }
}
