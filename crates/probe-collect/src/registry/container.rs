use crate::collaborators::{ContainerInfo, ContainerStats, WatchEvent};
use crate::registry::generic::{EventRegistry, RegistryState, SubscribeFuture};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

pub type ContainerSubscribeFuture = SubscribeFuture<String, ContainerInfo>;

/// Opens a stats stream for the container named by the argument. One call
/// per container; the returned receiver ends when the container stops.
pub type StatsStreamFactory = Arc<dyn Fn(&str) -> mpsc::Receiver<ContainerStats> + Send + Sync>;

/// Mirrors live containers from the container daemon's event stream, and
/// supervises one stats-stream task per live container — started on `Added`,
/// aborted on `Deleted`. `WalkContainers` merges each container's latest
/// stats sample into the view it hands the caller.
pub struct ContainerRegistry {
    inner: Arc<EventRegistry<String, ContainerInfo>>,
    stats: Arc<RwLock<BTreeMap<String, ContainerStats>>>,
    stats_tasks: Arc<RwLock<BTreeMap<String, JoinHandle<()>>>>,
}

impl ContainerRegistry {
    pub fn new(stats_factory: StatsStreamFactory) -> Arc<Self> {
        let inner = EventRegistry::new("container");
        let registry = Arc::new(Self {
            inner: inner.clone(),
            stats: Arc::new(RwLock::new(BTreeMap::new())),
            stats_tasks: Arc::new(RwLock::new(BTreeMap::new())),
        });

        let stats = registry.stats.clone();
        let stats_tasks = registry.stats_tasks.clone();
        inner.set_on_event(Arc::new(move |id: &String, event: &WatchEvent<ContainerInfo>| {
            match event {
                WatchEvent::Added(_) => {
                    if stats_tasks.read().contains_key(id) {
                        return;
                    }
                    let mut rx = stats_factory(id);
                    let stats = stats.clone();
                    let id = id.clone();
                    let handle = tokio::spawn(async move {
                        while let Some(sample) = rx.recv().await {
                            stats.write().insert(id.clone(), sample);
                        }
                        stats.write().remove(&id);
                    });
                    stats_tasks.write().insert(id, handle);
                }
                WatchEvent::Deleted(_) => {
                    if let Some(handle) = stats_tasks.write().remove(id) {
                        handle.abort();
                    }
                    stats.write().remove(id);
                }
                WatchEvent::Modified(_) => {}
            }
        }));

        registry
    }

    pub fn state(&self) -> RegistryState {
        self.inner.state()
    }

    pub fn walk_containers(&self, mut visit: impl FnMut(&str, &ContainerInfo, Option<&ContainerStats>)) {
        let stats = self.stats.read();
        self.inner.walk(|id, info| visit(id, info, stats.get(id)));
    }

    pub fn stop(&self) {
        self.inner.stop();
        for (_, handle) in self.stats_tasks.write().drain() {
            handle.abort();
        }
        info!(kind = "container", "registry and stats supervisors stopped");
    }

    /// Spawn the reset/listen/backoff loop as a background task.
    pub fn spawn<F>(self: &Arc<Self>, subscribe: F, backoff: Duration) -> JoinHandle<()>
    where
        F: Fn() -> ContainerSubscribeFuture + Send + Sync + 'static,
    {
        let inner = self.inner.clone();
        tokio::spawn(async move { inner.run(subscribe, backoff).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn container(id: &str) -> ContainerInfo {
        ContainerInfo {
            id: id.to_string(),
            name: format!("c-{id}"),
            image_id: "img1".to_string(),
            image_name: "myorg/app".to_string(),
            state: "running".to_string(),
            ip: None,
            labels: vec![],
        }
    }

    #[tokio::test]
    async fn walk_containers_reflects_latest_stats_sample() {
        let started = Arc::new(AtomicUsize::new(0));
        let started_clone = started.clone();
        let factory: StatsStreamFactory = Arc::new(move |_id| {
            started_clone.fetch_add(1, Ordering::SeqCst);
            let (tx, rx) = mpsc::channel(4);
            tokio::spawn(async move {
                tx.send(ContainerStats { memory_usage: Some(12345), ..Default::default() })
                    .await
                    .ok();
            });
            rx
        });

        let registry = ContainerRegistry::new(factory);
        let r = registry.clone();
        let subscribe = move || -> ContainerSubscribeFuture {
            let (tx, rx) = mpsc::channel(4);
            Box::pin(async move {
                tx.send(("c1".to_string(), WatchEvent::Added(container("c1")))).await.ok();
                rx
            })
        };
        let handle = registry.spawn(subscribe, Duration::from_millis(5));

        tokio::time::sleep(Duration::from_millis(30)).await;
        registry.stop();
        handle.abort();

        let mut seen_usage = None;
        registry.walk_containers(|_, _, stats| {
            seen_usage = stats.and_then(|s| s.memory_usage);
        });
        assert_eq!(seen_usage, Some(12345));
        assert_eq!(started.load(Ordering::SeqCst), 1);
    }
}
