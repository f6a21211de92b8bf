use crate::collaborators::{PodInfo, ServiceInfo, WatchEvent};
use crate::registry::generic::RegistryState;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tracing::{info, warn};

/// One fanned-in orchestrator watch event. The orchestrator API exposes pods
/// and services as separate watch channels; the core fans them into one so a
/// single listener loop can apply reset-before-subscribe uniformly across
/// both maps at once.
pub enum OrchestratorEvent {
    Pod(String, WatchEvent<PodInfo>),
    Service(String, WatchEvent<ServiceInfo>),
}

pub type OrchestratorSubscribeFuture =
    Pin<Box<dyn Future<Output = mpsc::Receiver<OrchestratorEvent>> + Send>>;

/// Mirrors live pods and services from one fanned-in orchestrator watch
/// stream. Both maps share a single reset/listen/teardown/backoff cycle:
/// on any reconnect, both are cleared together before the new subscription is
/// established, since they're fed by the same underlying watch.
pub struct KubernetesRegistry {
    pods: RwLock<BTreeMap<String, PodInfo>>,
    services: RwLock<BTreeMap<String, ServiceInfo>>,
    state: RwLock<RegistryState>,
    quit: Notify,
    stopped: AtomicBool,
}

impl KubernetesRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            pods: RwLock::new(BTreeMap::new()),
            services: RwLock::new(BTreeMap::new()),
            state: RwLock::new(RegistryState::Drained),
            quit: Notify::new(),
            stopped: AtomicBool::new(false),
        })
    }

    pub fn state(&self) -> RegistryState {
        *self.state.read()
    }

    pub fn walk_pods(&self, mut visit: impl FnMut(&str, &PodInfo)) {
        for (id, pod) in self.pods.read().iter() {
            visit(id, pod);
        }
    }

    pub fn walk_services(&self, mut visit: impl FnMut(&str, &ServiceInfo)) {
        for (id, service) in self.services.read().iter() {
            visit(id, service);
        }
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.quit.notify_waiters();
    }

    /// Drives the reset-before-subscribe/listen/teardown/backoff cycle,
    /// demultiplexing each fanned-in event into the pod or service map.
    /// Returns once `stop()` has been called.
    pub async fn run<F>(self: Arc<Self>, subscribe: F, backoff: Duration)
    where
        F: Fn() -> OrchestratorSubscribeFuture + Send + Sync + 'static,
    {
        while !self.stopped.load(Ordering::SeqCst) {
            *self.state.write() = RegistryState::Listening;
            self.pods.write().clear();
            self.services.write().clear();
            info!(kind = "kubernetes", "registry entering LISTENING");

            let mut rx = subscribe().await;

            loop {
                tokio::select! {
                    _ = self.quit.notified() => {
                        *self.state.write() = RegistryState::Teardown;
                        info!(kind = "kubernetes", "registry stopped");
                        return;
                    }
                    event = rx.recv() => {
                        match event {
                            Some(OrchestratorEvent::Pod(id, WatchEvent::Added(pod) | WatchEvent::Modified(pod))) => {
                                self.pods.write().insert(id, pod);
                            }
                            Some(OrchestratorEvent::Pod(id, WatchEvent::Deleted(_))) => {
                                self.pods.write().remove(&id);
                            }
                            Some(OrchestratorEvent::Service(id, WatchEvent::Added(service) | WatchEvent::Modified(service))) => {
                                self.services.write().insert(id, service);
                            }
                            Some(OrchestratorEvent::Service(id, WatchEvent::Deleted(_))) => {
                                self.services.write().remove(&id);
                            }
                            None => break,
                        }
                    }
                }
            }

            *self.state.write() = RegistryState::Teardown;
            warn!(kind = "kubernetes", "event stream closed, backing off");
            *self.state.write() = RegistryState::Backoff;
            tokio::time::sleep(backoff).await;
        }
    }

    pub fn spawn<F>(self: &Arc<Self>, subscribe: F, backoff: Duration) -> tokio::task::JoinHandle<()>
    where
        F: Fn() -> OrchestratorSubscribeFuture + Send + Sync + 'static,
    {
        let registry = self.clone();
        tokio::spawn(async move { registry.run(subscribe, backoff).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pod(ns: &str, name: &str, container_ids: &[&str]) -> PodInfo {
        PodInfo {
            namespace: ns.to_string(),
            name: name.to_string(),
            container_ids: container_ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn demultiplexes_pods_and_services() {
        let registry = KubernetesRegistry::new();
        let subscribe = || -> OrchestratorSubscribeFuture {
            Box::pin(async move {
                let (tx, rx) = mpsc::channel(8);
                tx.send(OrchestratorEvent::Pod(
                    "default/ping".to_string(),
                    WatchEvent::Added(pod("default", "ping", &["c1", "c2"])),
                ))
                .await
                .ok();
                tx.send(OrchestratorEvent::Service(
                    "default/ping-svc".to_string(),
                    WatchEvent::Added(ServiceInfo { namespace: "default".to_string(), name: "ping-svc".to_string() }),
                ))
                .await
                .ok();
                rx
            })
        };

        let r = registry.clone();
        let handle = tokio::spawn(async move { r.run(subscribe, Duration::from_millis(5)).await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        registry.stop();
        handle.await.unwrap();

        let mut seen_pod = None;
        registry.walk_pods(|id, p| seen_pod = Some((id.to_string(), p.container_ids.clone())));
        assert_eq!(seen_pod, Some(("default/ping".to_string(), vec!["c1".to_string(), "c2".to_string()])));

        let mut service_count = 0;
        registry.walk_services(|_, _| service_count += 1);
        assert_eq!(service_count, 1);
    }

    #[tokio::test]
    async fn drops_entries_not_redelivered_after_reset() {
        let registry = KubernetesRegistry::new();
        let attempt = Arc::new(AtomicBool::new(false));
        let attempt_clone = attempt.clone();
        let subscribe = move || -> OrchestratorSubscribeFuture {
            let first = !attempt_clone.swap(true, Ordering::SeqCst);
            Box::pin(async move {
                let (tx, rx) = mpsc::channel(4);
                if first {
                    tx.send(OrchestratorEvent::Pod(
                        "default/x".to_string(),
                        WatchEvent::Added(pod("default", "x", &[])),
                    ))
                    .await
                    .ok();
                    // channel closes here when tx drops, forcing a reconnect
                }
                rx
            })
        };

        let r = registry.clone();
        let handle = tokio::spawn(async move { r.run(subscribe, Duration::from_millis(5)).await });
        tokio::time::sleep(Duration::from_millis(30)).await;
        registry.stop();
        handle.await.unwrap();

        let mut count = 0;
        registry.walk_pods(|_, _| count += 1);
        assert_eq!(count, 0);
    }
}
