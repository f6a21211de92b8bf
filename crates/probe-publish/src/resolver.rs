use crate::publisher::Publisher;
use crate::sub::{HttpSubPublisher, TcpSubPublisher};
use crate::target::TargetSpec;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::warn;

/// Periodically re-resolves the configured target specs and adds any
/// newly-discovered endpoint to the publisher. HTTP targets resolve to
/// themselves; TCP targets are DNS names resolved to one sub-publisher per
/// address, so a round-robin DNS entry fans out to every backing host.
pub struct Resolver {
    specs: Vec<TargetSpec>,
    token: Option<String>,
    publisher: Arc<Publisher>,
}

impl Resolver {
    pub fn new(specs: Vec<TargetSpec>, token: Option<String>, publisher: Arc<Publisher>) -> Self {
        Self { specs, token, publisher }
    }

    pub async fn resolve_once(&self) {
        for spec in &self.specs {
            match spec {
                TargetSpec::Http(url) => {
                    self.publisher
                        .add(Arc::new(HttpSubPublisher::new(url.clone(), self.token.clone())));
                }
                TargetSpec::Tcp(addr) => match tokio::net::lookup_host(addr).await {
                    Ok(resolved) => {
                        for socket_addr in resolved {
                            self.publisher.add(Arc::new(TcpSubPublisher::new(socket_addr.to_string())));
                        }
                    }
                    Err(err) => {
                        warn!(spec = %addr, error = %err, "failed to resolve publish target");
                    }
                },
            }
        }
    }

    pub fn spawn(self: Arc<Self>, interval: Duration, quit: Arc<Notify>) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.resolve_once().await;
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = quit.notified() => return,
                    _ = ticker.tick() => {
                        self.resolve_once().await;
                    }
                }
            }
        })
    }
}
