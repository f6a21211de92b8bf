use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Process-lifetime counters surfaced on `/metrics`. Cheap enough to bump
/// from the hot path (one increment per publish tick) without a lock.
#[derive(Default)]
pub struct Metrics {
    publishes_total: AtomicU64,
    publish_failures_total: AtomicU64,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_publish(&self, succeeded: bool) {
        self.publishes_total.fetch_add(1, Ordering::Relaxed);
        if !succeeded {
            self.publish_failures_total.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn render(&self) -> String {
        format!(
            "probe_publishes_total {}\nprobe_publish_failures_total {}\n",
            self.publishes_total.load(Ordering::Relaxed),
            self.publish_failures_total.load(Ordering::Relaxed),
        )
    }
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn metrics(axum::extract::State(metrics): axum::extract::State<Arc<Metrics>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        metrics.render(),
    )
}

pub fn router(metrics: Arc<Metrics>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .with_state(metrics)
}
