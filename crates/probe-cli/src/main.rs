mod collaborators;
mod config;
mod debug_server;
mod error;
mod wiring;

use config::ProbeConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

/// How often the resolver re-resolves target specs and adds newly
/// discovered endpoints to the publisher.
const RESOLVE_INTERVAL: Duration = Duration::from_secs(30);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ProbeConfig::parse();
    let config = match config {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            tracing::error!(error = %err, "failed to start async runtime");
            std::process::exit(1);
        }
    };

    runtime.block_on(run(config));
}

async fn run(config: ProbeConfig) {
    let metrics = debug_server::Metrics::new();
    let quit = Arc::new(Notify::new());

    let wired = match wiring::wire(&config, metrics.clone()) {
        Ok(wired) => wired,
        Err(err) => {
            tracing::error!(error = %err, "failed to wire up probe");
            std::process::exit(1);
        }
    };

    if let Some(addr) = &config.http_listen {
        let addr = addr.clone();
        let router = debug_server::router(metrics.clone());
        let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|err| error::ConfigError::CannotBindDebugListener {
            addr: addr.clone(),
            reason: err.to_string(),
        });
        match listener {
            Ok(listener) => {
                tracing::info!(addr = %addr, "debug server listening");
                tokio::spawn(async move {
                    if let Err(err) = axum::serve(listener, router).await {
                        tracing::error!(error = %err, "debug server exited");
                    }
                });
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to wire up probe");
                std::process::exit(1);
            }
        }
    }

    let resolver_handle = Arc::clone(&wired.resolver).spawn(RESOLVE_INTERVAL, quit.clone());
    let scheduler_handle = wired.scheduler.spawn(quit.clone());

    wait_for_shutdown_signal().await;
    tracing::info!("shutdown signal received, draining");

    quit.notify_waiters();
    let _ = scheduler_handle.await;
    resolver_handle.abort();
    wired.publisher.close().await;

    tracing::info!("probe stopped");
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sig) => sig,
        Err(err) => {
            tracing::warn!(error = %err, "failed to install SIGTERM handler, falling back to SIGINT only");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
