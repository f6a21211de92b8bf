//! Scheduler: the two tickers that drive a running probe. `spyTick` merges
//! every reporter's contribution into a working report and enriches it with
//! taggers; `pubTick` hands the accumulated report to the publisher and
//! starts a fresh one. Both run off one `quit` signal shared with every
//! other background task the probe owns.

use probe_collect::{Reporter, Tagger};
use probe_publish::Publisher;
use probe_types::Report;
use probe_wire::ReportEnvelope;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Everything the scheduler loop needs, collected up front so the loop body
/// itself only deals with timing and error handling.
pub struct Scheduler {
    scope: String,
    reporters: Vec<Box<dyn Reporter>>,
    taggers: Vec<Box<dyn Tagger>>,
    publisher: Arc<Publisher>,
    spy_interval: Duration,
    publish_interval: Duration,
    refresh_process_cache: Option<Box<dyn Fn() + Send + Sync>>,
    on_publish: Option<Box<dyn Fn(bool) + Send + Sync>>,
}

impl Scheduler {
    pub fn new(
        scope: impl Into<String>,
        reporters: Vec<Box<dyn Reporter>>,
        taggers: Vec<Box<dyn Tagger>>,
        publisher: Arc<Publisher>,
        spy_interval: Duration,
        publish_interval: Duration,
    ) -> Self {
        Self {
            scope: scope.into(),
            reporters,
            taggers,
            publisher,
            spy_interval,
            publish_interval,
            refresh_process_cache: None,
            on_publish: None,
        }
    }

    /// Installs the hook invoked once at the start of every spy tick, before
    /// any reporter runs. The process walker's own caching lives outside
    /// this crate; this is just the trigger.
    pub fn with_process_cache_refresh(mut self, refresh: impl Fn() + Send + Sync + 'static) -> Self {
        self.refresh_process_cache = Some(Box::new(refresh));
        self
    }

    /// Installs the hook invoked after every pub tick with whether the
    /// publish attempt succeeded, for callers (the debug server) that expose
    /// a publish counter.
    pub fn with_on_publish(mut self, on_publish: impl Fn(bool) + Send + Sync + 'static) -> Self {
        self.on_publish = Some(Box::new(on_publish));
        self
    }

    /// Runs the loop until `quit` fires. Exits without a final publish —
    /// whatever is accumulated in the working report at shutdown is
    /// discarded, since reports are ephemeral window snapshots.
    pub fn spawn(self, quit: Arc<Notify>) -> JoinHandle<()> {
        tokio::spawn(self.run(quit))
    }

    async fn run(self, quit: Arc<Notify>) {
        let mut spy_ticker = tokio::time::interval(self.spy_interval);
        let mut pub_ticker = tokio::time::interval(self.publish_interval);
        let mut working = Report::new();

        info!(
            spy_interval_ms = self.spy_interval.as_millis() as u64,
            publish_interval_ms = self.publish_interval.as_millis() as u64,
            "scheduler started"
        );

        loop {
            tokio::select! {
                _ = quit.notified() => {
                    info!("scheduler stopped");
                    return;
                }
                _ = spy_ticker.tick() => {
                    working = self.spy_tick(working);
                }
                _ = pub_ticker.tick() => {
                    working = self.pub_tick(working).await;
                }
            }
        }
    }

    fn spy_tick(&self, working: Report) -> Report {
        if let Some(refresh) = &self.refresh_process_cache {
            refresh();
        }
        let merged = working.merge(&probe_collect::collect(&self.reporters));
        match probe_collect::tag(merged.clone(), &self.taggers) {
            Ok(tagged) => tagged,
            Err(err) => {
                warn!(error = %err, "tagger failed, publishing untagged contributions this cycle");
                merged
            }
        }
    }

    async fn pub_tick(&self, working: Report) -> Report {
        let window_ms = self.publish_interval.as_millis() as u64;
        let to_publish = working.with_window_ms(window_ms);
        let node_count: usize = probe_types::TopologyName::ALL
            .iter()
            .map(|name| to_publish.topology(*name).nodes.len())
            .sum();
        let envelope = ReportEnvelope {
            scope: self.scope.clone(),
            report: to_publish,
        };
        tracing::debug!(node_count, "publishing report");
        let succeeded = match self.publisher.publish(&envelope).await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "publish failed");
                false
            }
        };
        if let Some(on_publish) = &self.on_publish {
            on_publish(succeeded);
        }
        Report::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use probe_collect::ReporterError;
    use probe_types::{Node, NodeId};

    struct FixedReporter;
    impl Reporter for FixedReporter {
        fn name(&self) -> &'static str {
            "fixed"
        }
        fn report(&self) -> Result<Report, ReporterError> {
            let mut r = Report::new();
            r.host.add_node(NodeId::raw("h1"), Node::new());
            Ok(r)
        }
    }

    #[test]
    fn spy_tick_accumulates_across_calls() {
        let scheduler = Scheduler::new(
            "probe-a",
            vec![Box::new(FixedReporter)],
            vec![],
            Publisher::new(),
            Duration::from_millis(10),
            Duration::from_millis(30),
        );
        let working = scheduler.spy_tick(Report::new());
        let working = scheduler.spy_tick(working);
        assert_eq!(working.host.nodes.len(), 1);
    }

    #[tokio::test]
    async fn pub_tick_stamps_window_and_resets_working_report() {
        let scheduler = Scheduler::new(
            "probe-a",
            vec![Box::new(FixedReporter)],
            vec![],
            Publisher::new(),
            Duration::from_millis(10),
            Duration::from_millis(30),
        );
        let working = scheduler.spy_tick(Report::new());
        assert_eq!(working.host.nodes.len(), 1);
        let fresh = scheduler.pub_tick(working).await;
        assert_eq!(fresh.host.nodes.len(), 0);
    }
}
