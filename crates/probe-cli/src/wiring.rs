use crate::collaborators::{EnvHostFacts, NullConnectionLister, NullProcessWalker};
use crate::config::ProbeConfig;
use crate::debug_server::Metrics;
use crate::error::ConfigError;
use probe_collect::registry::{ContainerRegistry, KubernetesRegistry};
use probe_collect::reporters::{ContainerReporter, EndpointReporter, HostReporter, KubernetesReporter, OverlayReporter, ProcessReporter};
use probe_collect::taggers::{ContainerTagger, HostTagger, OverlayTagger, TopologyTagger};
use probe_collect::{Reporter, Tagger};
use probe_publish::{Publisher, Resolver, TargetSpec};
use probe_scheduler::Scheduler;
use probe_types::Scope;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Everything the scheduler and debug server need to run. Holds the
/// registries alive (their background tasks are tied to the `Arc` count)
/// even though the reporters only borrow them through an `Arc` of their own.
pub struct Wired {
    pub scheduler: Scheduler,
    pub publisher: Arc<Publisher>,
    pub resolver: Arc<Resolver>,
    pub container_registry: Option<Arc<ContainerRegistry>>,
    pub kubernetes_registry: Option<Arc<KubernetesRegistry>>,
}

/// Builds the reporter list, tagger list, registries (if enabled) and
/// publisher described by `config`. Registry subscribe functions are stubs
/// standing in for the out-of-scope container-daemon/orchestrator-API
/// clients — they open a channel that immediately closes, so a registry
/// wired this way sits in backoff until a real collaborator replaces the
/// stub.
pub fn wire(config: &ProbeConfig, metrics: Arc<Metrics>) -> Result<Wired, ConfigError> {
    let scope = Scope::new(config.scope.clone());
    let host_facts: Arc<dyn probe_collect::collaborators::HostFactsProvider> = Arc::new(EnvHostFacts);
    let host_reporter = HostReporter::new(scope.clone(), host_facts);
    let host_id = host_reporter.host_id();

    let mut reporters: Vec<Box<dyn Reporter>> = vec![Box::new(host_reporter)];
    let mut taggers: Vec<Box<dyn Tagger>> =
        vec![Box::new(HostTagger::new(host_id.clone())), Box::new(TopologyTagger)];

    if config.processes {
        reporters.push(Box::new(ProcessReporter::new(
            scope.clone(),
            Arc::new(NullProcessWalker),
            host_id.clone(),
        )));
    }

    reporters.push(Box::new(EndpointReporter::new(scope.clone(), Arc::new(NullConnectionLister))));

    let container_registry = if config.docker {
        let stats_factory: probe_collect::registry::StatsStreamFactory = Arc::new(|_id| {
            let (_tx, rx) = tokio::sync::mpsc::channel(1);
            rx
        });
        let registry = ContainerRegistry::new(stats_factory);
        registry.spawn(empty_container_subscribe, config.docker_interval);
        reporters.push(Box::new(ContainerReporter::new(scope.clone(), registry.clone())));
        taggers.push(Box::new(ContainerTagger::new(BTreeMap::new())));
        Some(registry)
    } else {
        None
    };

    let kubernetes_registry = if config.kubernetes_api.is_some() {
        let registry = KubernetesRegistry::new();
        registry.spawn(empty_orchestrator_subscribe, Duration::from_secs(10));
        reporters.push(Box::new(KubernetesReporter::new(registry.clone())));
        Some(registry)
    } else {
        None
    };

    if config.weave_router_addr.is_some() {
        taggers.push(Box::new(OverlayTagger::new(BTreeMap::new())));
        reporters.push(Box::new(OverlayReporter::new(Vec::new())));
    }

    let publisher = Publisher::new();
    let target_specs: Vec<TargetSpec> = config.targets.iter().map(|t| TargetSpec::parse(t)).collect();
    let resolver = Arc::new(Resolver::new(target_specs, config.token.clone(), publisher.clone()));

    let scheduler = Scheduler::new(
        config.scope.clone(),
        reporters,
        taggers,
        publisher.clone(),
        config.spy_interval,
        config.publish_interval,
    )
    .with_on_publish(move |succeeded| metrics.record_publish(succeeded));

    Ok(Wired {
        scheduler,
        publisher,
        resolver,
        container_registry,
        kubernetes_registry,
    })
}

fn empty_container_subscribe() -> probe_collect::registry::ContainerSubscribeFuture {
    Box::pin(async move {
        let (_tx, rx) = tokio::sync::mpsc::channel(1);
        rx
    })
}

fn empty_orchestrator_subscribe() -> probe_collect::registry::OrchestratorSubscribeFuture {
    Box::pin(async move {
        let (_tx, rx) = tokio::sync::mpsc::channel(1);
        rx
    })
}
