use crate::error::ReporterError;
use crate::registry::KubernetesRegistry;
use crate::reporters::Reporter;
use probe_types::{keys, Node, NodeId, Report};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Emits one Pod node and one Service node per live entry the orchestrator
/// registry is tracking. Pod and Service ids are namespace-scoped, not
/// probe-scoped — see `NodeId::pod`/`NodeId::service`.
pub struct KubernetesReporter {
    registry: Arc<KubernetesRegistry>,
}

impl KubernetesReporter {
    pub fn new(registry: Arc<KubernetesRegistry>) -> Self {
        Self { registry }
    }
}

impl Reporter for KubernetesReporter {
    fn name(&self) -> &'static str {
        "kubernetes"
    }

    fn report(&self) -> Result<Report, ReporterError> {
        let mut report = Report::new();

        self.registry.walk_pods(|id, pod| {
            let _ = id;
            let mut metadata = BTreeMap::new();
            metadata.insert(keys::KUBERNETES_NAMESPACE.to_string(), pod.namespace.clone());
            metadata.insert(keys::KUBERNETES_POD_NAME.to_string(), pod.name.clone());
            metadata.insert(
                keys::KUBERNETES_POD_CONTAINER_IDS.to_string(),
                pod.container_ids.join(", "),
            );
            report.pod.add_node(NodeId::pod(&pod.namespace, &pod.name), Node::with_metadata(metadata));
        });

        self.registry.walk_services(|id, service| {
            let _ = id;
            let mut metadata = BTreeMap::new();
            metadata.insert(keys::KUBERNETES_NAMESPACE.to_string(), service.namespace.clone());
            metadata.insert(keys::KUBERNETES_SERVICE_NAME.to_string(), service.name.clone());
            report.service.add_node(
                NodeId::service(&service.namespace, &service.name),
                Node::with_metadata(metadata),
            );
        });

        Ok(report)
    }
}
