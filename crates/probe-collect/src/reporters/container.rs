use crate::error::ReporterError;
use crate::registry::ContainerRegistry;
use crate::reporters::Reporter;
use probe_types::{keys, Node, NodeId, Report, Scope};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Emits one Container node per live container the registry is tracking
/// (with its latest stats sample merged in if the stats supervisor has one),
/// plus one ContainerImage node per distinct image referenced.
pub struct ContainerReporter {
    scope: Scope,
    registry: Arc<ContainerRegistry>,
}

impl ContainerReporter {
    pub fn new(scope: Scope, registry: Arc<ContainerRegistry>) -> Self {
        Self { scope, registry }
    }
}

impl Reporter for ContainerReporter {
    fn name(&self) -> &'static str {
        "container"
    }

    fn report(&self) -> Result<Report, ReporterError> {
        let mut report = Report::new();
        let mut seen_images: BTreeMap<String, (String, String)> = BTreeMap::new();

        self.registry.walk_containers(|id, info, stats| {
            let mut metadata = BTreeMap::new();
            metadata.insert(keys::SCOPE.to_string(), self.scope.as_str().to_string());
            metadata.insert(keys::DOCKER_CONTAINER_ID.to_string(), info.id.clone());
            metadata.insert(keys::DOCKER_CONTAINER_NAME.to_string(), info.name.clone());
            metadata.insert(keys::DOCKER_CONTAINER_STATE.to_string(), info.state.clone());
            metadata.insert(keys::DOCKER_IMAGE_ID.to_string(), info.image_id.clone());
            metadata.insert(keys::DOCKER_IMAGE_NAME.to_string(), info.image_name.clone());
            if let Some(ip) = &info.ip {
                metadata.insert(keys::IP.to_string(), ip.clone());
            }
            for (key, value) in &info.labels {
                metadata.insert(format!("{}{key}", keys::DOCKER_LABEL_PREFIX), value.clone());
            }
            if let Some(stats) = stats {
                if let Some(usage) = stats.memory_usage {
                    metadata.insert(keys::DOCKER_MEMORY_USAGE.to_string(), usage.to_string());
                }
                if let Some(usage) = stats.cpu_total_usage {
                    metadata.insert(keys::DOCKER_CPU_TOTAL_USAGE.to_string(), usage.to_string());
                }
            }

            report
                .container
                .add_node(NodeId::container(&self.scope, id), Node::with_metadata(metadata));
            seen_images.entry(info.image_id.clone()).or_insert_with(|| (info.image_id.clone(), info.image_name.clone()));
        });

        for (image_id, image_name) in seen_images.into_values() {
            let mut metadata = BTreeMap::new();
            metadata.insert(keys::SCOPE.to_string(), self.scope.as_str().to_string());
            metadata.insert(keys::DOCKER_IMAGE_ID.to_string(), image_id.clone());
            metadata.insert(keys::DOCKER_IMAGE_NAME.to_string(), image_name);
            report
                .container_image
                .add_node(NodeId::container_image(&self.scope, &image_id), Node::with_metadata(metadata));
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{ContainerInfo, WatchEvent};
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn reports_container_and_distinct_image() {
        let factory: crate::registry::StatsStreamFactory = Arc::new(|_id| {
            let (_tx, rx) = mpsc::channel(1);
            rx
        });
        let registry = ContainerRegistry::new(factory);
        let r = registry.clone();
        let handle = r.spawn(
            move || -> crate::registry::ContainerSubscribeFuture {
                Box::pin(async move {
                    let (tx, rx) = mpsc::channel(4);
                    tx.send((
                        "c1".to_string(),
                        WatchEvent::Added(ContainerInfo {
                            id: "c1".to_string(),
                            name: "app".to_string(),
                            image_id: "img1".to_string(),
                            image_name: "myorg/app".to_string(),
                            state: "running".to_string(),
                            ip: None,
                            labels: vec![],
                        }),
                    ))
                    .await
                    .ok();
                    rx
                })
            },
            Duration::from_millis(5),
        );

        tokio::time::sleep(Duration::from_millis(20)).await;
        registry.stop();
        handle.abort();

        let reporter = ContainerReporter::new(Scope::new("probe-a"), registry);
        let report = reporter.report().unwrap();
        assert_eq!(report.container.nodes.len(), 1);
        assert_eq!(report.container_image.nodes.len(), 1);
    }
}
