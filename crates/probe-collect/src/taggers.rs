//! Taggers: run after every reporter has merged into the cycle's working
//! report and enrich it. A tagger may read any topology but must never
//! remove a node — only add metadata. Tagger order is fixed by the
//! scheduler's configured list (see `probe-scheduler`).

use crate::error::TaggerError;
use probe_types::{keys, NodeId, Report, TopologyName};
use std::collections::BTreeMap;

pub trait Tagger: Send + Sync {
    fn name(&self) -> &'static str;
    fn tag(&self, report: Report) -> Result<Report, TaggerError>;
}

/// Stamps `host_id` on every node in the Process, Endpoint and Container
/// topologies.
pub struct HostTagger {
    host_id: NodeId,
}

impl HostTagger {
    pub fn new(host_id: NodeId) -> Self {
        Self { host_id }
    }
}

impl Tagger for HostTagger {
    fn name(&self) -> &'static str {
        "host"
    }

    fn tag(&self, mut report: Report) -> Result<Report, TaggerError> {
        for name in [TopologyName::Process, TopologyName::Endpoint, TopologyName::Container] {
            for node in report.topology_mut(name).nodes.values_mut() {
                node.metadata.insert(keys::HOST_ID.to_string(), self.host_id.as_str().to_string());
            }
        }
        Ok(report)
    }
}

/// Stamps every node in every topology with the name of the topology it
/// belongs to.
pub struct TopologyTagger;

impl Tagger for TopologyTagger {
    fn name(&self) -> &'static str {
        "topology"
    }

    fn tag(&self, mut report: Report) -> Result<Report, TaggerError> {
        for name in TopologyName::ALL {
            let tag = topology_tag(name);
            for node in report.topology_mut(name).nodes.values_mut() {
                node.metadata.insert(keys::TOPOLOGY.to_string(), tag.to_string());
            }
        }
        Ok(report)
    }
}

fn topology_tag(name: TopologyName) -> &'static str {
    match name {
        TopologyName::Endpoint => "endpoint",
        TopologyName::Process => "process",
        TopologyName::Container => "container",
        TopologyName::ContainerImage => "container_image",
        TopologyName::Host => "host",
        TopologyName::Address => "address",
        TopologyName::Pod => "pod",
        TopologyName::Service => "service",
        TopologyName::Overlay => "overlay",
    }
}

/// Attaches `docker_container_id` to process nodes whose PID is owned by a
/// known container, and `kubernetes_namespace`/`kubernetes_pod_name` to
/// container nodes that belong to a known pod. The PID -> container-id
/// lookup (walking each process's cgroup file to find its container) and the
/// container-id -> pod lookup (asking the orchestrator registry which pod
/// owns a container) are the out-of-scope collaborators this tagger is
/// handed rather than performing itself.
pub struct ContainerTagger {
    container_id_by_pid: BTreeMap<u32, String>,
    pod_by_container_id: BTreeMap<String, (String, String)>,
}

impl ContainerTagger {
    pub fn new(container_id_by_pid: BTreeMap<u32, String>) -> Self {
        Self {
            container_id_by_pid,
            pod_by_container_id: BTreeMap::new(),
        }
    }

    pub fn with_pod_membership(mut self, pod_by_container_id: BTreeMap<String, (String, String)>) -> Self {
        self.pod_by_container_id = pod_by_container_id;
        self
    }
}

impl Tagger for ContainerTagger {
    fn name(&self) -> &'static str {
        "container"
    }

    fn tag(&self, mut report: Report) -> Result<Report, TaggerError> {
        for node in report.process.nodes.values_mut() {
            let Some(pid) = node.metadata.get(keys::PID).and_then(|p| p.parse::<u32>().ok()) else {
                continue;
            };
            if let Some(container_id) = self.container_id_by_pid.get(&pid) {
                node.metadata
                    .insert(keys::DOCKER_CONTAINER_ID.to_string(), container_id.clone());
            }
        }

        for node in report.container.nodes.values_mut() {
            let Some(container_id) = node.metadata.get(keys::DOCKER_CONTAINER_ID).cloned() else {
                continue;
            };
            if let Some((namespace, pod_name)) = self.pod_by_container_id.get(&container_id) {
                node.metadata
                    .insert(keys::KUBERNETES_NAMESPACE.to_string(), namespace.clone());
                node.metadata
                    .insert(keys::KUBERNETES_POD_NAME.to_string(), pod_name.clone());
            }
        }

        Ok(report)
    }
}

/// Attaches overlay MAC metadata to Host nodes, keyed by hostname.
pub struct OverlayTagger {
    mac_by_hostname: BTreeMap<String, String>,
}

impl OverlayTagger {
    pub fn new(mac_by_hostname: BTreeMap<String, String>) -> Self {
        Self { mac_by_hostname }
    }
}

impl Tagger for OverlayTagger {
    fn name(&self) -> &'static str {
        "overlay"
    }

    fn tag(&self, mut report: Report) -> Result<Report, TaggerError> {
        for node in report.host.nodes.values_mut() {
            let Some(hostname) = node.metadata.get(keys::HOST_NAME).cloned() else { continue };
            if let Some(mac) = self.mac_by_hostname.get(&hostname) {
                node.metadata.insert(keys::OVERLAY_MAC.to_string(), mac.clone());
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use probe_types::Node;

    #[test]
    fn host_tagger_stamps_process_endpoint_container_not_host() {
        let mut report = Report::new();
        report.process.add_node(NodeId::raw("p1"), Node::new());
        report.host.add_node(NodeId::raw("h1"), Node::new());

        let tagger = HostTagger::new(NodeId::raw("h1"));
        let report = tagger.tag(report).unwrap();

        assert_eq!(
            report.process.nodes.get(&NodeId::raw("p1")).unwrap().metadata.get(keys::HOST_ID).unwrap(),
            "h1"
        );
        assert!(report.host.nodes.get(&NodeId::raw("h1")).unwrap().metadata.get(keys::HOST_ID).is_none());
    }

    #[test]
    fn container_tagger_only_tags_known_pids() {
        let mut report = Report::new();
        let mut known = Node::new();
        known.metadata.insert(keys::PID.to_string(), "42".to_string());
        report.process.add_node(NodeId::raw("p42"), known);
        let mut unknown = Node::new();
        unknown.metadata.insert(keys::PID.to_string(), "7".to_string());
        report.process.add_node(NodeId::raw("p7"), unknown);

        let mut map = BTreeMap::new();
        map.insert(42, "containerA".to_string());
        let tagger = ContainerTagger::new(map);
        let report = tagger.tag(report).unwrap();

        assert_eq!(
            report.process.nodes.get(&NodeId::raw("p42")).unwrap().metadata.get(keys::DOCKER_CONTAINER_ID).unwrap(),
            "containerA"
        );
        assert!(report.process.nodes.get(&NodeId::raw("p7")).unwrap().metadata.get(keys::DOCKER_CONTAINER_ID).is_none());
    }

    #[test]
    fn container_tagger_stamps_pod_membership() {
        let mut report = Report::new();
        let mut container = Node::new();
        container.metadata.insert(keys::DOCKER_CONTAINER_ID.to_string(), "c1".to_string());
        report.container.add_node(NodeId::raw("container1"), container);

        let mut pods = BTreeMap::new();
        pods.insert("c1".to_string(), ("default".to_string(), "ping".to_string()));
        let tagger = ContainerTagger::new(BTreeMap::new()).with_pod_membership(pods);
        let report = tagger.tag(report).unwrap();

        let node = report.container.nodes.get(&NodeId::raw("container1")).unwrap();
        assert_eq!(node.metadata.get(keys::KUBERNETES_NAMESPACE).unwrap(), "default");
        assert_eq!(node.metadata.get(keys::KUBERNETES_POD_NAME).unwrap(), "ping");
    }

    #[test]
    fn taggers_never_remove_nodes() {
        let mut report = Report::new();
        report.process.add_node(NodeId::raw("p1"), Node::new());
        let before = report.process.nodes.len();
        let report = TopologyTagger.tag(report).unwrap();
        assert_eq!(report.process.nodes.len(), before);
    }
}
