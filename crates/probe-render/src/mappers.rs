//! Mapping functions: pure, total `(RenderableNode, &LocalNetworks) -> Vec<RenderableNode>`
//! functions driving `Render::Map`. Each one is named after the join or
//! projection it performs; several return an empty vector or a pseudo-node
//! for inputs they don't recognize, and say so in their doc comment rather
//! than leaving it implicit.

use crate::node::RenderableNode;
use crate::LocalNetworks;
use probe_types::{keys, NodeId, Scope};

pub const THE_INTERNET: &str = "theInternet";
const UNCONTAINED: &str = "uncontained";
const UNKNOWN_IMAGE: &str = "unknown-image";
const UNMANAGED: &str = "unmanaged";

fn scope_of(n: &RenderableNode) -> Scope {
    Scope::new(n.metadata.get(keys::SCOPE).cloned().unwrap_or_default())
}

/// Carry a node's metadata, counters and origins over to a new id. Callers
/// set `label_major`/`pseudo` afterward if the default (the new id's string
/// form) isn't good enough.
fn lift(n: &RenderableNode, id: NodeId, pseudo: bool) -> RenderableNode {
    let mut out = RenderableNode::new(id);
    out.label_major = out.id.as_str().to_string();
    out.metadata = n.metadata.clone();
    out.origins = n.origins.clone();
    out.pseudo = pseudo;
    out
}

macro_rules! identity_mapper {
    ($name:ident) => {
        pub fn $name(n: &RenderableNode, _local: &LocalNetworks) -> Vec<RenderableNode> {
            vec![n.clone()]
        }
    };
}

identity_mapper!(endpoint_identity);
identity_mapper!(process_identity);
identity_mapper!(container_identity);
identity_mapper!(container_image_identity);
identity_mapper!(host_identity);
identity_mapper!(pod_identity);
identity_mapper!(address_identity);

/// Endpoints with a known PID collapse onto their process node. Endpoints
/// without one collapse onto a pseudo-node: `ip:port` if the address is
/// local, a single shared `theInternet` node otherwise.
pub fn endpoint_to_process(n: &RenderableNode, local: &LocalNetworks) -> Vec<RenderableNode> {
    if let Some(pid) = n.metadata.get(keys::PID) {
        if let Ok(pid) = pid.parse::<u32>() {
            return vec![lift(n, NodeId::process(&scope_of(n), pid), false)];
        }
    }

    let ip = n.metadata.get(keys::IP).cloned().unwrap_or_default();
    if local.contains(&ip) {
        let port = n.metadata.get(keys::PORT).cloned().unwrap_or_default();
        let mut out = lift(n, NodeId::raw(format!("{ip}:{port}")), true);
        out.label_major = format!("{ip}:{port}");
        vec![out]
    } else {
        let mut out = lift(n, NodeId::raw(THE_INTERNET), true);
        out.label_major = "the Internet".to_string();
        vec![out]
    }
}

/// Processes attached to a container (via `ContainerTagger`'s
/// `docker_container_id` stamp) collapse onto that container. Unattached
/// processes collapse onto a shared `uncontained` pseudo-node.
pub fn process_to_container(n: &RenderableNode, _local: &LocalNetworks) -> Vec<RenderableNode> {
    match n.metadata.get(keys::DOCKER_CONTAINER_ID) {
        Some(container_id) => vec![lift(n, NodeId::container(&scope_of(n), container_id), false)],
        None => {
            let mut out = lift(n, NodeId::raw(UNCONTAINED), true);
            out.label_major = "Uncontained".to_string();
            vec![out]
        }
    }
}

/// Groups processes by command name, ignoring PID and container.
pub fn process_to_name(n: &RenderableNode, _local: &LocalNetworks) -> Vec<RenderableNode> {
    let name = n
        .metadata
        .get(keys::COMM)
        .cloned()
        .unwrap_or_else(|| n.id.as_str().to_string());
    let mut out = lift(n, NodeId::raw(format!("name;{name}")), false);
    out.label_major = name;
    vec![out]
}

/// Containers collapse onto their image. A container with no recorded image
/// id (shouldn't happen in practice, but reporters are best-effort) collapses
/// onto a shared `unknown-image` pseudo-node.
pub fn container_to_container_image(
    n: &RenderableNode,
    _local: &LocalNetworks,
) -> Vec<RenderableNode> {
    match n.metadata.get(keys::DOCKER_IMAGE_ID) {
        Some(image_id) => vec![lift(n, NodeId::container_image(&scope_of(n), image_id), false)],
        None => {
            let mut out = lift(n, NodeId::raw(UNKNOWN_IMAGE), true);
            out.label_major = "Unknown image".to_string();
            vec![out]
        }
    }
}

/// Groups images by name, ignoring tag/digest.
pub fn container_image_to_name(n: &RenderableNode, _local: &LocalNetworks) -> Vec<RenderableNode> {
    let name = n
        .metadata
        .get(keys::DOCKER_IMAGE_NAME)
        .cloned()
        .unwrap_or_else(|| n.id.as_str().to_string());
    let mut out = lift(n, NodeId::raw(format!("image-name;{name}")), false);
    out.label_major = name;
    vec![out]
}

/// Containers collapse onto the pod that owns them, per the
/// `kubernetes_pod_name`/`kubernetes_namespace` metadata `KubernetesTagger`
/// stamps on them. Unowned containers collapse onto a shared `unmanaged`
/// pseudo-node.
pub fn container_to_pod(n: &RenderableNode, _local: &LocalNetworks) -> Vec<RenderableNode> {
    match (
        n.metadata.get(keys::KUBERNETES_NAMESPACE),
        n.metadata.get(keys::KUBERNETES_POD_NAME),
    ) {
        (Some(namespace), Some(pod)) => vec![lift(n, NodeId::pod(namespace, pod), false)],
        _ => {
            let mut out = lift(n, NodeId::raw(UNMANAGED), true);
            out.label_major = "Unmanaged".to_string();
            vec![out]
        }
    }
}

/// Auxiliary join: an endpoint joined by address rather than PID.
pub fn endpoint_to_ip(n: &RenderableNode, _local: &LocalNetworks) -> Vec<RenderableNode> {
    let ip = n.metadata.get(keys::IP).cloned().unwrap_or_default();
    vec![lift(n, NodeId::address(&scope_of(n), &ip), false)]
}

/// Auxiliary join: a container joined by its reported address. Returns
/// nothing for a container the reporter never attached an address to —
/// address-based joining is best-effort, not every container has one.
pub fn container_to_ip(n: &RenderableNode, _local: &LocalNetworks) -> Vec<RenderableNode> {
    match n.metadata.get(keys::IP) {
        Some(ip) => vec![lift(n, NodeId::address(&scope_of(n), ip), false)],
        None => vec![],
    }
}

/// Inverse of [`container_to_ip`]: an address-keyed node that traces back to
/// a container (tagged by `Select(Container)` upstream) resolves to that
/// container. An address node that only an endpoint ever touched resolves to
/// nothing — it has already done its job folding endpoint adjacency into the
/// shared address, and has no container to become.
pub fn ip_to_container(n: &RenderableNode, _local: &LocalNetworks) -> Vec<RenderableNode> {
    if n.metadata.get(keys::TOPOLOGY).map(String::as_str) == Some("container") {
        if let Some(container_origin) = n.origins.iter().next() {
            return vec![lift(n, container_origin.clone(), false)];
        }
    }
    vec![]
}

/// Groups addresses by the host they were reported from.
pub fn address_to_host(n: &RenderableNode, _local: &LocalNetworks) -> Vec<RenderableNode> {
    let host = n
        .metadata
        .get(keys::HOST_NAME)
        .cloned()
        .unwrap_or_else(|| n.id.as_str().to_string());
    let mut out = lift(n, NodeId::host(&scope_of(n), &host), false);
    out.label_major = host;
    vec![out]
}

/// Id-preserving aggregator: stamps a `containers` counter with the number of
/// distinct containers that rolled up into this (already-grouped) node.
pub fn count_containers(n: &RenderableNode, _local: &LocalNetworks) -> Vec<RenderableNode> {
    let mut out = n.clone();
    out.counters.insert("containers".to_string(), n.origins.len() as i64);
    vec![out]
}

/// Id-preserving aggregator: stamps a `processes` counter with the number of
/// distinct processes that rolled up into this (already-grouped) node.
pub fn count_process_name(n: &RenderableNode, _local: &LocalNetworks) -> Vec<RenderableNode> {
    let mut out = n.clone();
    out.counters.insert("processes".to_string(), n.origins.len() as i64);
    vec![out]
}

#[cfg(test)]
mod tests {
    use super::*;
    use probe_types::Scope as ScopeType;

    fn endpoint_node(metadata: &[(&str, &str)]) -> RenderableNode {
        let scope = ScopeType::new("probe-a");
        let mut n = RenderableNode::new(NodeId::endpoint(&scope, "10.0.0.1", 80));
        n.metadata.insert(keys::SCOPE.to_string(), "probe-a".to_string());
        for (k, v) in metadata {
            n.metadata.insert((*k).to_string(), (*v).to_string());
        }
        n.origins.insert(n.id.clone());
        n
    }

    #[test]
    fn endpoint_with_pid_collapses_to_process() {
        let n = endpoint_node(&[(keys::PID, "42")]);
        let local = LocalNetworks::new();
        let out = endpoint_to_process(&n, &local);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, NodeId::process(&ScopeType::new("probe-a"), 42));
    }

    #[test]
    fn foreign_endpoint_without_pid_collapses_to_the_internet() {
        let mut n = endpoint_node(&[(keys::IP, "8.8.8.8")]);
        n.metadata.insert(keys::IP.to_string(), "8.8.8.8".to_string());
        let local = LocalNetworks::with_cidrs(["10.0.0.0/8"]);
        let out = endpoint_to_process(&n, &local);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, NodeId::raw(THE_INTERNET));
        assert!(out[0].pseudo);
    }

    #[test]
    fn local_endpoint_without_pid_collapses_to_ip_port_pseudo_node() {
        let mut n = endpoint_node(&[(keys::IP, "10.1.1.1"), (keys::PORT, "8080")]);
        n.metadata.insert(keys::IP.to_string(), "10.1.1.1".to_string());
        n.metadata.insert(keys::PORT.to_string(), "8080".to_string());
        let local = LocalNetworks::with_cidrs(["10.0.0.0/8"]);
        let out = endpoint_to_process(&n, &local);
        assert_eq!(out[0].id, NodeId::raw("10.1.1.1:8080"));
        assert!(out[0].pseudo);
    }

    #[test]
    fn container_without_image_id_is_unknown_image() {
        let n = RenderableNode::new(NodeId::raw("c1"));
        let out = container_to_container_image(&n, &LocalNetworks::new());
        assert_eq!(out[0].id, NodeId::raw(UNKNOWN_IMAGE));
        assert!(out[0].pseudo);
    }

    #[test]
    fn container_without_ip_maps_to_nothing() {
        let n = RenderableNode::new(NodeId::raw("c1"));
        assert!(container_to_ip(&n, &LocalNetworks::new()).is_empty());
    }

    #[test]
    fn count_containers_stamps_origin_count() {
        let mut n = RenderableNode::new(NodeId::raw("image-name;redis"));
        n.origins.insert(NodeId::raw("c1"));
        n.origins.insert(NodeId::raw("c2"));
        let out = count_containers(&n, &LocalNetworks::new());
        assert_eq!(*out[0].counters.get("containers").unwrap(), 2);
    }
}
