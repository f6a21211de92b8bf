use crate::node::{RenderableNode, RenderableNodes};
use crate::LocalNetworks;
use probe_types::{keys, EdgeMetadata, NodeId, Report, TopologyName};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

pub type MapFn = fn(&RenderableNode, &LocalNetworks) -> Vec<RenderableNode>;
pub type FilterPred = Arc<dyn Fn(&RenderableNode) -> bool + Send + Sync>;
pub type CustomFn = Arc<dyn Fn(RenderableNodes) -> RenderableNodes + Send + Sync>;

/// A renderer graph node. The tree this forms is the renderer: leaves are
/// `Select`, every other variant wraps one or more sub-renderers.
pub enum Render {
    Select(TopologyName),
    Map { map_fn: MapFn, inner: Box<Render> },
    Reduce(Vec<Render>),
    Filter { pred: FilterPred, inner: Box<Render> },
    Custom { custom_fn: CustomFn, inner: Box<Render> },
}

impl Render {
    pub fn map(map_fn: MapFn, inner: Render) -> Render {
        Render::Map { map_fn, inner: Box::new(inner) }
    }

    pub fn filter(pred: FilterPred, inner: Render) -> Render {
        Render::Filter { pred, inner: Box::new(inner) }
    }

    pub fn custom(custom_fn: CustomFn, inner: Render) -> Render {
        Render::Custom { custom_fn, inner: Box::new(inner) }
    }

    pub fn render(&self, report: &Report, local: &LocalNetworks) -> RenderableNodes {
        match self {
            Render::Select(name) => select(report, *name),
            Render::Map { map_fn, inner } => map_render(inner.render(report, local), *map_fn, local),
            Render::Reduce(renderers) => renderers
                .iter()
                .fold(RenderableNodes::new(), |acc, r| acc.merge(&r.render(report, local))),
            Render::Filter { pred, inner } => filter_render(inner.render(report, local), pred.as_ref()),
            Render::Custom { custom_fn, inner } => custom_fn(inner.render(report, local)),
        }
    }

    /// Recursively unprojects `(src, dst)` back to the report-level node ids
    /// that produced them and sums the `EdgeMetadata` recorded against every
    /// pair in the cross product, across every topology (a renderable can be
    /// built by joining nodes from more than one topology, e.g.
    /// `ContainerRenderer`'s process/address joins).
    pub fn edge_metadata(
        &self,
        report: &Report,
        local: &LocalNetworks,
        src: &NodeId,
        dst: &NodeId,
    ) -> EdgeMetadata {
        let nodes = self.render(report, local);
        let (Some(src_node), Some(dst_node)) = (nodes.get(src), nodes.get(dst)) else {
            return EdgeMetadata::default();
        };

        let mut acc = EdgeMetadata::default();
        for name in TopologyName::ALL {
            let topology = report.topology(name);
            for origin_src in &src_node.origins {
                for origin_dst in &dst_node.origins {
                    if let Some(metadata) = topology
                        .edge_metadatas
                        .get(&(origin_src.clone(), origin_dst.clone()))
                    {
                        acc = acc.merge(metadata);
                    }
                }
            }
        }
        acc
    }
}

pub(crate) fn topology_name_str(name: TopologyName) -> &'static str {
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

fn primary_label(name: TopologyName, id: &NodeId, node: &probe_types::Node) -> String {
    let key = match name {
        TopologyName::Host => keys::HOST_NAME,
        TopologyName::Container => keys::DOCKER_CONTAINER_NAME,
        TopologyName::ContainerImage => keys::DOCKER_IMAGE_NAME,
        TopologyName::Pod => keys::KUBERNETES_POD_NAME,
        TopologyName::Service => keys::KUBERNETES_SERVICE_NAME,
        TopologyName::Process => keys::COMM,
        TopologyName::Endpoint | TopologyName::Address | TopologyName::Overlay => {
            return id.as_str().to_string()
        }
    };
    node.metadata.get(key).cloned().unwrap_or_else(|| id.as_str().to_string())
}

/// `Select(topology)`: lift a named topology's nodes 1:1, stamping each one
/// with the topology it came from (`probe_types::keys::TOPOLOGY`) so later
/// mappers that need to know provenance — `ip_to_container` being the only
/// one that does — can tell.
fn select(report: &Report, name: TopologyName) -> RenderableNodes {
    let topology = report.topology(name);
    let mut out = RenderableNodes::new();
    for (id, node) in &topology.nodes {
        let mut rn = RenderableNode::new(id.clone());
        rn.label_major = primary_label(name, id, node);
        rn.metadata = node.metadata.clone();
        rn.metadata
            .insert(keys::TOPOLOGY.to_string(), topology_name_str(name).to_string());
        rn.counters = node.counters.clone();
        rn.adjacency = topology.adjacency.get(id).cloned().unwrap_or_default();
        rn.origins = std::iter::once(id.clone()).collect();
        out.upsert(rn);
    }
    out
}

/// `Map{mapFn, inner}`: apply `mapFn` to every input node, then rewrite
/// adjacency so that every input edge `u -> v` becomes `mapFn(u) x mapFn(v)`
/// in the output (skipping self-loops introduced by the mapping itself).
/// Outputs sharing an id are merged.
fn map_render(input: RenderableNodes, map_fn: MapFn, local: &LocalNetworks) -> RenderableNodes {
    let mut mapped: BTreeMap<NodeId, BTreeSet<NodeId>> = BTreeMap::new();
    let mut output = RenderableNodes::new();

    for (input_id, node) in input.iter() {
        let produced = map_fn(node, local);
        let mut output_ids = BTreeSet::new();
        for produced_node in produced {
            output_ids.insert(produced_node.id.clone());
            output.upsert(produced_node);
        }
        mapped.insert(input_id.clone(), output_ids);
    }

    let mut new_adjacency: BTreeMap<NodeId, BTreeSet<NodeId>> = BTreeMap::new();
    for (input_id, node) in input.iter() {
        let Some(output_ids) = mapped.get(input_id) else { continue };
        for peer in &node.adjacency {
            let Some(peer_output_ids) = mapped.get(peer) else { continue };
            for output_id in output_ids {
                for peer_output_id in peer_output_ids {
                    if output_id != peer_output_id {
                        new_adjacency
                            .entry(output_id.clone())
                            .or_default()
                            .insert(peer_output_id.clone());
                    }
                }
            }
        }
    }

    for (id, adjacency) in new_adjacency {
        if let Some(node) = output.0.get_mut(&id) {
            node.adjacency.extend(adjacency);
        }
    }

    output
}

/// `Filter{pred, inner}`: drop nodes failing `pred`, and drop adjacency
/// entries pointing at a dropped node.
fn filter_render(input: RenderableNodes, pred: &(dyn Fn(&RenderableNode) -> bool)) -> RenderableNodes {
    let kept: BTreeSet<NodeId> = input
        .iter()
        .filter(|(_, node)| pred(node))
        .map(|(id, _)| id.clone())
        .collect();

    let mut out = RenderableNodes::new();
    for (id, mut node) in input.0 {
        if !kept.contains(&id) {
            continue;
        }
        node.adjacency.retain(|peer| kept.contains(peer));
        out.0.insert(id, node);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use probe_types::{Node, NodeId as Id};

    fn report_with_edge() -> Report {
        let mut r = Report::new();
        let a = Id::raw("a");
        let b = Id::raw("b");
        r.endpoint.add_node(a.clone(), Node::new());
        r.endpoint.add_node(b.clone(), Node::new());
        r.endpoint.add_edge(a, b);
        r
    }

    fn map_a_to_x(n: &RenderableNode, _local: &LocalNetworks) -> Vec<RenderableNode> {
        let mut out = RenderableNode::new(Id::raw(format!("x-{}", n.id.as_str())));
        out.origins = n.origins.clone();
        vec![out]
    }

    #[test]
    fn select_lifts_nodes_and_adjacency() {
        let report = report_with_edge();
        let nodes = select(&report, TopologyName::Endpoint);
        assert_eq!(nodes.len(), 2);
        let a = nodes.get(&Id::raw("a")).unwrap();
        assert!(a.adjacency.contains(&Id::raw("b")));
    }

    #[test]
    fn map_rewrites_adjacency_per_closure_property() {
        let report = report_with_edge();
        let render = Render::map(map_a_to_x, Render::Select(TopologyName::Endpoint));
        let nodes = render.render(&report, &LocalNetworks::new());
        let xa = nodes.get(&Id::raw("x-a")).unwrap();
        assert!(xa.adjacency.contains(&Id::raw("x-b")));
    }

    #[test]
    fn filter_drops_node_and_dangling_adjacency() {
        let report = report_with_edge();
        let render = Render::filter(
            Arc::new(|n: &RenderableNode| n.id != Id::raw("b")),
            Render::Select(TopologyName::Endpoint),
        );
        let nodes = render.render(&report, &LocalNetworks::new());
        assert!(nodes.get(&Id::raw("b")).is_none());
        let a = nodes.get(&Id::raw("a")).unwrap();
        assert!(a.adjacency.is_empty());
    }

    #[test]
    fn reduce_merges_disjoint_renderers() {
        let mut report = Report::new();
        report.endpoint.add_node(Id::raw("e1"), Node::new());
        report.process.add_node(Id::raw("p1"), Node::new());
        let render = Render::Reduce(vec![
            Render::Select(TopologyName::Endpoint),
            Render::Select(TopologyName::Process),
        ]);
        let nodes = render.render(&report, &LocalNetworks::new());
        assert_eq!(nodes.len(), 2);
    }

    #[test]
    fn edge_metadata_sums_origin_cross_product() {
        let mut report = Report::new();
        let a = Id::raw("a");
        let b = Id::raw("b");
        report.endpoint.add_node(a.clone(), Node::new());
        report.endpoint.add_node(b.clone(), Node::new());
        report.endpoint.add_edge(a.clone(), b.clone());
        report.endpoint.edge_metadatas.insert(
            (a.clone(), b.clone()),
            EdgeMetadata { egress_byte_count: Some(100), ..Default::default() },
        );

        let render = Render::Select(TopologyName::Endpoint);
        let em = render.edge_metadata(&report, &LocalNetworks::new(), &a, &b);
        assert_eq!(em.egress_byte_count, Some(100));
    }
}
