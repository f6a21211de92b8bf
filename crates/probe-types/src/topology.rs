use crate::edge::EdgeMetadata;
use crate::ids::NodeId;
use crate::node::Node;
use facet::Facet;
use std::collections::{BTreeMap, BTreeSet};

/// `(nodes, adjacency, edge-metadatas)` triple. One topology holds all the
/// nodes of a single kind (e.g. all `Process` nodes) for a `Report`.
#[derive(Facet, Clone, Debug, Default, PartialEq, Eq)]
pub struct Topology {
    pub nodes: BTreeMap<NodeId, Node>,
    pub adjacency: BTreeMap<NodeId, BTreeSet<NodeId>>,
    pub edge_metadatas: BTreeMap<(NodeId, NodeId), EdgeMetadata>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: NodeId, node: Node) {
        self.nodes
            .entry(id)
            .and_modify(|existing| *existing = existing.merge(&node))
            .or_insert(node);
    }

    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        self.adjacency.entry(from).or_default().insert(to);
    }

    /// Union of node maps (per-node merge), union of adjacency sets, pointwise
    /// addition of edge counters. Commutative and associative unconditionally;
    /// idempotent for identical inputs whenever neither side's nodes carry
    /// counters (counters are additive by design — see DESIGN.md).
    pub fn merge(&self, other: &Topology) -> Topology {
        let mut nodes = self.nodes.clone();
        for (id, node) in &other.nodes {
            nodes
                .entry(id.clone())
                .and_modify(|existing| *existing = existing.merge(node))
                .or_insert_with(|| node.clone());
        }

        let mut adjacency = self.adjacency.clone();
        for (id, peers) in &other.adjacency {
            adjacency.entry(id.clone()).or_default().extend(peers.iter().cloned());
        }

        let mut edge_metadatas = self.edge_metadatas.clone();
        for (pair, metadata) in &other.edge_metadatas {
            edge_metadatas
                .entry(pair.clone())
                .and_modify(|existing| *existing = existing.merge(metadata))
                .or_insert_with(|| metadata.clone());
        }

        Topology {
            nodes,
            adjacency,
            edge_metadatas,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_with(key: &str, value: &str) -> Node {
        Node::with_metadata([(key.to_string(), value.to_string())].into_iter().collect())
    }

    #[test]
    fn merge_unions_disjoint_nodes() {
        let mut a = Topology::new();
        a.add_node(NodeId::raw("x"), node_with("k", "v"));
        let mut b = Topology::new();
        b.add_node(NodeId::raw("y"), node_with("k", "v"));

        let merged = a.merge(&b);
        assert_eq!(merged.nodes.len(), 2);
    }

    #[test]
    fn merge_is_associative_and_commutative() {
        let mut a = Topology::new();
        a.add_node(NodeId::raw("x"), node_with("k", "a"));
        let mut b = Topology::new();
        b.add_node(NodeId::raw("y"), node_with("k", "b"));
        let mut c = Topology::new();
        c.add_node(NodeId::raw("z"), node_with("k", "c"));

        assert_eq!(a.merge(&b.merge(&c)), a.merge(&b).merge(&c));
        assert_eq!(a.merge(&b), b.merge(&a));
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let mut a = Topology::new();
        a.add_node(NodeId::raw("x"), node_with("k", "v"));
        a.add_edge(NodeId::raw("x"), NodeId::raw("y"));
        assert_eq!(a.merge(&Topology::new()), a);
    }

    #[test]
    fn merge_is_idempotent_without_counters() {
        let mut a = Topology::new();
        a.add_node(NodeId::raw("x"), node_with("k", "v"));
        a.add_edge(NodeId::raw("x"), NodeId::raw("y"));
        assert_eq!(a.merge(&a), a);
    }

    #[test]
    fn merge_unions_adjacency() {
        let mut a = Topology::new();
        a.add_edge(NodeId::raw("x"), NodeId::raw("y"));
        let mut b = Topology::new();
        b.add_edge(NodeId::raw("x"), NodeId::raw("z"));
        let merged = a.merge(&b);
        let peers = &merged.adjacency[&NodeId::raw("x")];
        assert!(peers.contains(&NodeId::raw("y")));
        assert!(peers.contains(&NodeId::raw("z")));
    }
}
