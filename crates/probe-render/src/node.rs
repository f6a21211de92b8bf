use probe_types::NodeId;
use std::collections::{BTreeMap, BTreeSet};

/// A projection of one or more source nodes into the view layer. Carries
/// enough of the originating [`probe_types::Node`] (metadata, counters) to
/// drive further mapping, plus renderer-only bookkeeping: `pseudo` (this
/// node has no counterpart in any topology — e.g. `theInternet`), `connected`
/// (set by `ColorConnected`), and `origins` (the report-level node ids this
/// renderable was built from, used to unproject edge metadata).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableNode {
    pub id: NodeId,
    pub label_major: String,
    pub label_minor: String,
    pub rank: String,
    pub pseudo: bool,
    pub connected: bool,
    pub metadata: BTreeMap<String, String>,
    pub counters: BTreeMap<String, i64>,
    pub adjacency: BTreeSet<NodeId>,
    pub origins: BTreeSet<NodeId>,
}

impl RenderableNode {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            label_major: String::new(),
            label_minor: String::new(),
            rank: String::new(),
            pseudo: false,
            connected: false,
            metadata: BTreeMap::new(),
            counters: BTreeMap::new(),
            adjacency: BTreeSet::new(),
            origins: BTreeSet::new(),
        }
    }

    /// Merge two renderables sharing an output id — happens whenever a `Map`
    /// or `Reduce` produces the same id from more than one input. Same
    /// tie-break rule as `probe_types::Node::merge`: on a label collision the
    /// lexicographically greater value wins, kept only for determinism.
    pub fn merge(&self, other: &Self) -> Self {
        let mut metadata = self.metadata.clone();
        for (key, value) in &other.metadata {
            metadata
                .entry(key.clone())
                .and_modify(|existing| {
                    if value > existing {
                        *existing = value.clone();
                    }
                })
                .or_insert_with(|| value.clone());
        }

        let mut counters = self.counters.clone();
        for (key, value) in &other.counters {
            *counters.entry(key.clone()).or_insert(0) += value;
        }

        let mut adjacency = self.adjacency.clone();
        adjacency.extend(other.adjacency.iter().cloned());

        let mut origins = self.origins.clone();
        origins.extend(other.origins.iter().cloned());

        Self {
            id: self.id.clone(),
            label_major: pick(&self.label_major, &other.label_major),
            label_minor: pick(&self.label_minor, &other.label_minor),
            rank: pick(&self.rank, &other.rank),
            pseudo: self.pseudo || other.pseudo,
            connected: self.connected || other.connected,
            metadata,
            counters,
            adjacency,
            origins,
        }
    }
}

fn pick(a: &str, b: &str) -> String {
    if a.is_empty() {
        b.to_string()
    } else if b.is_empty() || a >= b {
        a.to_string()
    } else {
        b.to_string()
    }
}

/// A rendered node set, keyed by renderable id. The output type of every
/// combinator in [`crate::Render`].
#[derive(Clone, Debug, Default)]
pub struct RenderableNodes(pub BTreeMap<NodeId, RenderableNode>);

impl RenderableNodes {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert `node`, merging into any existing node at the same id.
    pub fn upsert(&mut self, node: RenderableNode) {
        self.0
            .entry(node.id.clone())
            .and_modify(|existing| *existing = existing.merge(&node))
            .or_insert(node);
    }

    pub fn merge(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for node in other.0.values() {
            out.upsert(node.clone());
        }
        out
    }

    pub fn get(&self, id: &NodeId) -> Option<&RenderableNode> {
        self.0.get(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &RenderableNode)> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&NodeId, &mut RenderableNode)> {
        self.0.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_unions_adjacency_and_origins() {
        let mut a = RenderableNode::new(NodeId::raw("a"));
        a.adjacency.insert(NodeId::raw("x"));
        a.origins.insert(NodeId::raw("o1"));
        let mut b = RenderableNode::new(NodeId::raw("a"));
        b.adjacency.insert(NodeId::raw("y"));
        b.origins.insert(NodeId::raw("o2"));

        let merged = a.merge(&b);
        assert_eq!(merged.adjacency.len(), 2);
        assert_eq!(merged.origins.len(), 2);
    }

    #[test]
    fn upsert_merges_duplicate_ids() {
        let mut nodes = RenderableNodes::new();
        let mut a = RenderableNode::new(NodeId::raw("a"));
        a.counters.insert("c".into(), 1);
        nodes.upsert(a);
        let mut b = RenderableNode::new(NodeId::raw("a"));
        b.counters.insert("c".into(), 2);
        nodes.upsert(b);
        assert_eq!(nodes.len(), 1);
        assert_eq!(*nodes.get(&NodeId::raw("a")).unwrap().counters.get("c").unwrap(), 3);
    }
}
