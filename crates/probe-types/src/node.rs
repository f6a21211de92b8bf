use crate::edge::EdgeMetadata;
use facet::Facet;
use std::collections::BTreeMap;

/// A single graph node: free-form string metadata, additive counters, and an
/// optional rollup of the edge metadata for edges touching it.
#[derive(Facet, Clone, Debug, Default, PartialEq, Eq)]
pub struct Node {
    pub metadata: BTreeMap<String, String>,
    pub counters: BTreeMap<String, i64>,
    pub edge_metadata: Option<EdgeMetadata>,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metadata(metadata: BTreeMap<String, String>) -> Self {
        Self {
            metadata,
            ..Default::default()
        }
    }

    pub fn with_counters(counters: BTreeMap<String, i64>) -> Self {
        Self {
            counters,
            ..Default::default()
        }
    }

    /// Merge `other` into `self`. On a metadata key present in both with
    /// different values, the lexicographically greater value wins — an
    /// arbitrary but deterministic rule that keeps `merge` commutative
    /// regardless of which side a key collision originates from (the source
    /// this crate is modeled on picks a value nondeterministically here; see
    /// DESIGN.md for why this crate picks differently).
    pub fn merge(&self, other: &Node) -> Node {
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

        let edge_metadata = match (&self.edge_metadata, &other.edge_metadata) {
            (None, None) => None,
            (Some(a), None) => Some(a.clone()),
            (None, Some(b)) => Some(b.clone()),
            (Some(a), Some(b)) => Some(a.merge(b)),
        };

        Node {
            metadata,
            counters,
            edge_metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn merge_unions_distinct_metadata_keys() {
        let a = Node::with_metadata(meta(&[("host_name", "a")]));
        let b = Node::with_metadata(meta(&[("os", "linux")]));
        let merged = a.merge(&b);
        assert_eq!(merged.metadata.get("host_name").unwrap(), "a");
        assert_eq!(merged.metadata.get("os").unwrap(), "linux");
    }

    #[test]
    fn merge_is_commutative_on_key_collision() {
        let a = Node::with_metadata(meta(&[("k", "alpha")]));
        let b = Node::with_metadata(meta(&[("k", "beta")]));
        assert_eq!(a.merge(&b), b.merge(&a));
    }

    #[test]
    fn merge_sums_counters() {
        let a = Node::with_counters([("packets".to_string(), 3)].into_iter().collect());
        let b = Node::with_counters([("packets".to_string(), 4)].into_iter().collect());
        assert_eq!(*a.merge(&b).counters.get("packets").unwrap(), 7);
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let a = Node::with_metadata(meta(&[("k", "v")]));
        assert_eq!(a.merge(&Node::new()), a);
    }
}
