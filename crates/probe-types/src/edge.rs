use facet::Facet;

/// Accumulated counters over a sampling window for one edge (or one node's
/// rollup across all its edges). Merges by summation — an `EdgeMetadata` is a
/// commutative monoid under `merge`, with the zero value as identity.
#[derive(Facet, Clone, Debug, Default, PartialEq, Eq)]
pub struct EdgeMetadata {
    pub egress_packet_count: Option<u64>,
    pub ingress_packet_count: Option<u64>,
    pub egress_byte_count: Option<u64>,
    pub ingress_byte_count: Option<u64>,
    pub max_conn_count_tcp: Option<u64>,
}

fn add_opt(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (None, None) => None,
        (Some(x), None) => Some(x),
        (None, Some(y)) => Some(y),
        (Some(x), Some(y)) => Some(x + y),
    }
}

impl EdgeMetadata {
    pub fn merge(&self, other: &EdgeMetadata) -> EdgeMetadata {
        EdgeMetadata {
            egress_packet_count: add_opt(self.egress_packet_count, other.egress_packet_count),
            ingress_packet_count: add_opt(self.ingress_packet_count, other.ingress_packet_count),
            egress_byte_count: add_opt(self.egress_byte_count, other.egress_byte_count),
            ingress_byte_count: add_opt(self.ingress_byte_count, other.ingress_byte_count),
            max_conn_count_tcp: match (self.max_conn_count_tcp, other.max_conn_count_tcp) {
                (None, None) => None,
                (a, b) => Some(a.unwrap_or(0).max(b.unwrap_or(0))),
            },
        }
    }
}
