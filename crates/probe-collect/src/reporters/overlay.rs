use crate::error::ReporterError;
use crate::reporters::Reporter;
use probe_types::{keys, Node, NodeId, Report};

/// Emits one Overlay node per configured peer hostname. Peer discovery
/// (talking to the overlay router's API) is out of scope; the peer list is
/// handed in at construction by the CLI wiring.
pub struct OverlayReporter {
    peer_hostnames: Vec<String>,
}

impl OverlayReporter {
    pub fn new(peer_hostnames: Vec<String>) -> Self {
        Self { peer_hostnames }
    }
}

impl Reporter for OverlayReporter {
    fn name(&self) -> &'static str {
        "overlay"
    }

    fn report(&self) -> Result<Report, ReporterError> {
        let mut report = Report::new();
        for hostname in &self.peer_hostnames {
            let mut metadata = std::collections::BTreeMap::new();
            metadata.insert(keys::OVERLAY_PEER_NAME.to_string(), hostname.clone());
            report.overlay.add_node(NodeId::raw(hostname.clone()), Node::with_metadata(metadata));
        }
        Ok(report)
    }
}
