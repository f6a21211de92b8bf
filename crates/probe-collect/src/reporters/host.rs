use crate::collaborators::HostFactsProvider;
use crate::error::ReporterError;
use crate::reporters::Reporter;
use probe_types::{keys, Node, NodeId, Report, Scope};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Emits exactly one Host node carrying the facts the out-of-scope
/// host-facts collaborator gathers: hostname, local CIDRs, kernel version,
/// uptime, OS and load.
pub struct HostReporter {
    scope: Scope,
    facts: Arc<dyn HostFactsProvider>,
}

impl HostReporter {
    pub fn new(scope: Scope, facts: Arc<dyn HostFactsProvider>) -> Self {
        Self { scope, facts }
    }

    /// The id this reporter's Host node will have — other reporters and
    /// taggers that need to reference "this host" should use this rather
    /// than recomputing it.
    pub fn host_id(&self) -> NodeId {
        NodeId::host(&self.scope, &self.facts.facts().hostname)
    }
}

impl Reporter for HostReporter {
    fn name(&self) -> &'static str {
        "host"
    }

    fn report(&self) -> Result<Report, ReporterError> {
        let facts = self.facts.facts();
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ReporterError::Malformed { reporter: "host", reason: e.to_string() })?;

        let mut metadata = std::collections::BTreeMap::new();
        metadata.insert(keys::SCOPE.to_string(), self.scope.as_str().to_string());
        metadata.insert(keys::HOST_NAME.to_string(), facts.hostname.clone());
        metadata.insert(keys::OS.to_string(), facts.os);
        metadata.insert(keys::KERNEL_VERSION.to_string(), facts.kernel_version);
        metadata.insert(keys::UPTIME.to_string(), facts.uptime_secs.to_string());
        metadata.insert(keys::LOAD.to_string(), facts.load);
        metadata.insert(keys::LOCAL_NETWORKS.to_string(), facts.local_cidrs.join(","));
        metadata.insert(keys::TIMESTAMP.to_string(), now.as_secs().to_string());

        let mut report = Report::new();
        report.host.add_node(NodeId::host(&self.scope, &facts.hostname), Node::with_metadata(metadata));
        Ok(report)
    }
}
