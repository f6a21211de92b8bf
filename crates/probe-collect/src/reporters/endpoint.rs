use crate::collaborators::ConnectionLister;
use crate::error::ReporterError;
use crate::reporters::Reporter;
use probe_types::{keys, Node, NodeId, Report, Scope};
use std::sync::Arc;

/// Emits an Endpoint node per local/remote address pair the connection
/// lister observes, with an adjacency edge from the local side to the
/// remote side. Only the local side can carry a PID attribution — the
/// lister has no visibility into the remote host's process table.
pub struct EndpointReporter {
    scope: Scope,
    lister: Arc<dyn ConnectionLister>,
}

impl EndpointReporter {
    pub fn new(scope: Scope, lister: Arc<dyn ConnectionLister>) -> Self {
        Self { scope, lister }
    }
}

impl Reporter for EndpointReporter {
    fn name(&self) -> &'static str {
        "endpoint"
    }

    fn report(&self) -> Result<Report, ReporterError> {
        let mut report = Report::new();
        for conn in self.lister.walk() {
            let local_id = NodeId::endpoint(&self.scope, &conn.local_ip.to_string(), conn.local_port);
            let remote_id = NodeId::endpoint(&self.scope, &conn.remote_ip.to_string(), conn.remote_port);

            let mut local_metadata = std::collections::BTreeMap::new();
            local_metadata.insert(keys::SCOPE.to_string(), self.scope.as_str().to_string());
            local_metadata.insert(keys::IP.to_string(), conn.local_ip.to_string());
            local_metadata.insert(keys::PORT.to_string(), conn.local_port.to_string());
            if let Some(pid) = conn.pid {
                local_metadata.insert(keys::PID.to_string(), pid.to_string());
            }

            let mut remote_metadata = std::collections::BTreeMap::new();
            remote_metadata.insert(keys::SCOPE.to_string(), self.scope.as_str().to_string());
            remote_metadata.insert(keys::IP.to_string(), conn.remote_ip.to_string());
            remote_metadata.insert(keys::PORT.to_string(), conn.remote_port.to_string());

            report.endpoint.add_node(local_id.clone(), Node::with_metadata(local_metadata));
            report.endpoint.add_node(remote_id.clone(), Node::with_metadata(remote_metadata));
            report.endpoint.add_edge(local_id, remote_id);
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::Connection;
    use std::net::IpAddr;

    struct FixedLister(Vec<Connection>);
    impl ConnectionLister for FixedLister {
        fn walk(&self) -> Vec<Connection> {
            self.0.clone()
        }
    }

    #[test]
    fn emits_local_and_remote_nodes_with_an_edge() {
        let conn = Connection {
            local_ip: "10.0.0.1".parse::<IpAddr>().unwrap(),
            local_port: 54321,
            remote_ip: "10.0.0.2".parse::<IpAddr>().unwrap(),
            remote_port: 80,
            pid: Some(42),
        };
        let reporter = EndpointReporter::new(Scope::new("probe-a"), Arc::new(FixedLister(vec![conn])));
        let report = reporter.report().unwrap();
        assert_eq!(report.endpoint.nodes.len(), 2);

        let scope = Scope::new("probe-a");
        let local_id = NodeId::endpoint(&scope, "10.0.0.1", 54321);
        let remote_id = NodeId::endpoint(&scope, "10.0.0.2", 80);
        assert!(report.endpoint.adjacency.get(&local_id).unwrap().contains(&remote_id));
        assert_eq!(
            report.endpoint.nodes.get(&local_id).unwrap().metadata.get(keys::PID).unwrap(),
            "42"
        );
        assert!(report.endpoint.nodes.get(&remote_id).unwrap().metadata.get(keys::PID).is_none());
    }
}
