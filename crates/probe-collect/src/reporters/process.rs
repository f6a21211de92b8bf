use crate::collaborators::ProcessWalker;
use crate::error::ReporterError;
use crate::reporters::Reporter;
use probe_types::{keys, Node, NodeId, Report, Scope};
use std::sync::Arc;

/// Emits one Process node per PID seen by the process walker. The walker
/// itself is refreshed once per spy tick by the scheduler, not by this
/// reporter — see `probe-scheduler`.
pub struct ProcessReporter {
    scope: Scope,
    walker: Arc<dyn ProcessWalker>,
    host_id: NodeId,
}

impl ProcessReporter {
    pub fn new(scope: Scope, walker: Arc<dyn ProcessWalker>, host_id: NodeId) -> Self {
        Self { scope, walker, host_id }
    }
}

impl Reporter for ProcessReporter {
    fn name(&self) -> &'static str {
        "process"
    }

    fn report(&self) -> Result<Report, ReporterError> {
        let mut report = Report::new();
        for process in self.walker.walk() {
            let mut metadata = std::collections::BTreeMap::new();
            metadata.insert(keys::SCOPE.to_string(), self.scope.as_str().to_string());
            metadata.insert(keys::PID.to_string(), process.pid.to_string());
            metadata.insert(keys::PPID.to_string(), process.ppid.to_string());
            metadata.insert(keys::COMM.to_string(), process.comm);
            metadata.insert(keys::CMDLINE.to_string(), process.cmdline);
            metadata.insert(keys::CWD.to_string(), process.cwd);
            metadata.insert(keys::THREADS.to_string(), process.threads.to_string());
            metadata.insert(keys::PROCESS_USER.to_string(), process.user);
            metadata.insert(keys::HOST_ID.to_string(), self.host_id.as_str().to_string());

            report
                .process
                .add_node(NodeId::process(&self.scope, process.pid), Node::with_metadata(metadata));
        }
        Ok(report)
    }
}
