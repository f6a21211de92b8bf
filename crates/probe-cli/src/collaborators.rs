//! Minimal, always-empty collaborator implementations wired in by default.
//! Real procfs scraping, packet capture and container/orchestrator API
//! clients are out of scope for this crate; these stand in so the binary
//! links and runs, producing a Host-only report until a real collaborator
//! is substituted in.

use probe_collect::collaborators::{Connection, ConnectionLister, HostFacts, HostFactsProvider, ProcessEntry, ProcessWalker};

pub struct NullConnectionLister;

impl ConnectionLister for NullConnectionLister {
    fn walk(&self) -> Vec<Connection> {
        Vec::new()
    }
}

pub struct NullProcessWalker;

impl ProcessWalker for NullProcessWalker {
    fn walk(&self) -> Vec<ProcessEntry> {
        Vec::new()
    }
}

/// Gathers what it can from the environment without scraping `/proc`: a
/// hostname, and nothing else. `uptime_secs`/`load`/`kernel_version` are
/// left at their zero values until a real host-facts collaborator replaces
/// this one.
pub struct EnvHostFacts;

impl HostFactsProvider for EnvHostFacts {
    fn facts(&self) -> HostFacts {
        HostFacts {
            hostname: std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown-host".to_string()),
            os: std::env::consts::OS.to_string(),
            kernel_version: "unknown".to_string(),
            uptime_secs: 0,
            load: "0.00 0.00 0.00".to_string(),
            local_cidrs: Vec::new(),
        }
    }
}
