//! Seams for the producers this crate treats as black boxes: packet capture
//! device binding, procfs scraping, kernel conntrack, container daemon
//! transport and orchestrator API client plumbing are all out of scope.
//! Reporters and registries are handed an `Arc<dyn Trait>` at construction
//! (see `ReporterDeps`/registry constructors) rather than reaching for
//! process-global state, so tests can supply fixtures in place of the real
//! thing.

use std::net::IpAddr;

/// One observed connection, as the connection lister would report it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connection {
    pub local_ip: IpAddr,
    pub local_port: u16,
    pub remote_ip: IpAddr,
    pub remote_port: u16,
    pub pid: Option<u32>,
}

/// `walkConnections(visit)`. A real implementation would read `/proc/net/tcp`
/// plus conntrack; out of scope here.
pub trait ConnectionLister: Send + Sync {
    fn walk(&self) -> Vec<Connection>;
}

/// One process, as the process walker would report it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub ppid: u32,
    pub comm: String,
    pub cmdline: String,
    pub cwd: String,
    pub threads: u32,
    pub user: String,
}

/// `walk(visit)`. A real implementation would scan `/proc`; out of scope
/// here.
pub trait ProcessWalker: Send + Sync {
    fn walk(&self) -> Vec<ProcessEntry>;
}

/// One fact about the local host, as gathered by the out-of-scope
/// host-facts collaborator (hostname, uptime, kernel version, and so on come
/// from separate syscalls/files in the real implementation; bundled here for
/// the reporter's convenience).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostFacts {
    pub hostname: String,
    pub os: String,
    pub kernel_version: String,
    pub uptime_secs: u64,
    pub load: String,
    pub local_cidrs: Vec<String>,
}

pub trait HostFactsProvider: Send + Sync {
    fn facts(&self) -> HostFacts;
}

/// Add/Modify/Delete, as every watched external source (container daemon,
/// orchestrator API) models its event stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WatchEvent<T> {
    Added(T),
    Modified(T),
    Deleted(T),
}

/// A container as reported by the container daemon's event stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerInfo {
    pub id: String,
    pub name: String,
    pub image_id: String,
    pub image_name: String,
    pub state: String,
    pub ip: Option<String>,
    pub labels: Vec<(String, String)>,
}

/// One stats sample pushed down a container's stats stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContainerStats {
    pub memory_usage: Option<u64>,
    pub cpu_total_usage: Option<u64>,
    pub rx_bytes: Option<u64>,
    pub tx_bytes: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PodInfo {
    pub namespace: String,
    pub name: String,
    pub container_ids: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceInfo {
    pub namespace: String,
    pub name: String,
}
