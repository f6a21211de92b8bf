//! Metadata key constants. Node metadata is an untyped `string -> string`
//! map (see [`crate::Node`]); reporters, taggers and renderer mappers agree
//! on these key names rather than each inventing their own.

pub const SCOPE: &str = "scope";
pub const TIMESTAMP: &str = "ts";
pub const HOST_NAME: &str = "host_name";
pub const LOCAL_NETWORKS: &str = "local_networks";
pub const OS: &str = "os";
pub const LOAD: &str = "load";
pub const KERNEL_VERSION: &str = "kernel_version";
pub const UPTIME: &str = "uptime";

pub const PID: &str = "pid";
pub const PPID: &str = "ppid";
pub const COMM: &str = "comm";
pub const CMDLINE: &str = "cmdline";
pub const CWD: &str = "cwd";
pub const THREADS: &str = "threads";
pub const PROCESS_USER: &str = "user";

pub const IP: &str = "ip";
pub const PORT: &str = "port";

pub const DOCKER_CONTAINER_ID: &str = "docker_container_id";
pub const DOCKER_CONTAINER_NAME: &str = "docker_container_name";
pub const DOCKER_CONTAINER_STATE: &str = "docker_container_state";
pub const DOCKER_IMAGE_ID: &str = "docker_image_id";
pub const DOCKER_IMAGE_NAME: &str = "docker_image_name";
pub const DOCKER_MEMORY_USAGE: &str = "docker_memory_usage";
pub const DOCKER_CPU_TOTAL_USAGE: &str = "docker_cpu_total_usage";
pub const DOCKER_LABEL_PREFIX: &str = "docker_label_";

pub const KUBERNETES_NAMESPACE: &str = "kubernetes_namespace";
pub const KUBERNETES_POD_NAME: &str = "kubernetes_pod_name";
pub const KUBERNETES_POD_CONTAINER_IDS: &str = "kubernetes_pod_container_ids";
pub const KUBERNETES_SERVICE_NAME: &str = "kubernetes_service_name";

pub const OVERLAY_PEER_NAME: &str = "overlay_peer_name";
pub const OVERLAY_MAC: &str = "overlay_mac";

/// Label applied by the source codebase's own management containers,
/// carried into node metadata under the dynamic `DOCKER_LABEL_PREFIX`-ed key
/// (so the full metadata key is `docker_label_works.weave.role`, not this
/// constant alone); the system filter (`probe-render::filter_system`)
/// always excludes nodes carrying it.
pub const WORKS_WEAVE_ROLE: &str = "works.weave.role";
pub const WORKS_WEAVE_ROLE_SYSTEM: &str = "system";

pub const TOPOLOGY: &str = "topology";
pub const HOST_ID: &str = "host_id";
