use crate::topology::Topology;
use facet::Facet;

/// The nine topology kinds a `Report` carries. Used by the renderer graph's
/// `Select` combinator to pick one out of a `Report` by name.
#[derive(Facet, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
#[facet(rename_all = "snake_case")]
pub enum TopologyName {
    Endpoint,
    Process,
    Container,
    ContainerImage,
    Host,
    Address,
    Pod,
    Service,
    Overlay,
}

impl TopologyName {
    pub const ALL: [TopologyName; 9] = [
        TopologyName::Endpoint,
        TopologyName::Process,
        TopologyName::Container,
        TopologyName::ContainerImage,
        TopologyName::Host,
        TopologyName::Address,
        TopologyName::Pod,
        TopologyName::Service,
        TopologyName::Overlay,
    ];
}

/// Immutable graph-shaped snapshot: nine named topologies plus the sampling
/// window they cover. Built incrementally during a spy tick by merging
/// reporter contributions, then handed whole to the publisher on a pub tick
/// and discarded (see `probe-scheduler`).
#[derive(Facet, Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub endpoint: Topology,
    pub process: Topology,
    pub container: Topology,
    pub container_image: Topology,
    pub host: Topology,
    pub address: Topology,
    pub pod: Topology,
    pub service: Topology,
    pub overlay: Topology,
    /// Sampling window this report covers, in milliseconds. Zero until the
    /// scheduler stamps it on the publish tick.
    pub window_ms: u64,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn topology(&self, name: TopologyName) -> &Topology {
        match name {
            TopologyName::Endpoint => &self.endpoint,
            TopologyName::Process => &self.process,
            TopologyName::Container => &self.container,
            TopologyName::ContainerImage => &self.container_image,
            TopologyName::Host => &self.host,
            TopologyName::Address => &self.address,
            TopologyName::Pod => &self.pod,
            TopologyName::Service => &self.service,
            TopologyName::Overlay => &self.overlay,
        }
    }

    pub fn topology_mut(&mut self, name: TopologyName) -> &mut Topology {
        match name {
            TopologyName::Endpoint => &mut self.endpoint,
            TopologyName::Process => &mut self.process,
            TopologyName::Container => &mut self.container,
            TopologyName::ContainerImage => &mut self.container_image,
            TopologyName::Host => &mut self.host,
            TopologyName::Address => &mut self.address,
            TopologyName::Pod => &mut self.pod,
            TopologyName::Service => &mut self.service,
            TopologyName::Overlay => &mut self.overlay,
        }
    }

    /// Merge `other` into a new `Report`. Associative, commutative, and has
    /// `Report::new()` as identity because every field merges that way (see
    /// `Topology::merge`); idempotent for identical inputs whenever neither
    /// side carries counters.
    pub fn merge(&self, other: &Report) -> Report {
        Report {
            endpoint: self.endpoint.merge(&other.endpoint),
            process: self.process.merge(&other.process),
            container: self.container.merge(&other.container),
            container_image: self.container_image.merge(&other.container_image),
            host: self.host.merge(&other.host),
            address: self.address.merge(&other.address),
            pod: self.pod.merge(&other.pod),
            service: self.service.merge(&other.service),
            overlay: self.overlay.merge(&other.overlay),
            window_ms: self.window_ms.max(other.window_ms),
        }
    }

    pub fn with_window_ms(mut self, window_ms: u64) -> Self {
        self.window_ms = window_ms;
        self
    }
}
