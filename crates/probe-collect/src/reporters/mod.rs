//! Reporters: cheap, stateless producers of a partial [`probe_types::Report`].
//! Each one owns only the topologies it's named after; everything else in
//! its output stays empty. A failing reporter's contribution is dropped for
//! that cycle — see `probe-scheduler`, which calls [`Reporter::report`] and
//! logs rather than propagates.

mod container;
mod endpoint;
mod host;
mod kubernetes;
mod overlay;
mod process;

pub use container::ContainerReporter;
pub use endpoint::EndpointReporter;
pub use host::HostReporter;
pub use kubernetes::KubernetesReporter;
pub use overlay::OverlayReporter;
pub use process::ProcessReporter;

use crate::error::ReporterError;
use probe_types::Report;

pub trait Reporter: Send + Sync {
    fn name(&self) -> &'static str;
    fn report(&self) -> Result<Report, ReporterError>;
}
