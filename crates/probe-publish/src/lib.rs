//! Fan-out publisher: turns a merged [`probe_types::Report`] into wire
//! envelopes and forwards them to every configured target concurrently, with
//! a resolver that keeps the target set current against DNS and static host
//! specs without ever holding a lock across network I/O.

mod error;
mod publisher;
mod resolver;
mod sub;
mod target;

pub use error::PublisherError;
pub use publisher::Publisher;
pub use resolver::Resolver;
pub use sub::{HttpSubPublisher, SubPublisher, TcpSubPublisher};
pub use target::TargetSpec;
