//! Report/topology/node data model for the probe's snapshot pipeline.
//!
//! A [`Report`] is an immutable graph-shaped value: a fixed set of named
//! [`Topology`] values, each holding [`Node`]s keyed by a deterministic
//! [`NodeId`], plus an adjacency relation and per-edge counters. Reports are
//! built by merging partial contributions from reporters (see `probe-collect`)
//! and never mutated in place once constructed — see `merge` below.

mod edge;
mod ids;
mod node;
mod report;
mod topology;
pub mod keys;

pub use edge::EdgeMetadata;
pub use ids::{NodeId, Scope};
pub use node::Node;
pub use report::{Report, TopologyName};
pub use topology::Topology;
