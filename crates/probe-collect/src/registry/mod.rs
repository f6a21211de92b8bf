//! Live in-memory mirrors of external entities (containers, orchestrator
//! pods/services), each driven by an event stream with a
//! `DRAINED -> LISTENING -> TEARDOWN -> BACKOFF -> LISTENING` state machine
//! and reset-before-subscribe semantics (see [`generic::EventRegistry`]).

pub mod container;
pub mod generic;
pub mod kubernetes;

pub use container::{ContainerRegistry, ContainerSubscribeFuture, StatsStreamFactory};
pub use generic::{EventRegistry, RegistryState};
pub use kubernetes::{KubernetesRegistry, OrchestratorEvent, OrchestratorSubscribeFuture};
