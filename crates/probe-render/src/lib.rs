//! Renderer graph: a composable algebra over [`Report`]s that projects
//! topologies into derived, view-specific node sets.
//!
//! A [`Render`] value is a tree of combinators (`Select`/`Map`/`Reduce`/
//! `Filter`/`Custom`); calling [`Render::render`] walks the tree bottom-up and
//! produces a [`RenderableNodes`] map. The derived views in [`views`] wire
//! these combinators into the standard projections (process → container →
//! image, address → host, container → pod).

mod local_networks;
mod mappers;
mod node;
mod renderer;
pub mod views;

pub use local_networks::LocalNetworks;
pub use mappers::THE_INTERNET;
pub use node::{RenderableNode, RenderableNodes};
pub use renderer::{CustomFn, FilterPred, MapFn, Render};
