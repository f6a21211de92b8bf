//! Derived renderer views: the standard projections downstream consumers
//! build from. Each one is a literal wiring-up of the combinators in
//! [`crate::Render`] and the mappers in [`crate::mappers`] — no view defines
//! any behavior of its own.

use crate::mappers;
use crate::node::RenderableNodes;
use crate::renderer::{CustomFn, FilterPred, Render};
use probe_types::{keys, TopologyName};
use std::collections::BTreeSet;
use std::sync::Arc;

pub fn endpoint_renderer() -> Render {
    Render::map(mappers::endpoint_identity, Render::Select(TopologyName::Endpoint))
}

pub fn process_renderer() -> Render {
    Render::Reduce(vec![
        Render::map(mappers::endpoint_to_process, endpoint_renderer()),
        Render::map(mappers::process_identity, Render::Select(TopologyName::Process)),
    ])
}

pub fn process_name_renderer() -> Render {
    Render::map(
        mappers::count_process_name,
        Render::map(mappers::process_to_name, process_renderer()),
    )
}

pub fn address_renderer() -> Render {
    Render::map(mappers::address_identity, Render::Select(TopologyName::Address))
}

/// `ColorConnected`: mark every node with non-empty adjacency, or that is the
/// target of some other node's adjacency, with `connected = true`. Leaves the
/// node set otherwise unchanged.
fn color_connected() -> CustomFn {
    Arc::new(|nodes: RenderableNodes| {
        let mut targets: BTreeSet<_> = BTreeSet::new();
        for (_, node) in nodes.iter() {
            targets.extend(node.adjacency.iter().cloned());
        }
        let mut out = nodes;
        for (id, node) in out.iter_mut() {
            if !node.adjacency.is_empty() || targets.contains(id) {
                node.connected = true;
            }
        }
        out
    })
}

fn connected_pred() -> FilterPred {
    Arc::new(|n| n.connected)
}

/// `OnlyConnected`/`FilterUnconnected`: colors the node set then keeps only
/// the nodes `ColorConnected` marked.
pub fn only_connected(inner: Render) -> Render {
    Render::filter(connected_pred(), Render::custom(color_connected(), inner))
}

fn in_container_or_connected_pred() -> FilterPred {
    Arc::new(|n| n.metadata.contains_key(keys::DOCKER_CONTAINER_ID) || n.connected)
}

pub fn container_renderer() -> Render {
    Render::Reduce(vec![
        Render::map(
            mappers::process_to_container,
            Render::filter(
                in_container_or_connected_pred(),
                Render::custom(color_connected(), process_renderer()),
            ),
        ),
        Render::map(mappers::container_identity, Render::Select(TopologyName::Container)),
        Render::map(
            mappers::ip_to_container,
            only_connected(Render::Reduce(vec![
                Render::map(mappers::container_to_ip, Render::Select(TopologyName::Container)),
                Render::map(mappers::endpoint_to_ip, Render::Select(TopologyName::Endpoint)),
            ])),
        ),
    ])
}

pub fn container_image_renderer() -> Render {
    Render::map(
        mappers::count_containers,
        Render::map(
            mappers::container_image_to_name,
            Render::Reduce(vec![
                Render::map(mappers::container_to_container_image, container_renderer()),
                Render::map(
                    mappers::container_image_identity,
                    Render::Select(TopologyName::ContainerImage),
                ),
            ]),
        ),
    )
}

pub fn host_renderer() -> Render {
    Render::Reduce(vec![
        Render::map(mappers::address_to_host, address_renderer()),
        Render::map(mappers::host_identity, Render::Select(TopologyName::Host)),
    ])
}

pub fn kubernetes_renderer() -> Render {
    Render::Reduce(vec![
        Render::map(mappers::container_to_pod, container_renderer()),
        Render::map(mappers::pod_identity, Render::Select(TopologyName::Pod)),
    ])
}

/// Drops nodes whose container name is in `denylisted_container_names`,
/// whose image name starts with an entry in `denylisted_image_prefixes`, or
/// whose `docker_label_works.weave.role` metadata is `system` — along with
/// any adjacency pointing at a dropped node (ordinary `Filter` semantics).
pub fn filter_system(
    inner: Render,
    denylisted_container_names: Vec<String>,
    denylisted_image_prefixes: Vec<String>,
) -> Render {
    let pred: FilterPred = Arc::new(move |n| {
        if let Some(name) = n.metadata.get(keys::DOCKER_CONTAINER_NAME) {
            if denylisted_container_names.iter().any(|d| d == name) {
                return false;
            }
        }
        if let Some(image) = n.metadata.get(keys::DOCKER_IMAGE_NAME) {
            if denylisted_image_prefixes.iter().any(|p| image.starts_with(p.as_str())) {
                return false;
            }
        }
        let weave_role_label = format!("{}{}", keys::DOCKER_LABEL_PREFIX, keys::WORKS_WEAVE_ROLE);
        if n.metadata.get(&weave_role_label).map(String::as_str) == Some(keys::WORKS_WEAVE_ROLE_SYSTEM) {
            return false;
        }
        true
    });
    Render::filter(pred, inner)
}
