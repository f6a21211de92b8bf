use compact_str::CompactString;
use facet::Facet;

/// The probe's local identifier, prefixed onto every node id it mints so that
/// multiple probes feeding one backend never collide.
#[derive(Facet, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[facet(transparent)]
pub struct Scope(CompactString);

impl Scope {
    pub fn new(id: impl Into<CompactString>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Opaque node identifier. Stable across publish cycles for the same
/// underlying entity; constructed only through the encoders below so callers
/// can't accidentally produce two different strings for the same entity.
#[derive(Facet, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[facet(transparent)]
pub struct NodeId(CompactString);

impl NodeId {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    fn from_parts(parts: &[&str]) -> Self {
        Self(CompactString::from(parts.join(";")))
    }

    pub fn endpoint(scope: &Scope, ip: &str, port: u16) -> Self {
        Self::from_parts(&[scope.as_str(), ip, &port.to_string()])
    }

    pub fn process(scope: &Scope, pid: u32) -> Self {
        Self::from_parts(&[scope.as_str(), &pid.to_string()])
    }

    pub fn container(scope: &Scope, container_uuid: &str) -> Self {
        Self::from_parts(&[scope.as_str(), container_uuid])
    }

    pub fn container_image(scope: &Scope, image_id: &str) -> Self {
        Self::from_parts(&[scope.as_str(), image_id])
    }

    pub fn host(scope: &Scope, hostname: &str) -> Self {
        Self::from_parts(&[scope.as_str(), hostname])
    }

    pub fn address(scope: &Scope, ip: &str) -> Self {
        Self::from_parts(&[scope.as_str(), ip])
    }

    /// Pod and service ids are not scoped: they're `namespace/name`, stable
    /// across every probe watching the same orchestrator API.
    pub fn pod(namespace: &str, name: &str) -> Self {
        Self(CompactString::from(format!("{namespace}/{name}")))
    }

    pub fn service(namespace: &str, name: &str) -> Self {
        Self(CompactString::from(format!("{namespace}/{name}")))
    }

    /// Construct a raw id directly. Used by the renderer graph's pseudo-nodes
    /// (`theInternet`, unmatched endpoints) which don't come from an encoder.
    pub fn raw(id: impl Into<CompactString>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_id_is_semicolon_joined() {
        let scope = Scope::new("probe-a");
        let id = NodeId::endpoint(&scope, "10.0.0.1", 80);
        assert_eq!(id.as_str(), "probe-a;10.0.0.1;80");
    }

    #[test]
    fn pod_id_ignores_scope() {
        let id = NodeId::pod("default", "ping");
        assert_eq!(id.as_str(), "default/ping");
    }

    #[test]
    fn node_id_stable_across_calls() {
        let scope = Scope::new("probe-a");
        let a = NodeId::process(&scope, 42);
        let b = NodeId::process(&scope, 42);
        assert_eq!(a, b);
    }
}
