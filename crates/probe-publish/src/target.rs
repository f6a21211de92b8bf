/// A user-provided publish target spec, before it's resolved to a concrete
/// sub-publisher. `http://`/`https://` prefixed specs use the HTTP variant;
/// everything else is treated as a `host:port` for the legacy TCP variant.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum TargetSpec {
    Tcp(String),
    Http(String),
}

impl TargetSpec {
    pub fn parse(spec: &str) -> Self {
        if spec.starts_with("http://") || spec.starts_with("https://") {
            TargetSpec::Http(spec.to_string())
        } else {
            TargetSpec::Tcp(spec.to_string())
        }
    }

    pub fn address(&self) -> &str {
        match self {
            TargetSpec::Tcp(addr) => addr,
            TargetSpec::Http(url) => url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_prefix_selects_http_variant() {
        assert_eq!(
            TargetSpec::parse("http://collector:4040/report"),
            TargetSpec::Http("http://collector:4040/report".to_string())
        );
    }

    #[test]
    fn bare_host_port_selects_tcp_variant() {
        assert_eq!(TargetSpec::parse("collector:4040"), TargetSpec::Tcp("collector:4040".to_string()));
    }
}
