use std::net::Ipv4Addr;

/// The CIDRs the probe considers "inside" for endpoint classification.
/// Addresses outside every entry collapse to the `theInternet` pseudo-node in
/// [`crate::mappers::endpoint_to_process`].
///
/// Only IPv4 CIDRs are recognized; an entry that doesn't parse as one is
/// dropped rather than rejected, and an IPv6 address queried against
/// [`LocalNetworks::contains`] is always reported foreign. The source
/// codebase's own local-network detection is IPv4-only (it reads the bridge
/// interface's address), so this mirrors that rather than an arbitrary
/// limitation.
#[derive(Clone, Debug, Default)]
pub struct LocalNetworks {
    v4_nets: Vec<(u32, u32)>,
}

impl LocalNetworks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cidrs<I, S>(cidrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let v4_nets = cidrs
            .into_iter()
            .filter_map(|cidr| parse_ipv4_cidr(cidr.as_ref()))
            .collect();
        Self { v4_nets }
    }

    pub fn contains(&self, ip: &str) -> bool {
        let Some(addr) = ip.parse::<Ipv4Addr>().ok().map(u32::from) else {
            return false;
        };
        self.v4_nets
            .iter()
            .any(|(net, mask)| addr & mask == net & mask)
    }
}

fn parse_ipv4_cidr(s: &str) -> Option<(u32, u32)> {
    let (addr_part, prefix_part) = s.split_once('/')?;
    let addr = u32::from(addr_part.parse::<Ipv4Addr>().ok()?);
    let prefix: u32 = prefix_part.parse().ok()?;
    if prefix > 32 {
        return None;
    }
    let mask = if prefix == 0 { 0 } else { u32::MAX << (32 - prefix) };
    Some((addr, mask))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_address_inside_cidr() {
        let nets = LocalNetworks::with_cidrs(["10.0.0.0/8"]);
        assert!(nets.contains("10.1.2.3"));
        assert!(!nets.contains("8.8.8.8"));
    }

    #[test]
    fn slash_32_matches_exact_address_only() {
        let nets = LocalNetworks::with_cidrs(["192.168.1.5/32"]);
        assert!(nets.contains("192.168.1.5"));
        assert!(!nets.contains("192.168.1.6"));
    }

    #[test]
    fn unparsable_cidr_is_dropped_not_rejected() {
        let nets = LocalNetworks::with_cidrs(["not-a-cidr", "10.0.0.0/8"]);
        assert!(nets.contains("10.0.0.1"));
    }

    #[test]
    fn unparsable_query_address_is_foreign() {
        let nets = LocalNetworks::with_cidrs(["10.0.0.0/8"]);
        assert!(!nets.contains("::1"));
    }
}
