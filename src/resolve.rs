use std::net::Ipv4Addr;

use crate::ping_error::{PingError, PingResult};

/// Resolves a host string (IP literal or hostname) to the first IPv4 address
/// it maps to. IPv6-only hosts are a resolution failure here, the probers
/// speak ICMPv4 only.
pub fn lookup_host_v4(host: &str) -> PingResult<Ipv4Addr> {
    let ips = dns_lookup::lookup_host(host)
        .map_err(|_| PingError::Resolve(host.to_string()))?;
    ips.into_iter()
        .find_map(|ip| match ip {
            std::net::IpAddr::V4(v4) => Some(v4),
            std::net::IpAddr::V6(_) => None,
        })
        .ok_or_else(|| PingError::Resolve(host.to_string()))
}
