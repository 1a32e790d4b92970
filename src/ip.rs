//! Client address extraction.
//!
//! Behind a reverse proxy the socket peer is the proxy itself, so the real
//! client comes from `x-real-ip` or the first hop of `x-forwarded-for`. Only
//! trust those headers when a proxy you control sets them.

use std::net::{IpAddr, Ipv4Addr};

use crate::request::Request;

/// Best-effort client address for `req`, normalized.
///
/// Header values that do not parse as an IP are passed through trimmed, so a
/// misconfigured proxy shows up in the logs instead of vanishing.
pub fn extract(req: &Request, trust_proxy: bool) -> Option<String> {
    if trust_proxy {
        let forwarded = req
            .header("x-real-ip")
            .or_else(|| req.header("x-forwarded-for").and_then(|v| v.split(',').next()))
            .map(str::trim)
            .filter(|v| !v.is_empty());

        if let Some(raw) = forwarded {
            return Some(match raw.parse::<IpAddr>() {
                Ok(ip) => normalize(ip).to_string(),
                Err(_) => raw.to_owned(),
            });
        }
    }

    req.remote_addr().map(|addr| normalize(addr.ip()).to_string())
}

/// `::1` becomes `127.0.0.1`; IPv4-mapped IPv6 becomes plain IPv4.
pub fn normalize(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) if v6.is_loopback() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(IpAddr::V6(v6), IpAddr::V4),
        v4 => v4,
    }
}
