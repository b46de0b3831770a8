//! Host name to address resolution.

use std::net::{IpAddr, ToSocketAddrs};

use thiserror::Error;

/// Errors during address resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Neither IP-literal parsing nor a name lookup produced an address.
    #[error("could not resolve an address for host '{0}'")]
    NoAddress(String),
}

/// Resolve a host string to a routable address.
///
/// IP literals (v4 or v6) parse directly. Anything else goes through a
/// blocking name lookup returning the first IPv4-or-IPv6 result, so prefer
/// literal addresses when the caller cannot afford to block.
pub fn resolve_host(host: &str) -> Result<IpAddr, ResolveError> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    let mut addrs = (host, 0u16)
        .to_socket_addrs()
        .map_err(|_| ResolveError::NoAddress(host.to_string()))?;

    addrs
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| ResolveError::NoAddress(host.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_ipv4_literal() {
        assert_eq!(
            resolve_host("127.0.0.1").unwrap(),
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        );
    }

    #[test]
    fn test_ipv6_literal() {
        assert_eq!(resolve_host("::1").unwrap(), IpAddr::V6(Ipv6Addr::LOCALHOST));
    }

    #[test]
    fn test_localhost_lookup() {
        assert!(resolve_host("localhost").is_ok());
    }

    #[test]
    fn test_unresolvable_host() {
        assert!(matches!(
            resolve_host("no-such-host.invalid"),
            Err(ResolveError::NoAddress(_))
        ));
    }
}
