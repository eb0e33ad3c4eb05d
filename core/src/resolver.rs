//! Hostname resolution check used to gate discovered hostnames.

use crate::{Error, Result};
use std::net::ToSocketAddrs;

pub trait Resolver {
    /// `Ok(())` when the hostname currently resolves to at least one address.
    fn resolve(&self, hostname: &str) -> Result<()>;
}

/// System resolver (getaddrinfo). Every call is a live lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    fn resolve(&self, hostname: &str) -> Result<()> {
        if let Ok(mut it) = (hostname, 0u16).to_socket_addrs() {
            if it.next().is_some() {
                return Ok(());
            }
        }
        Err(Error::DnsResolutionFailed { hostname: hostname.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_addresses_resolve() {
        assert!(SystemResolver.resolve("127.0.0.1").is_ok());
    }

    #[test]
    fn ipv6_literals_resolve() {
        assert!(SystemResolver.resolve("::1").is_ok());
    }

    #[test]
    fn invalid_names_fail() {
        let err = SystemResolver.resolve("no such host.invalid").unwrap_err();
        assert_eq!(err.code(), "DNS_FAILED");
    }
}
