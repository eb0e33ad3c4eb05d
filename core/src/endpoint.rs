//! Navigable HTTP(S) endpoints.

use crate::{Error, Result};
use std::fmt;
use std::net::Ipv6Addr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    /// Scheme for a scanned port: `https` when the service is tunneled over ssl.
    pub fn for_tunnel(tunnel: Option<&str>) -> Scheme {
        match tunnel {
            Some("ssl") => Scheme::Https,
            _ => Scheme::Http,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `scheme://host:port` target. Immutable once built; identity for
/// deduplication is `(host, port)` only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    scheme: Scheme,
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn new(scheme: Scheme, host: impl Into<String>, port: u16) -> Result<Self> {
        let host = host.into();
        if host.trim().is_empty() {
            return Err(Error::InvalidEndpoint(format!("empty host for port {}", port)));
        }
        if port == 0 {
            return Err(Error::InvalidEndpoint(format!("port 0 for host {}", host)));
        }
        Ok(Endpoint { scheme, host, port })
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn key(&self) -> (&str, u16) {
        (&self.host, self.port)
    }

    /// `<host>:<port>`, the string the collection is ordered by.
    pub fn sort_key(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Navigable URL. IPv6 literals are bracketed.
    pub fn url(&self) -> String {
        if self.host.parse::<Ipv6Addr>().is_ok() {
            format!("{}://[{}]:{}", self.scheme, self.host, self.port)
        } else {
            format!("{}://{}:{}", self.scheme, self.host, self.port)
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_follows_tunnel() {
        assert_eq!(Scheme::for_tunnel(Some("ssl")), Scheme::Https);
        assert_eq!(Scheme::for_tunnel(None), Scheme::Http);
        assert_eq!(Scheme::for_tunnel(Some("")), Scheme::Http);
        assert_eq!(Scheme::for_tunnel(Some("SSL")), Scheme::Http);
    }

    #[test]
    fn rejects_empty_host_and_port_zero() {
        assert!(Endpoint::new(Scheme::Http, "", 80).is_err());
        assert!(Endpoint::new(Scheme::Http, "  ", 80).is_err());
        assert!(Endpoint::new(Scheme::Http, "10.0.0.1", 0).is_err());
    }

    #[test]
    fn url_and_sort_key() {
        let e = Endpoint::new(Scheme::Https, "web01.corp", 8443).unwrap();
        assert_eq!(e.url(), "https://web01.corp:8443");
        assert_eq!(e.to_string(), "https://web01.corp:8443");
        assert_eq!(e.sort_key(), "web01.corp:8443");
        assert_eq!(e.key(), ("web01.corp", 8443));
    }

    #[test]
    fn ipv6_is_bracketed_in_url_only() {
        let e = Endpoint::new(Scheme::Http, "fe80::1", 80).unwrap();
        assert_eq!(e.url(), "http://[fe80::1]:80");
        assert_eq!(e.sort_key(), "fe80::1:80");
    }
}
