//! Parsed scan-report model, as produced by a report parser.

use std::path::PathBuf;

/// One parsed scan report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub source: Option<PathBuf>,
    pub scanner: Option<String>,
    pub version: Option<String>,
    pub args: Option<String>,
    pub hosts: Vec<ScanHost>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanHost {
    pub addresses: Vec<String>,
    pub hostnames: Vec<Hostname>,
    pub ports: Vec<Port>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostnameKind {
    /// Named explicitly by the user on the scanner command line.
    User,
    /// Discovered during the scan (reverse DNS, certificates, ...).
    Other,
}

impl HostnameKind {
    pub fn from_type(t: &str) -> HostnameKind {
        if t == "user" { HostnameKind::User } else { HostnameKind::Other }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hostname {
    pub name: String,
    pub kind: HostnameKind,
}

impl Hostname {
    pub fn user(name: impl Into<String>) -> Self {
        Hostname { name: name.into(), kind: HostnameKind::User }
    }

    pub fn other(name: impl Into<String>) -> Self {
        Hostname { name: name.into(), kind: HostnameKind::Other }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Service {
    pub name: String,
    pub tunnel: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub id: u16,
    pub protocol: String,
    pub state: Option<String>,
    pub service: Service,
}

impl Port {
    pub fn tcp(id: u16, service: &str, tunnel: Option<&str>) -> Self {
        Port {
            id,
            protocol: "tcp".into(),
            state: Some("open".into()),
            service: Service { name: service.into(), tunnel: tunnel.map(str::to_string) },
        }
    }
}
