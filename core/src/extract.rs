//! Turn parsed scan hosts into candidate HTTP(S) endpoints.

use crate::endpoint::{Endpoint, Scheme};
use crate::resolver::Resolver;
use crate::scan::{HostnameKind, ScanHost, ScanReport};
use tracing::debug;

/// Extraction policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Include discovered hostnames, provided they resolve right now.
    pub all_hostnames: bool,
    /// Log hostnames that fail to resolve.
    pub debug: bool,
}

/// Candidates for one host. Not deduplicated.
pub fn extract_host<R>(host: &ScanHost, opts: &ExtractOptions, resolver: &R) -> Vec<Endpoint>
where
    R: Resolver + ?Sized,
{
    let mut out = Vec::new();
    for port in &host.ports {
        if !port.service.name.starts_with("http") {
            continue;
        }
        let scheme = Scheme::for_tunnel(port.service.tunnel.as_deref());
        debug!(
            port = port.id,
            protocol = %port.protocol,
            state = port.state.as_deref().unwrap_or("unknown"),
            service = %port.service.name,
            scheme = scheme.as_str(),
            "web service"
        );

        for addr in &host.addresses {
            push(&mut out, scheme, addr, port.id);
        }

        for hostname in &host.hostnames {
            if hostname.kind == HostnameKind::User {
                push(&mut out, scheme, &hostname.name, port.id);
                continue;
            }
            if !opts.all_hostnames {
                continue;
            }
            match resolver.resolve(&hostname.name) {
                Ok(()) => push(&mut out, scheme, &hostname.name, port.id),
                Err(e) => {
                    if opts.debug {
                        debug!(hostname = %hostname.name, error = %e, "failed to resolve");
                    }
                }
            }
        }
    }
    out
}

/// Candidates for every host of a report, in document order.
pub fn extract_report<R>(report: &ScanReport, opts: &ExtractOptions, resolver: &R) -> Vec<Endpoint>
where
    R: Resolver + ?Sized,
{
    report
        .hosts
        .iter()
        .flat_map(|h| extract_host(h, opts, resolver))
        .collect()
}

fn push(out: &mut Vec<Endpoint>, scheme: Scheme, host: &str, port: u16) {
    match Endpoint::new(scheme, host, port) {
        Ok(e) => out.push(e),
        Err(e) => debug!(error = %e, "skipping candidate"),
    }
}
