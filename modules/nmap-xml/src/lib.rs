//! Nmap XML (`-oX`) report parser.
//!
//! Only the parts of the document needed to find web services are kept:
//! per host its network addresses, hostnames and ports with their service
//! name and tunnel.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use sshots_core::{Hostname, HostnameKind, Port, ScanHost, ScanReport, Service};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Error)]
pub enum NmapXmlError {
    #[error("malformed XML at byte {position}: {source}")]
    Xml {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },

    #[error("invalid portid {value:?}")]
    InvalidPort { value: String },

    #[error("not an nmap XML report (no <nmaprun> element)")]
    NotNmap,

    #[error("document ends inside an open <{element}>")]
    Truncated { element: &'static str },
}

/// Read and parse a report file. Read failures map to `Error::Read`,
/// everything else to `Error::Parse`.
pub fn parse_file(path: impl AsRef<Path>) -> sshots_core::Result<ScanReport> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| sshots_core::Error::Read { path: path.to_path_buf(), source })?;
    let xml = String::from_utf8(bytes).map_err(|e| sshots_core::Error::Parse {
        path: path.to_path_buf(),
        message: format!("not valid UTF-8: {}", e),
    })?;
    let mut report = parse_str(&xml).map_err(|e| sshots_core::Error::Parse { path: path.to_path_buf(), message: e.to_string() })?;
    report.source = Some(path.to_path_buf());
    debug!(file = %path.display(), hosts = report.hosts.len(), args = report.args.as_deref().unwrap_or(""), "parsed nmap report");
    Ok(report)
}

/// Parse an Nmap XML document.
pub fn parse_str(xml: &str) -> Result<ScanReport, NmapXmlError> {
    let mut reader = Reader::from_str(xml);
    let mut builder = Builder::default();
    let mut buf = Vec::new();

    loop {
        let position = reader.buffer_position();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => builder.open(&e).map_err(|err| at(err, position))?,
            Ok(Event::Empty(e)) => {
                builder.open(&e).map_err(|err| at(err, position))?;
                builder.close(e.name().as_ref());
            }
            Ok(Event::End(e)) => builder.close(e.name().as_ref()),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(source) => return Err(NmapXmlError::Xml { position: reader.buffer_position(), source }),
        }
        buf.clear();
    }

    builder.finish()
}

fn at(err: NmapXmlError, position: usize) -> NmapXmlError {
    match err {
        NmapXmlError::Xml { source, .. } => NmapXmlError::Xml { position, source },
        other => other,
    }
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, NmapXmlError> {
    for a in e.attributes() {
        let a = a.map_err(|err| NmapXmlError::Xml { position: 0, source: err.into() })?;
        if a.key.as_ref() == key {
            let value = a.unescape_value().map_err(|source| NmapXmlError::Xml { position: 0, source })?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

#[derive(Default)]
struct Builder {
    report: ScanReport,
    saw_root: bool,
    host: Option<ScanHost>,
    port: Option<Port>,
}

impl Builder {
    fn open(&mut self, e: &BytesStart<'_>) -> Result<(), NmapXmlError> {
        match e.name().as_ref() {
            b"nmaprun" => {
                self.saw_root = true;
                self.report.scanner = attr(e, b"scanner")?;
                self.report.version = attr(e, b"version")?;
                self.report.args = attr(e, b"args")?;
            }
            b"host" => self.host = Some(ScanHost::default()),
            b"address" => {
                let Some(host) = self.host.as_mut() else { return Ok(()) };
                let Some(addr) = attr(e, b"addr")? else { return Ok(()) };
                match attr(e, b"addrtype")?.as_deref() {
                    Some("mac") => trace!(addr = %addr, "ignoring mac address"),
                    _ => host.addresses.push(addr),
                }
            }
            b"hostname" => {
                let Some(host) = self.host.as_mut() else { return Ok(()) };
                let Some(name) = attr(e, b"name")? else { return Ok(()) };
                let kind = attr(e, b"type")?.map(|t| HostnameKind::from_type(&t)).unwrap_or(HostnameKind::Other);
                host.hostnames.push(Hostname { name, kind });
            }
            b"port" => {
                if self.host.is_none() {
                    return Ok(());
                }
                let value = attr(e, b"portid")?.unwrap_or_default();
                let id = value.trim().parse::<u16>().map_err(|_| NmapXmlError::InvalidPort { value: value.clone() })?;
                let protocol = attr(e, b"protocol")?.unwrap_or_else(|| "tcp".to_string());
                self.port = Some(Port { id, protocol, state: None, service: Service::default() });
            }
            b"state" => {
                if let Some(port) = self.port.as_mut() {
                    port.state = attr(e, b"state")?;
                }
            }
            b"service" => {
                if let Some(port) = self.port.as_mut() {
                    port.service = Service { name: attr(e, b"name")?.unwrap_or_default(), tunnel: attr(e, b"tunnel")? };
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"port" => {
                if let (Some(port), Some(host)) = (self.port.take(), self.host.as_mut()) {
                    host.ports.push(port);
                }
            }
            b"host" => {
                self.port = None;
                if let Some(host) = self.host.take() {
                    self.report.hosts.push(host);
                }
            }
            _ => {}
        }
    }

    fn finish(self) -> Result<ScanReport, NmapXmlError> {
        if !self.saw_root {
            return Err(NmapXmlError::NotNmap);
        }
        if self.host.is_some() {
            return Err(NmapXmlError::Truncated { element: "host" });
        }
        Ok(self.report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE nmaprun>
<?xml-stylesheet href="file:///usr/bin/../share/nmap/nmap.xsl" type="text/xsl"?>
<nmaprun scanner="nmap" args="nmap -sV -oX scan.xml web01.corp 10.0.0.0/24" start="1700000000" version="7.94" xmloutputversion="1.05">
<scaninfo type="syn" protocol="tcp" numservices="1000" services="1-1000"/>
<hosthint><status state="up" reason="arp-response"/>
<address addr="10.0.0.9" addrtype="ipv4"/>
<hostnames><hostname name="hint.corp" type="PTR"/></hostnames>
</hosthint>
<host starttime="1700000001" endtime="1700000010"><status state="up" reason="arp-response" reason_ttl="0"/>
<address addr="10.0.0.5" addrtype="ipv4"/>
<address addr="00:11:22:33:44:55" addrtype="mac" vendor="Acme"/>
<hostnames>
<hostname name="web01.corp" type="user"/>
<hostname name="web01.int.corp" type="PTR"/>
</hostnames>
<ports><extraports state="closed" count="996"><extrareasons reason="reset" count="996"/></extraports>
<port protocol="tcp" portid="22"><state state="open" reason="syn-ack" reason_ttl="64"/><service name="ssh" product="OpenSSH" method="probed" conf="10"/></port>
<port protocol="tcp" portid="80"><state state="open" reason="syn-ack" reason_ttl="64"/><service name="http" product="nginx" method="probed" conf="10"/></port>
<port protocol="tcp" portid="443"><state state="open" reason="syn-ack" reason_ttl="64"/><service name="http" tunnel="ssl" method="probed" conf="10"/><script id="http-title" output="Welcome &amp; hello"/></port>
<port protocol="tcp" portid="9100"><state state="open" reason="syn-ack" reason_ttl="64"/></port>
</ports>
</host>
<host><status state="up" reason="echo-reply"/>
<address addr="fe80::1" addrtype="ipv6"/>
<hostnames/>
<ports><port protocol="tcp" portid="8080"><state state="open"/><service name="http-proxy"/></port></ports>
</host>
<runstats><finished time="1700000020" elapsed="20"/><hosts up="2" down="254" total="256"/></runstats>
</nmaprun>
"#;

    #[test]
    fn parses_run_metadata() {
        let r = parse_str(SAMPLE).unwrap();
        assert_eq!(r.scanner.as_deref(), Some("nmap"));
        assert_eq!(r.version.as_deref(), Some("7.94"));
        assert!(r.args.as_deref().unwrap().starts_with("nmap -sV"));
        assert_eq!(r.source, None);
    }

    #[test]
    fn hosthints_are_not_hosts() {
        let r = parse_str(SAMPLE).unwrap();
        assert_eq!(r.hosts.len(), 2);
        assert!(r.hosts.iter().all(|h| !h.addresses.contains(&"10.0.0.9".to_string())));
    }

    #[test]
    fn addresses_skip_mac() {
        let r = parse_str(SAMPLE).unwrap();
        assert_eq!(r.hosts[0].addresses, vec!["10.0.0.5"]);
        assert_eq!(r.hosts[1].addresses, vec!["fe80::1"]);
    }

    #[test]
    fn hostname_types() {
        let r = parse_str(SAMPLE).unwrap();
        assert_eq!(r.hosts[0].hostnames, vec![Hostname::user("web01.corp"), Hostname::other("web01.int.corp")]);
        assert!(r.hosts[1].hostnames.is_empty());
    }

    #[test]
    fn ports_and_services() {
        let r = parse_str(SAMPLE).unwrap();
        let ports = &r.hosts[0].ports;
        let ids: Vec<u16> = ports.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![22, 80, 443, 9100]);
        assert_eq!(ports[2].service.name, "http");
        assert_eq!(ports[2].service.tunnel.as_deref(), Some("ssl"));
        assert_eq!(ports[2].state.as_deref(), Some("open"));
        assert_eq!(ports[1].service.tunnel, None);
        assert_eq!(ports[3].service, Service::default());
        assert_eq!(r.hosts[1].ports[0].service.name, "http-proxy");
    }

    #[test]
    fn self_closing_host() {
        let r = parse_str(r#"<nmaprun><host/></nmaprun>"#).unwrap();
        assert_eq!(r.hosts, vec![ScanHost::default()]);
    }

    #[test]
    fn rejects_non_nmap_documents() {
        assert!(matches!(parse_str("<report><host/></report>"), Err(NmapXmlError::NotNmap)));
        assert!(matches!(parse_str(""), Err(NmapXmlError::NotNmap)));
    }

    #[test]
    fn rejects_bad_port_ids() {
        let xml = r#"<nmaprun><host><ports><port protocol="tcp" portid="70000"/></ports></host></nmaprun>"#;
        assert!(matches!(parse_str(xml), Err(NmapXmlError::InvalidPort { .. })));
        let xml = r#"<nmaprun><host><ports><port protocol="tcp"/></ports></host></nmaprun>"#;
        assert!(matches!(parse_str(xml), Err(NmapXmlError::InvalidPort { .. })));
    }

    #[test]
    fn rejects_truncated_documents() {
        let xml = r#"<nmaprun><host><address addr="10.0.0.1" addrtype="ipv4"/>"#;
        assert!(matches!(parse_str(xml), Err(NmapXmlError::Truncated { element: "host" })));
    }

    #[test]
    fn rejects_mismatched_tags() {
        let xml = r#"<nmaprun><host></nmaprun>"#;
        assert!(matches!(parse_str(xml), Err(NmapXmlError::Xml { .. })));
    }

    #[test]
    fn parse_file_records_source() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(SAMPLE.as_bytes()).unwrap();
        let r = parse_file(f.path()).unwrap();
        assert_eq!(r.source.as_deref(), Some(f.path()));
        assert_eq!(r.hosts.len(), 2);
    }

    #[test]
    fn parse_file_errors_are_classified() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.xml");
        assert_eq!(parse_file(&missing).unwrap_err().code(), "READ_FAILED");

        let bad = dir.path().join("bad.xml");
        std::fs::write(&bad, "<html></html>").unwrap();
        let err = parse_file(&bad).unwrap_err();
        assert_eq!(err.code(), "PARSE_FAILED");
        assert!(err.to_string().contains("bad.xml"));
    }
}
