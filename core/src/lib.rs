//! Core types and the target pipeline shared by the sshots crates:
//! endpoint extraction from scan reports, deduplication and natural
//! ordering, and the capture loop over an abstract browser session.

pub mod capture;
pub mod endpoint;
pub mod error;
pub mod extract;
pub mod natural;
pub mod resolver;
pub mod scan;
pub mod target_set;

pub use capture::{capture_all, Capture, CaptureSummary, ReportSink};
pub use endpoint::{Endpoint, Scheme};
pub use error::{Error, Result};
pub use extract::{extract_host, extract_report, ExtractOptions};
pub use resolver::{Resolver, SystemResolver};
pub use scan::{Hostname, HostnameKind, Port, ScanHost, ScanReport, Service};
pub use target_set::TargetSet;

pub const fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
