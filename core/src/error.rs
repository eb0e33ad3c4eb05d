//! Error types shared by every sshots crate.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias over [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // === Targets ===
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("DNS resolution failed for: {hostname}")]
    DnsResolutionFailed { hostname: String },

    #[error("no targets found in the given scan reports")]
    NoTargets,

    // === Input ===
    #[error("error reading file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error parsing file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    // === Output ===
    #[error("file already exists, refusing to overwrite: {path}")]
    OutputExists { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // === Browser ===
    #[error("error launching browser: {0}")]
    BrowserLaunch(String),

    #[error("error navigating to {url}: {message}")]
    Navigate { url: String, message: String },

    #[error("error waiting to load {url}: {message}")]
    WaitLoad { url: String, message: String },

    #[error("error capturing {url}: {message}")]
    Screenshot { url: String, message: String },
}

impl Error {
    /// Whether the error ends the run. Per-endpoint capture failures and
    /// resolution failures are absorbed where they happen.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Error::DnsResolutionFailed { .. }
                | Error::Navigate { .. }
                | Error::WaitLoad { .. }
                | Error::Screenshot { .. }
        )
    }

    /// Stable code for log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Error::DnsResolutionFailed { .. } => "DNS_FAILED",
            Error::NoTargets => "NO_TARGETS",
            Error::Read { .. } => "READ_FAILED",
            Error::Parse { .. } => "PARSE_FAILED",
            Error::OutputExists { .. } => "OUTPUT_EXISTS",
            Error::Io(_) => "IO_ERROR",
            Error::BrowserLaunch(_) => "BROWSER_LAUNCH",
            Error::Navigate { .. } => "NAVIGATE_FAILED",
            Error::WaitLoad { .. } => "WAIT_LOAD_FAILED",
            Error::Screenshot { .. } => "SCREENSHOT_FAILED",
        }
    }
}
