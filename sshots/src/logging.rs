//! Logging setup using tracing.

use anyhow::anyhow;
use clap::ValueEnum;
use serde::Deserialize;
use tracing_subscriber::{
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line, human-readable
    #[default]
    Compact,
    /// Multi-line, human-readable
    Pretty,
    /// One JSON object per line
    Json,
}

/// Where log lines go
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStream {
    Stdout,
    #[default]
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Minimum level (trace, debug, info, warn, error)
    pub level: String,
    pub format: LogFormat,
    pub stream: LogStream,
    /// Raise browser-protocol diagnostics to trace
    pub trace: bool,
    /// Include the module path in each line
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: LogFormat::Compact,
            stream: LogStream::Stderr,
            trace: false,
            with_target: false,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn stream(mut self, stream: LogStream) -> Self {
        self.stream = stream;
        self
    }

    pub fn trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_target(mut self, with_target: bool) -> Self {
        self.with_target = with_target;
        self
    }

    /// Filter used when `RUST_LOG` is not set. Tracing raises both the
    /// session crate and the DevTools client to `trace`.
    pub fn directives(&self) -> String {
        if self.trace {
            format!("{},browser=trace,headless_chrome=trace", self.level)
        } else {
            format!("{},headless_chrome=warn", self.level)
        }
    }
}

/// Install the subscriber for this process. `log` records from
/// dependencies are forwarded into it.
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.directives()));

    let writer = match config.stream {
        LogStream::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogStream::Stderr => BoxMakeWriter::new(std::io::stderr),
    };

    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(config.with_target)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_writer(writer)
            .with_target(config.with_target)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(writer)
            .with_target(config.with_target)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()
        .map_err(|e| anyhow!("failed to install logger: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder() {
        let config = LogConfig::new()
            .level("debug")
            .format(LogFormat::Json)
            .stream(LogStream::Stdout)
            .with_target(true);
        assert!(config.with_target);
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.stream, LogStream::Stdout);
    }

    #[test]
    fn trace_raises_browser_target() {
        assert_eq!(LogConfig::new().directives(), "info,headless_chrome=warn");
        assert_eq!(
            LogConfig::new().level("debug").trace(true).directives(),
            "debug,browser=trace,headless_chrome=trace"
        );
        let traced = LogConfig::new().trace(true).directives();
        assert!(traced.starts_with("info,"));
        assert!(traced.split(',').any(|d| d == "browser=trace"));
    }
}
