//! Optional YAML config file and the merged run settings.
//!
//! Precedence is: explicit flag, then config file, then built-in default.

use crate::cli::{Cli, Commands, InputArgs};
use crate::logging::{LogConfig, LogFormat, LogStream};
use anyhow::{Context, Result};
use serde::Deserialize;
use sshots_core::ExtractOptions;
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "browser")]
use crate::cli::CaptureArgs;
#[cfg(feature = "browser")]
use crate::pipeline::Job;
#[cfg(feature = "browser")]
use browser::BrowserOptions;

pub const DEFAULT_CONFIG: &str = "sshots.yaml";
pub const DEFAULT_OUT: &str = "http-sshots.html";

#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
pub struct CaptureConfig {
    pub all_hostnames: Option<bool>,
    pub bin: Option<PathBuf>,
    pub headless: Option<bool>,
    pub out: Option<PathBuf>,
    pub overwrite: Option<bool>,
    pub ignore_certs: Option<bool>,
    pub trace: Option<bool>,
    pub disable_incognito: Option<bool>,
    pub no_sandbox: Option<bool>,
    pub full_page: Option<bool>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<LogFormat>,
    pub stream: Option<LogStream>,
    pub debug: Option<bool>,
    /// Include the module path in each line.
    pub with_target: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub capture: Option<CaptureConfig>,
    pub logging: Option<LoggingConfig>,
}

/// Load `path`, or `./sshots.yaml` when no path is given and it exists.
/// A named file that cannot be read or parsed is an error.
pub fn load_config(path: Option<&Path>) -> Result<Option<Config>> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = Path::new(DEFAULT_CONFIG);
            if p.exists() { p.to_path_buf() } else { return Ok(None); }
        }
    };
    let s = fs::read_to_string(&path).with_context(|| format!("error reading config {}", path.display()))?;
    let cfg = serde_yaml::from_str(&s).with_context(|| format!("error parsing config {}", path.display()))?;
    Ok(Some(cfg))
}

fn capture_section(cfg: Option<&Config>) -> CaptureConfig {
    cfg.and_then(|c| c.capture.clone()).unwrap_or_default()
}

fn logging_section(cfg: Option<&Config>) -> LoggingConfig {
    cfg.and_then(|c| c.logging.clone()).unwrap_or_default()
}

pub fn debug_enabled(cli: &Cli, cfg: Option<&Config>) -> bool {
    cli.debug || logging_section(cfg).debug.unwrap_or(false)
}

pub fn log_config(cli: &Cli, cfg: Option<&Config>) -> LogConfig {
    let l = logging_section(cfg);
    let level = if debug_enabled(cli, cfg) {
        "debug".to_string()
    } else {
        l.level.unwrap_or_else(|| "info".to_string())
    };
    let trace = match &cli.command {
        #[cfg(feature = "browser")]
        Commands::Capture(args) => args.trace || capture_section(cfg).trace.unwrap_or(false),
        _ => false,
    };
    LogConfig::new()
        .level(level)
        .format(cli.log_format.or(l.format).unwrap_or_default())
        .stream(l.stream.unwrap_or_default())
        .with_target(l.with_target.unwrap_or(false))
        .trace(trace)
}

pub fn extract_options(input: &InputArgs, cfg: Option<&Config>, debug: bool) -> ExtractOptions {
    ExtractOptions {
        all_hostnames: input.all_hostnames || capture_section(cfg).all_hostnames.unwrap_or(false),
        debug,
    }
}

#[cfg(feature = "browser")]
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub job: Job,
    pub browser: BrowserOptions,
}

#[cfg(feature = "browser")]
impl CaptureSettings {
    pub fn resolve(args: &CaptureArgs, cfg: Option<&Config>, debug: bool) -> Self {
        let c = capture_section(cfg);
        let defaults = BrowserOptions::default();
        let job = Job {
            inputs: args.input.nmap_xml.clone(),
            extract: extract_options(&args.input, cfg, debug),
            out: args.out.clone().or(c.out).unwrap_or_else(|| PathBuf::from(DEFAULT_OUT)),
            overwrite: args.overwrite || c.overwrite.unwrap_or(false),
        };
        let browser = BrowserOptions {
            headless: args.headless.or(c.headless).unwrap_or(defaults.headless),
            bin: args.bin.clone().or(c.bin),
            ignore_certs: args.ignore_certs.or(c.ignore_certs).unwrap_or(defaults.ignore_certs),
            incognito: !(args.disable_incognito || c.disable_incognito.unwrap_or(false)),
            trace: args.trace || c.trace.unwrap_or(false),
            sandbox: !(args.no_sandbox || c.no_sandbox.unwrap_or(false)),
            full_page: if args.viewport_only { false } else { c.full_page.unwrap_or(defaults.full_page) },
            idle_timeout: c.idle_timeout_secs.map(std::time::Duration::from_secs).unwrap_or(defaults.idle_timeout),
            ..defaults
        };
        CaptureSettings { job, browser }
    }
}
