use crate::logging::LogFormat;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Jsonl,
}

#[derive(Debug, Parser)]
#[command(name = "sshots", version, about = "Screenshot the web services found in Nmap XML reports")]
pub struct Cli {
    /// Optional config file (YAML). If omitted, loads ./sshots.yaml if present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Debug logging (also reports hostnames that fail to resolve)
    #[arg(long, global = true)]
    pub debug: bool,
    /// Log line format
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print version information
    Version,
    /// Capture a screenshot of every web endpoint into one HTML report
    #[cfg(feature = "browser")]
    Capture(CaptureArgs),
    /// Print the deduplicated, sorted endpoint list without capturing
    Targets(TargetsArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Nmap XML file (repeatable)
    #[arg(short = 'n', long = "nmap-xml", value_name = "FILE", required = true, num_args = 1..)]
    pub nmap_xml: Vec<PathBuf>,
    /// Use all known hostnames; discovered ones are kept only if they resolve
    #[arg(short = 'a', long)]
    pub all_hostnames: bool,
}

#[cfg(feature = "browser")]
#[derive(Debug, Args)]
pub struct CaptureArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Path to the Chrome/Chromium binary (auto-detected if omitted)
    #[arg(short = 'b', long, value_name = "PATH")]
    pub bin: Option<PathBuf>,
    /// Run the browser headless [default: true]
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub headless: Option<bool>,
    /// Output file [default: http-sshots.html]
    #[arg(short = 'o', long, value_name = "FILE")]
    pub out: Option<PathBuf>,
    /// Overwrite the output file if it exists
    #[arg(long)]
    pub overwrite: bool,
    /// Ignore certificate errors [default: true]
    #[arg(short = 'i', long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub ignore_certs: Option<bool>,
    /// Trace browser protocol traffic
    #[arg(long)]
    pub trace: bool,
    /// Use the default browser context instead of an isolated one
    #[arg(long)]
    pub disable_incognito: bool,
    /// Disable the browser sandbox (needed when running as root)
    #[arg(long)]
    pub no_sandbox: bool,    /// Capture only the visible viewport instead of the whole page
    #[arg(long)]
    pub viewport_only: bool,
}

#[derive(Debug, Args)]
pub struct TargetsArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Output format: text, json, or jsonl
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}
