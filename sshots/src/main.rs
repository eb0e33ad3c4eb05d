use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use sshots_core::{Endpoint, SystemResolver};
use std::io::{self, BufWriter, Write};
use tracing::info;

mod cli;
mod config;
mod logging;
mod pipeline;

use cli::{Cli, Commands, OutputFormat};

fn endpoint_json(e: &Endpoint) -> serde_json::Value {
    json!({
        "scheme": e.scheme().as_str(),
        "host": e.host(),
        "port": e.port(),
        "url": e.url(),
    })
}

fn print_targets<W: Write>(out: &mut W, targets: &[Endpoint], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for t in targets {
                writeln!(out, "{}", t.url())?;
            }
        }
        OutputFormat::Json => {
            let all: Vec<_> = targets.iter().map(endpoint_json).collect();
            writeln!(out, "{}", serde_json::to_string_pretty(&all)?)?;
        }
        OutputFormat::Jsonl => {
            for t in targets {
                writeln!(out, "{}", endpoint_json(t))?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(cli.config.as_deref())?;
    logging::init_logging(&config::log_config(&cli, cfg.as_ref()))?;
    let debug = config::debug_enabled(&cli, cfg.as_ref());

    match &cli.command {
        Commands::Version => {
            println!("sshots {} (core {})", env!("CARGO_PKG_VERSION"), sshots_core::version());
        }
        Commands::Targets(args) => {
            let opts = config::extract_options(&args.input, cfg.as_ref(), debug);
            let targets = pipeline::collect_targets(&args.input.nmap_xml, &opts, &SystemResolver)
                .context("collecting targets")?;
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            print_targets(&mut out, targets.as_slice(), args.format)?;
        }
        #[cfg(feature = "browser")]
        Commands::Capture(args) => {
            let settings = config::CaptureSettings::resolve(args, cfg.as_ref(), debug);
            let summary = pipeline::run(&settings.job, &SystemResolver, || {
                browser::ChromeSession::launch(&settings.browser)
            })
            .with_context(|| format!("capture to {}", settings.job.out.display()))?;
            info!(
                attempted = summary.attempted(),
                captured = summary.captured,
                failed = summary.failures.len(),
                out = %settings.job.out.display(),
                "done"
            );
        }
    }
    Ok(())
}
