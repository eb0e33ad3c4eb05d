//! Parse, extract, deduplicate, then capture into the report.

use sshots_core::{capture_all, extract_report, Capture, CaptureSummary, Endpoint, Error, ExtractOptions, Resolver, Result, TargetSet};
use std::path::{Path, PathBuf};
use tracing::info;

/// Everything a capture run needs apart from the browser.
#[derive(Debug, Clone)]
pub struct Job {
    pub inputs: Vec<PathBuf>,
    pub extract: ExtractOptions,
    pub out: PathBuf,
    pub overwrite: bool,
}

/// Build the ordered, deduplicated endpoint list from every input file.
pub fn collect_targets<R>(inputs: &[PathBuf], opts: &ExtractOptions, resolver: &R) -> Result<TargetSet>
where
    R: Resolver + ?Sized,
{
    let mut targets = TargetSet::new();
    for path in inputs {
        let report = nmap_xml::parse_file(path)?;
        let found = extract_report(&report, opts, resolver);
        let added = targets.add(found);
        info!(file = %path.display(), hosts = report.hosts.len(), added, "loaded scan report");
    }
    if targets.is_empty() {
        return Err(Error::NoTargets);
    }
    Ok(targets)
}

/// Open the report, then start the browser and capture every target.
/// The report is created first so an existing file stops the run before
/// a browser is launched.
pub fn capture_to_report<C, L>(targets: &[Endpoint], out: &Path, overwrite: bool, launch: L) -> Result<CaptureSummary>
where
    C: Capture,
    L: FnOnce() -> Result<C>,
{
    let mut report = html_report::create(out, overwrite)?;
    let mut session = launch()?;
    let summary = capture_all(targets, &mut session, &mut report)?;
    drop(session);
    let blocks = report.finish()?;
    info!(file = %out.display(), blocks, "report written");
    Ok(summary)
}

pub fn run<R, C, L>(job: &Job, resolver: &R, launch: L) -> Result<CaptureSummary>
where
    R: Resolver + ?Sized,
    C: Capture,
    L: FnOnce() -> Result<C>,
{
    let targets = collect_targets(&job.inputs, &job.extract, resolver)?;
    info!(count = targets.len(), "targets ready");
    capture_to_report(targets.as_slice(), &job.out, job.overwrite, launch)
}
