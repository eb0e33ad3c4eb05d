//! Capture loop over an abstract browser session.

use crate::endpoint::Endpoint;
use crate::{Error, Result};
use tracing::{info, warn};

/// A browser page that can be pointed at a URL and photographed.
pub trait Capture {
    fn navigate(&mut self, url: &str) -> Result<()>;
    fn wait_load(&mut self) -> Result<()>;
    /// PNG bytes of the current page.
    fn screenshot(&mut self) -> Result<Vec<u8>>;
}

/// Destination for successful captures, written as they happen.
pub trait ReportSink {
    fn append(&mut self, endpoint: &Endpoint, png: &[u8]) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct CaptureSummary {
    pub captured: usize,
    pub failures: Vec<(Endpoint, Error)>,
}

impl CaptureSummary {
    pub fn attempted(&self) -> usize {
        self.captured + self.failures.len()
    }
}

/// Capture every endpoint in order. A recoverable failure at any step is
/// logged and the endpoint skipped. Sink write errors and fatal session
/// errors stop the loop.
pub fn capture_all<C, S>(targets: &[Endpoint], session: &mut C, sink: &mut S) -> Result<CaptureSummary>
where
    C: Capture + ?Sized,
    S: ReportSink + ?Sized,
{
    let mut summary = CaptureSummary::default();
    for target in targets {
        info!(target = %target, "capturing");
        match capture_one(target, session) {
            Ok(png) => {
                sink.append(target, &png)?;
                summary.captured += 1;
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(target = %target, code = e.code(), "{}", e);
                summary.failures.push((target.clone(), e));
            }
        }
    }
    Ok(summary)
}

fn capture_one<C: Capture + ?Sized>(target: &Endpoint, session: &mut C) -> Result<Vec<u8>> {
    let url = target.url();
    session.navigate(&url)?;
    session.wait_load()?;
    session.screenshot()
}
