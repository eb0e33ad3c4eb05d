//! Chrome/Chromium capture session over the DevTools protocol.

use anyhow::{anyhow, Context as _};
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions, Tab};
use sshots_core::{Capture, Error, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    /// Browser binary. Auto-detected when unset.
    pub bin: Option<PathBuf>,
    pub ignore_certs: bool,
    /// Run the page in its own isolated browser context.
    pub incognito: bool,
    /// Log every DevTools step.
    pub trace: bool,
    pub sandbox: bool,
    pub window_size: (u32, u32),
    /// Capture the whole document rather than the visible viewport.
    pub full_page: bool,
    /// How long the browser may stay silent before the connection is dropped.
    pub idle_timeout: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            bin: None,
            ignore_certs: true,
            incognito: true,
            trace: false,
            sandbox: true,
            window_size: (1440, 900),
            full_page: true,
            idle_timeout: Duration::from_secs(300),
        }
    }
}

/// One browser process driving a single page for the whole run.
pub struct ChromeSession {
    // Dropping the browser kills the process, so it must outlive the tab.
    tab: Arc<Tab>,
    _browser: Browser,
    trace: bool,
    full_page: bool,
    current: String,
}

impl ChromeSession {
    pub fn launch(opts: &BrowserOptions) -> Result<Self> {
        let (browser, tab) = open(opts).map_err(|e| Error::BrowserLaunch(format!("{:#}", e)))?;
        info!(
            headless = opts.headless,
            incognito = opts.incognito,
            full_page = opts.full_page,
            ignore_certs = opts.ignore_certs,
            "browser ready"
        );
        Ok(ChromeSession { tab, _browser: browser, trace: opts.trace, full_page: opts.full_page, current: String::new() })
    }
}

fn open(opts: &BrowserOptions) -> anyhow::Result<(Browser, Arc<Tab>)> {
    let launch = LaunchOptions::default_builder()
        .headless(opts.headless)
        .sandbox(opts.sandbox)
        .path(opts.bin.clone())
        .ignore_certificate_errors(opts.ignore_certs)
        .window_size(Some(opts.window_size))
        .idle_browser_timeout(opts.idle_timeout)
        .build()
        .map_err(|e| anyhow!("invalid launch options: {}", e))?;
    debug!(bin = ?opts.bin, "launching browser");

    let browser = Browser::new(launch).context("starting browser process")?;
    let tab = if opts.incognito {
        browser.new_context().context("creating isolated context")?.new_tab().context("opening page")?
    } else {
        browser.new_tab().context("opening page")?
    };
    Ok((browser, tab))
}

impl ChromeSession {
    /// Clip covering the whole document, or `None` for the viewport.
    fn page_clip(&self) -> anyhow::Result<Option<Page::Viewport>> {
        if !self.full_page {
            return Ok(None);
        }
        let metrics = self.tab.call_method(Page::GetLayoutMetrics(None)).context("reading layout metrics")?;
        let size = metrics.css_content_size;
        if self.trace {
            trace!(url = %self.current, width = size.width, height = size.height, "content size");
        }
        Ok(full_page_clip(size.width, size.height))
    }
}

/// Chrome refuses textures taller than this.
const MAX_CAPTURE_HEIGHT: f64 = 16384.0;

fn full_page_clip(width: f64, height: f64) -> Option<Page::Viewport> {
    if !(width >= 1.0 && height >= 1.0) {
        return None;
    }
    Some(Page::Viewport { x: 0.0, y: 0.0, width: width.ceil(), height: height.ceil().min(MAX_CAPTURE_HEIGHT), scale: 1.0 })
}

impl Capture for ChromeSession {
    fn navigate(&mut self, url: &str) -> Result<()> {
        if self.trace {
            trace!(url, "Page.navigate");
        }
        self.current = url.to_string();
        self.tab
            .navigate_to(url)
            .map_err(|e| Error::Navigate { url: url.to_string(), message: format!("{:#}", e) })?;
        Ok(())
    }

    fn wait_load(&mut self) -> Result<()> {
        if self.trace {
            trace!(url = %self.current, "waiting for load");
        }
        self.tab
            .wait_until_navigated()
            .map_err(|e| Error::WaitLoad { url: self.current.clone(), message: format!("{:#}", e) })?;
        Ok(())
    }

    fn screenshot(&mut self) -> Result<Vec<u8>> {
        if self.trace {
            trace!(url = %self.current, "Page.captureScreenshot");
        }
        let clip = self
            .page_clip()
            .map_err(|e| Error::Screenshot { url: self.current.clone(), message: format!("{:#}", e) })?;
        let png = self
            .tab
            .capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, clip, true)
            .map_err(|e| Error::Screenshot { url: self.current.clone(), message: format!("{:#}", e) })?;
        if self.trace {
            trace!(url = %self.current, bytes = png.len(), "captured");
        }
        Ok(png)
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        if let Err(e) = self.tab.close(false) {
            warn!(error = %e, "failed to close page");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_defaults() {
        let o = BrowserOptions::default();
        assert!(o.headless);
        assert!(o.ignore_certs);
        assert!(o.incognito);
        assert!(!o.trace);
        assert!(o.sandbox);
        assert!(o.bin.is_none());
        assert!(o.full_page);
    }

    #[test]
    fn full_page_clip_covers_the_document() {
        let clip = full_page_clip(1440.0, 5230.4).unwrap();
        assert_eq!((clip.x, clip.y), (0.0, 0.0));
        assert_eq!(clip.width, 1440.0);
        assert_eq!(clip.height, 5231.0);
        assert_eq!(clip.scale, 1.0);
    }

    #[test]
    fn full_page_clip_limits() {
        assert_eq!(full_page_clip(1440.0, 100_000.0).unwrap().height, MAX_CAPTURE_HEIGHT);
        assert!(full_page_clip(0.0, 900.0).is_none());
        assert!(full_page_clip(1440.0, f64::NAN).is_none());
    }

    #[test]
    fn missing_binary_is_a_launch_error() {
        let opts = BrowserOptions { bin: Some("/nonexistent/sshots-test-chrome".into()), ..Default::default() };
        let err = ChromeSession::launch(&opts).err().unwrap();
        assert_eq!(err.code(), "BROWSER_LAUNCH");
        assert!(err.is_fatal());
    }
}
