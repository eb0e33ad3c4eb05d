//! Streaming HTML screenshot report.
//!
//! The header goes out when the report is created, each capture is written
//! and flushed as soon as it is appended, and the footer is written either
//! by [`HtmlReport::finish`] or, failing that, when the report is dropped.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sshots_core::{Endpoint, Error, ReportSink, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, warn};

const HEADER: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta http-equiv="X-UA-Compatible" content="ie=edge">
    <title>HTTP Screenshots</title>
  </head>
  <body>
"#;

const FOOTER: &str = r#"
  </body>
</html>
"#;

/// Thumbnail width; a click toggles between this and full width.
const THUMB_WIDTH: &str = "400";

pub struct HtmlReport<W: Write> {
    out: W,
    blocks: usize,
    finished: bool,
}

/// Open `path` for the report. Without `overwrite` the file must not exist.
pub fn create(path: impl AsRef<Path>, overwrite: bool) -> Result<HtmlReport<BufWriter<File>>> {
    let path = path.as_ref();
    let mut opts = OpenOptions::new();
    opts.write(true);
    if overwrite {
        opts.create(true).truncate(true);
    } else {
        opts.create_new(true);
    }
    let file = opts.open(path).map_err(|e| match e.kind() {
        io::ErrorKind::AlreadyExists => Error::OutputExists { path: path.to_path_buf() },
        _ => Error::Io(e),
    })?;
    debug!(file = %path.display(), overwrite, "opened report");
    Ok(HtmlReport::new(BufWriter::new(file))?)
}

impl<W: Write> HtmlReport<W> {
    /// Start a report on `out`, writing the header.
    pub fn new(mut out: W) -> io::Result<Self> {
        out.write_all(HEADER.as_bytes())?;
        let generated = OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default();
        writeln!(out, "<!-- sshots {} {} -->", sshots_core::version(), generated)?;
        out.flush()?;
        Ok(HtmlReport { out, blocks: 0, finished: false })
    }

    /// Write one capture block and flush it.
    pub fn append_png(&mut self, url: &str, png: &[u8]) -> io::Result<()> {
        let url = escape(url);
        let data = STANDARD.encode(png);
        write!(
            self.out,
            "\n<a href='{url}' target=_blank style='font-size:x-large'>\n{url}\n</a>\n<br>\n\
             <img src='data:image/png;base64,{data}' width={w} border=1 style='max-width:1024; margin-top:5px;'\n \
             onclick='this.setAttribute(\"width\", this.getAttribute(\"width\") === \"{w}\" ? \"100%\" : \"{w}\")' />\n\
             <hr style=\"margin:20px 0 20px 0\">\n",
            url = url,
            data = data,
            w = THUMB_WIDTH,
        )?;
        self.out.flush()?;
        self.blocks += 1;
        Ok(())
    }

    /// Write the footer and return how many captures the report holds.
    pub fn finish(mut self) -> io::Result<usize> {
        self.finished = true;
        self.write_footer()?;
        Ok(self.blocks)
    }

    fn write_footer(&mut self) -> io::Result<()> {
        self.out.write_all(FOOTER.as_bytes())?;
        self.out.flush()
    }
}

impl<W: Write> ReportSink for HtmlReport<W> {
    fn append(&mut self, endpoint: &Endpoint, png: &[u8]) -> Result<()> {
        self.append_png(&endpoint.url(), png)?;
        Ok(())
    }
}

impl<W: Write> Drop for HtmlReport<W> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.write_footer() {
                warn!(error = %e, "failed to terminate report");
            }
        }
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sshots_core::Scheme;

    fn ep(host: &str, port: u16) -> Endpoint {
        Endpoint::new(Scheme::Http, host, port).unwrap()
    }

    #[test]
    fn header_blocks_footer() {
        let mut buf = Vec::new();
        {
            let mut r = HtmlReport::new(&mut buf).unwrap();
            r.append(&ep("10.0.0.1", 80), b"png-1").unwrap();
            r.append(&ep("10.0.0.2", 8080), b"png-2").unwrap();
            assert_eq!(r.finish().unwrap(), 2);
        }
        let html = String::from_utf8(buf).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.trim_end().ends_with("</html>"));
        assert_eq!(html.matches("</html>").count(), 1);
        assert_eq!(html.matches("<img ").count(), 2);
        assert!(html.contains("<a href='http://10.0.0.1:80' target=_blank"));
        assert!(html.contains(&format!("data:image/png;base64,{}", STANDARD.encode(b"png-2"))));
        assert!(html.contains(r#"=== "400" ? "100%" : "400""#));
        let first = html.find("10.0.0.1:80").unwrap();
        let second = html.find("10.0.0.2:8080").unwrap();
        assert!(first < second);
    }

    #[test]
    fn drop_writes_footer() {
        let mut buf = Vec::new();
        {
            let mut r = HtmlReport::new(&mut buf).unwrap();
            r.append(&ep("h", 80), b"x").unwrap();
        }
        let html = String::from_utf8(buf).unwrap();
        assert_eq!(html.matches("</html>").count(), 1);
    }

    #[test]
    fn blocks_are_flushed_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.html");
        let mut r = create(&path, false).unwrap();
        r.append(&ep("h", 80), b"x").unwrap();
        let partial = std::fs::read_to_string(&path).unwrap();
        assert!(partial.contains("http://h:80"));
        assert!(!partial.contains("</html>"));
        r.finish().unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("</html>"));
    }

    #[test]
    fn existing_file_needs_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.html");
        std::fs::write(&path, "old").unwrap();
        let err = create(&path, false).err().unwrap();
        assert_eq!(err.code(), "OUTPUT_EXISTS");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old");

        create(&path, true).unwrap().finish().unwrap();
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(!html.contains("old"));
        assert!(html.contains("<title>HTTP Screenshots</title>"));
    }

    #[test]
    fn urls_are_escaped() {
        assert_eq!(escape("http://a'b\"<c>&:80"), "http://a&#39;b&quot;&lt;c&gt;&amp;:80");
    }
}
