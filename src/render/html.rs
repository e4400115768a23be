//! String-building sink.

use anyhow::Result;

use super::{TagSink, css_file_tag, inline_script_tag, link_tag, script_file_tag};
use crate::resolve::Attrs;

/// Line separator of the produced markup.
pub const LINE_SEPARATOR: &str = "\r\n";

/// Collects rendered elements, one per line.
#[derive(Debug, Default)]
pub struct HtmlSink {
    lines: Vec<String>,
}

impl HtmlSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Join every element with `\r\n`.
    pub fn into_html(self) -> String {
        self.lines.join(LINE_SEPARATOR)
    }
}

impl TagSink for HtmlSink {
    fn script_file(&mut self, url: &str, attrs: &Attrs, _key: &str) -> Result<()> {
        self.lines.push(script_file_tag(url, attrs));
        Ok(())
    }

    fn inline_script(&mut self, content: &str, attrs: &Attrs, _key: &str) -> Result<()> {
        self.lines.push(inline_script_tag(content, attrs));
        Ok(())
    }

    fn css_file(&mut self, url: &str, attrs: &Attrs) -> Result<()> {
        self.lines.push(css_file_tag(url, attrs));
        Ok(())
    }

    fn link(&mut self, attrs: &Attrs) -> Result<()> {
        self.lines.push(link_tag(attrs));
        Ok(())
    }
}
