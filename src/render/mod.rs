//! Output sinks for resolved tags.
//!
//! The facade resolves tags once and hands each one to a [`TagSink`]:
//!
//! - [`HtmlSink`] builds the markup string returned by `Page::script`
//! - [`HeadRegistry`] collects head elements by dedupe key, the way a page
//!   renderer registers scripts and stylesheets for later output
//!
//! Framework integrations implement `TagSink` themselves.

mod html;
mod registry;

pub use html::HtmlSink;
pub use registry::{HeadItem, HeadRegistry};

use anyhow::Result;

use crate::resolve::Attrs;
use crate::utils::html::element;

/// Receives the elements a page needs.
pub trait TagSink {
    /// An external script. `key` identifies it for deduplication.
    fn script_file(&mut self, url: &str, attrs: &Attrs, key: &str) -> Result<()>;

    /// An inline script. `key` identifies it for deduplication.
    fn inline_script(&mut self, content: &str, attrs: &Attrs, key: &str) -> Result<()>;

    /// A stylesheet.
    fn css_file(&mut self, url: &str, attrs: &Attrs) -> Result<()>;

    /// Any other `<link>` element, e.g. `rel="modulepreload"`.
    fn link(&mut self, attrs: &Attrs) -> Result<()>;
}

// ============================================================================
// element rendering shared by the sinks
// ============================================================================

/// `<script src="url" …></script>`
pub fn script_file_tag(url: &str, attrs: &Attrs) -> String {
    let mut all = Attrs::new().with("src", url);
    all.merge(attrs);
    element("script", &all.render(), "")
}

/// `<script …>content</script>`
pub fn inline_script_tag(content: &str, attrs: &Attrs) -> String {
    element("script", &attrs.render(), content)
}

/// `<link href="url" rel="stylesheet" …>`
pub fn css_file_tag(url: &str, attrs: &Attrs) -> String {
    let mut all = Attrs::new().with("href", url);
    if attrs.get("rel").is_none() {
        all.set("rel", "stylesheet");
    }
    all.merge(attrs);
    element("link", &all.render(), "")
}

pub fn link_tag(attrs: &Attrs) -> String {
    element("link", &attrs.render(), "")
}
