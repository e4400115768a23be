//! Registration sink: head elements collected by key.

use anyhow::Result;
use rustc_hash::FxHashSet;

use super::{TagSink, css_file_tag, inline_script_tag, link_tag, script_file_tag};
use crate::resolve::{AttrValue, Attrs};

/// One registered head element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadItem {
    Script { url: String, attrs: Attrs },
    InlineScript { content: String, attrs: Attrs },
    Css { url: String, attrs: Attrs },
    Link { attrs: Attrs },
}

impl HeadItem {
    pub fn render(&self) -> String {
        match self {
            Self::Script { url, attrs } => script_file_tag(url, attrs),
            Self::InlineScript { content, attrs } => inline_script_tag(content, attrs),
            Self::Css { url, attrs } => css_file_tag(url, attrs),
            Self::Link { attrs } => link_tag(attrs),
        }
    }
}

/// Collects head elements for a page, keeping the first registration of
/// every key.
///
/// Scripts are keyed by the caller's key, stylesheets by URL and links by
/// `href`.
#[derive(Debug, Default)]
pub struct HeadRegistry {
    items: Vec<HeadItem>,
    keys: FxHashSet<String>,
}

impl HeadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[HeadItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Render every element, one per line.
    pub fn render(&self) -> String {
        self.items
            .iter()
            .map(HeadItem::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn register(&mut self, key: String, item: HeadItem) {
        if self.keys.insert(key) {
            self.items.push(item);
        }
    }
}

impl TagSink for HeadRegistry {
    fn script_file(&mut self, url: &str, attrs: &Attrs, key: &str) -> Result<()> {
        let item = HeadItem::Script {
            url: url.to_string(),
            attrs: attrs.clone(),
        };
        self.register(format!("script:{key}"), item);
        Ok(())
    }

    fn inline_script(&mut self, content: &str, attrs: &Attrs, key: &str) -> Result<()> {
        let item = HeadItem::InlineScript {
            content: content.to_string(),
            attrs: attrs.clone(),
        };
        self.register(format!("script:{key}"), item);
        Ok(())
    }

    fn css_file(&mut self, url: &str, attrs: &Attrs) -> Result<()> {
        let item = HeadItem::Css {
            url: url.to_string(),
            attrs: attrs.clone(),
        };
        self.register(format!("css:{url}"), item);
        Ok(())
    }

    fn link(&mut self, attrs: &Attrs) -> Result<()> {
        let key = match attrs.get("href") {
            Some(AttrValue::Text(href)) => format!("link:{href}"),
            _ => format!("link:{}", attrs.render()),
        };
        self.register(key, HeadItem::Link { attrs: attrs.clone() });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_registration_wins() {
        let mut head = HeadRegistry::new();
        let module = Attrs::new().with("type", "module");
        head.script_file("/dist/a.js", &module, "src/a.js").unwrap();
        head.script_file("/dist/a2.js", &module, "src/a.js").unwrap();
        head.css_file("/dist/a.css", &Attrs::new()).unwrap();
        head.css_file("/dist/a.css", &Attrs::new().with("media", "print"))
            .unwrap();

        assert_eq!(head.len(), 2);
        assert_eq!(
            head.items()[0],
            HeadItem::Script {
                url: "/dist/a.js".into(),
                attrs: module,
            }
        );
    }

    #[test]
    fn test_links_keyed_by_href() {
        let mut head = HeadRegistry::new();
        let preload = Attrs::new()
            .with("rel", "modulepreload")
            .with("href", "/dist/util.js");
        head.link(&preload).unwrap();
        head.link(&preload).unwrap();
        assert_eq!(head.len(), 1);
    }

    #[test]
    fn test_render() {
        let mut head = HeadRegistry::new();
        head.inline_script("fix()", &Attrs::new(), "vite-safari-nomodule-fix")
            .unwrap();
        head.inline_script("fix()", &Attrs::new(), "vite-safari-nomodule-fix")
            .unwrap();
        head.css_file("/dist/a.css", &Attrs::new()).unwrap();
        assert_eq!(
            head.render(),
            "<script>fix()</script>\n<link href=\"/dist/a.css\" rel=\"stylesheet\">"
        );
    }
}
