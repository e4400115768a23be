//! Depth-first walk of import edges.

use rustc_hash::FxHashSet;

use crate::manifest::{Manifest, ManifestEntry};

/// Collects what an entry pulls in.
///
/// Static imports are walked first and alone decide which chunks are
/// preloaded. With dynamic imports enabled a second walk follows both edge
/// kinds and only adds CSS, so a chunk imported both ways keeps its preload.
/// Each walk visits a key at most once, so import cycles terminate.
pub(super) struct Walk<'m> {
    manifest: &'m Manifest,
    dynamic: bool,
    visited: FxHashSet<&'m str>,
    seen_css: FxHashSet<&'m str>,
    /// Keys reached through static imports, in visit order
    pub imports: Vec<&'m str>,
    /// CSS of every visited node, deduplicated, in visit order
    pub css: Vec<&'m str>,
}

impl<'m> Walk<'m> {
    pub fn new(manifest: &'m Manifest, dynamic: bool) -> Self {
        Self {
            manifest,
            dynamic,
            visited: FxHashSet::default(),
            seen_css: FxHashSet::default(),
            imports: Vec::new(),
            css: Vec::new(),
        }
    }

    pub fn visit_root(&mut self, key: &'m str) {
        self.visit_static(key, true);
        if self.dynamic {
            self.visited.clear();
            self.visit_any(key);
        }
    }

    fn visit_static(&mut self, key: &'m str, root: bool) {
        let Some(node) = self.enter(key) else {
            return;
        };
        if !root && node.file.is_some() {
            self.imports.push(key);
        }
        self.add_css(node);
        for import in &node.imports {
            self.visit_static(import, false);
        }
    }

    fn visit_any(&mut self, key: &'m str) {
        let Some(node) = self.enter(key) else {
            return;
        };
        self.add_css(node);
        for import in node.imports.iter().chain(&node.dynamic_imports) {
            self.visit_any(import);
        }
    }

    /// Mark `key` visited; `None` if it was already, or is dangling.
    fn enter(&mut self, key: &'m str) -> Option<&'m ManifestEntry> {
        if !self.visited.insert(key) {
            return None;
        }
        let manifest = self.manifest;
        manifest.get(key)
    }

    fn add_css(&mut self, node: &'m ManifestEntry) {
        for css in &node.css {
            if self.seen_css.insert(css) {
                self.css.push(css);
            }
        }
    }
}
