//! Vite build manifest model.
//!
//! A manifest maps source module keys to their build outputs:
//!
//! ```json
//! {
//!   "src/main.js": {
//!     "file": "assets/main.abc123.js",
//!     "isEntry": true,
//!     "css": ["assets/main.def456.css"],
//!     "imports": ["src/util.js"]
//!   },
//!   "src/util.js": { "file": "assets/util.ghi789.js" }
//! }
//! ```
//!
//! Entries keep document order. Fields other than the ones below are ignored,
//! and so are entries that are not JSON objects.

mod hash;
mod store;

pub use hash::filename_without_hash;
pub use store::ManifestStore;

use std::sync::OnceLock;

use rustc_hash::FxHashMap;
use serde::Deserialize;

/// One node of the build graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ManifestEntry {
    /// Hashed output path
    pub file: Option<String>,
    /// Whether the node may be requested directly
    #[serde(rename = "isEntry")]
    pub is_entry: bool,
    pub css: Vec<String>,
    pub assets: Vec<String>,
    /// Keys of statically imported nodes
    pub imports: Vec<String>,
    /// Keys of dynamically imported nodes
    #[serde(rename = "dynamicImports")]
    pub dynamic_imports: Vec<String>,
    /// Subresource integrity hash
    pub integrity: Option<String>,
}

impl ManifestEntry {
    /// Output file of a requestable entry.
    pub fn entry_file(&self) -> Option<&str> {
        if self.is_entry {
            self.file.as_deref()
        } else {
            None
        }
    }
}

/// Parsed manifest, immutable once built.
#[derive(Debug, Default)]
pub struct Manifest {
    entries: Vec<(String, ManifestEntry)>,
    index: FxHashMap<String, usize>,
    /// hash-stripped asset file name -> output path, built on first use
    assets: OnceLock<FxHashMap<String, String>>,
}

impl Manifest {
    /// Parse a manifest document.
    ///
    /// Fails only when the document is not a JSON object.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        let root: serde_json::Map<String, serde_json::Value> = serde_json::from_str(content)?;
        let entries = root.into_iter().filter_map(|(key, value)| {
            serde_json::from_value::<ManifestEntry>(value)
                .ok()
                .map(|entry| (key, entry))
        });
        Ok(Self::from_entries(entries))
    }

    /// Build a manifest from `(key, entry)` pairs; a repeated key keeps its
    /// first position and last value.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, ManifestEntry)>) -> Self {
        let mut manifest = Self::default();
        for (key, entry) in entries {
            match manifest.index.get(&key) {
                Some(&i) => manifest.entries[i].1 = entry,
                None => {
                    manifest.index.insert(key.clone(), manifest.entries.len());
                    manifest.entries.push((key, entry));
                }
            }
        }
        manifest
    }

    pub fn get(&self, key: &str) -> Option<&ManifestEntry> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ManifestEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookup table from hash-stripped asset name to output path.
    ///
    /// When two assets strip to the same name, the later one wins.
    pub fn asset_table(&self) -> &FxHashMap<String, String> {
        self.assets.get_or_init(|| {
            let mut table = FxHashMap::default();
            for (_, entry) in &self.entries {
                for asset in &entry.assets {
                    table.insert(filename_without_hash(asset), asset.clone());
                }
            }
            table
        })
    }
}
