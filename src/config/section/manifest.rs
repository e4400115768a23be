//! `[manifest]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [manifest]
//! path = "web/dist/.vite/manifest.json"   # Local path or absolute URL
//! entry_match = "exact"                   # "exact" | "substring"
//! dynamic_imports = false                 # Follow dynamicImports edges too
//! ```

use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;

/// How a requested path is compared with manifest keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryMatch {
    /// Key and path must be equal (a leading `./` or `/` is ignored).
    #[default]
    Exact,
    /// Either string may contain the other.
    ///
    /// Allows directory-style lookups but matches every key sharing the
    /// substring.
    Substring,
}

impl EntryMatch {
    /// Compare a manifest key with a requested path.
    pub fn matches(self, key: &str, path: &str) -> bool {
        match self {
            Self::Exact => trim_relative(key) == trim_relative(path),
            Self::Substring => {
                !path.is_empty() && (key.contains(path) || path.contains(key))
            }
        }
    }
}

fn trim_relative(s: &str) -> &str {
    let s = s.strip_prefix("./").unwrap_or(s);
    s.strip_prefix('/').unwrap_or(s)
}

/// Build manifest settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// File system path or URL of the Vite `manifest.json`.
    pub path: String,

    /// Entry key matching mode.
    pub entry_match: EntryMatch,

    /// Also walk `dynamicImports` when collecting CSS and preloads.
    pub dynamic_imports: bool,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            path: "web/dist/.vite/manifest.json".into(),
            entry_match: EntryMatch::Exact,
            dynamic_imports: false,
        }
    }
}

impl ManifestConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.path.trim().is_empty() {
            diag.error("manifest.path", "must not be empty");
        }
    }
}
