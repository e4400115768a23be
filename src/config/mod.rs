//! Configuration management for `viteline.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── server     # [server]
//! │   ├── manifest   # [manifest]
//! │   ├── shims      # [shims]
//! │   └── cache      # [cache]
//! ├── types/         # Utility types
//! │   └── error      # ConfigError, ConfigDiagnostics
//! └── mod.rs         # ViteConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section      | Purpose                                            |
//! |--------------|----------------------------------------------------|
//! | `[server]`   | Dev server URLs, liveness probe, public base URL   |
//! | `[manifest]` | Manifest path, entry matching, dynamic imports     |
//! | `[shims]`    | modulepreload polyfill, React refresh preamble     |
//! | `[cache]`    | Dev mode expiry, cache key suffix                  |
//! | `[aliases]`  | `@name` → path table for path resolution           |

pub mod section;
pub mod types;
mod util;

pub use section::{CacheConfig, EntryMatch, ManifestConfig, ServerConfig, ShimsConfig};
pub use types::{ConfigDiagnostic, ConfigDiagnostics, ConfigError};
pub use util::find_config_file;

use crate::log;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing viteline.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViteConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Dev server and public URL settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Build manifest settings
    #[serde(default)]
    pub manifest: ManifestConfig,

    /// Shim injection settings
    #[serde(default)]
    pub shims: ShimsConfig,

    /// Content cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Path aliases, keys include the leading `@`
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl ViteConfig {
    /// Load configuration from a file, validate it and anchor relative paths
    /// at the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::from_path(path)?;
        config.config_path = path.to_path_buf();
        let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        config.finalize(&root);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Anchor relative paths at `root`.
    pub fn finalize(&mut self, root: &Path) {
        self.root = root.to_path_buf();
        self.manifest.path = util::anchor_at_root(&self.manifest.path, root);
        if !self.shims.scripts_dir.is_empty() {
            self.shims.scripts_dir = util::anchor_at_root(&self.shims.scripts_dir, root);
        }
        for target in self.aliases.values_mut() {
            *target = util::anchor_at_root(target, root);
        }
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Validate configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.server.validate(&mut diag);
        self.manifest.validate(&mut diag);
        self.cache.validate(&mut diag);
        for name in self.aliases.keys() {
            if !name.starts_with('@') {
                diag.error_with_hint(
                    "aliases",
                    format!("alias '{name}' must start with '@'"),
                    format!("rename it to \"@{name}\""),
                );
            }
        }

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config from TOML.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> ViteConfig {
    let (parsed, ignored) = ViteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
