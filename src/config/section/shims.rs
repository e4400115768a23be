//! `[shims]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [shims]
//! module_preload = true       # Inline the modulepreload polyfill once per page
//! react_refresh = false       # Inline the React refresh preamble in dev mode
//! scripts_dir = ""            # Load shims from here instead of the embedded copies
//! ```

use serde::{Deserialize, Serialize};

/// Compatibility script injection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShimsConfig {
    /// Inline the `<link rel="modulepreload">` polyfill in manifest mode.
    pub module_preload: bool,

    /// Inline the React fast-refresh preamble in dev server mode.
    pub react_refresh: bool,

    /// Base path or URL holding replacement shim scripts.
    /// Empty means the embedded scripts are used.
    pub scripts_dir: String,
}

impl Default for ShimsConfig {
    fn default() -> Self {
        Self {
            module_preload: true,
            react_refresh: false,
            scripts_dir: String::new(),
        }
    }
}
