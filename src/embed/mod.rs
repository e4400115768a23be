//! Embedded compatibility scripts.
//!
//! # Module Structure
//!
//! - `template` - shim sources with placeholders filled in at render time
//! - `shims/` - the script sources, compiled into the binary
//!
//! | Shim                       | Injected when                              |
//! |----------------------------|--------------------------------------------|
//! | `safari-nomodule-fix`      | legacy (`nomodule`) tags were resolved     |
//! | `modulepreload-polyfill`   | manifest mode, `shims.module_preload`      |
//! | `react-refresh-shim`       | dev server mode, `shims.react_refresh`     |
//!
//! Each shim can be overridden at runtime by a file of the same name inside
//! `shims.scripts_dir`.
//!
//! # Usage
//!
//! ```ignore
//! use embed::{REACT_REFRESH, RefreshVars, Shim};
//!
//! let js = REACT_REFRESH.render(&RefreshVars::new("http://localhost:5173/"));
//! let fix = Shim::SafariNomoduleFix.embedded();
//! ```

mod template;

pub use template::{Template, TemplateVars};

/// Compatibility scripts known to the facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shim {
    /// Stops Safari 10.1 from running both module and nomodule scripts.
    SafariNomoduleFix,
    /// Polyfills `<link rel="modulepreload">` in browsers lacking it.
    ModulePreloadPolyfill,
    /// Installs the React fast-refresh runtime from the dev server.
    ReactRefresh,
}

impl Shim {
    /// File name looked up inside `shims.scripts_dir`.
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::SafariNomoduleFix => "safari-nomodule-fix.min.js",
            Self::ModulePreloadPolyfill => "modulepreload-polyfill.min.js",
            Self::ReactRefresh => "react-refresh-shim.min.js",
        }
    }

    /// The compiled-in script source.
    pub const fn embedded(self) -> &'static str {
        match self {
            Self::SafariNomoduleFix => SAFARI_NOMODULE_FIX,
            Self::ModulePreloadPolyfill => MODULEPRELOAD_POLYFILL,
            Self::ReactRefresh => REACT_REFRESH_SOURCE,
        }
    }

    /// Dedupe key used when registering the inline script with a sink.
    pub const fn key(self) -> &'static str {
        match self {
            Self::SafariNomoduleFix => "vite-safari-nomodule-fix",
            Self::ModulePreloadPolyfill => "vite-modulepreload-polyfill",
            Self::ReactRefresh => "vite-react-refresh-shim",
        }
    }
}

const SAFARI_NOMODULE_FIX: &str = include_str!("shims/safari-nomodule-fix.js");

const MODULEPRELOAD_POLYFILL: &str = include_str!("shims/modulepreload-polyfill.js");

/// Origin hard-coded in the refresh preamble, replaced at render time.
pub const REFRESH_PLACEHOLDER_ORIGIN: &str = "http://localhost:3000";

/// Variables for the React refresh preamble.
pub struct RefreshVars {
    pub dev_server_public: String,
}

impl RefreshVars {
    pub fn new(dev_server_public: &str) -> Self {
        Self {
            dev_server_public: dev_server_public.trim_end_matches('/').to_string(),
        }
    }
}

impl TemplateVars for RefreshVars {
    fn apply(&self, content: &str) -> String {
        content.replace(REFRESH_PLACEHOLDER_ORIGIN, &self.dev_server_public)
    }
}

const REACT_REFRESH_SOURCE: &str = include_str!("shims/react-refresh-shim.js");

/// React refresh preamble with dev server origin injection.
pub const REACT_REFRESH: Template<RefreshVars> = Template::new(REACT_REFRESH_SOURCE);
