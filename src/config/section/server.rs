//! `[server]` section configuration.
//!
//! Where assets are served from, in both modes.
//!
//! # Example
//!
//! ```toml
//! [server]
//! use_dev_server = true                           # Prefer the Vite dev server
//! check_dev_server = true                         # Probe it before using it
//! dev_server_public = "http://localhost:5173/"    # URL the browser loads modules from
//! dev_server_internal = "http://vite:5173/"       # URL this process probes
//! server_public = "/dist/"                        # Base URL of the production build
//! error_entry = "src/js/error.js"                 # Injected on 4xx/5xx pages in dev
//! ```
//!
//! `dev_server_internal` only differs from `dev_server_public` in containerized
//! or VM setups where the backend reaches Vite under another host name.

use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;
use crate::utils::url::is_absolute_url;

/// Dev server and public URL settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Serve modules from the Vite dev server when it is reachable.
    pub use_dev_server: bool,

    /// Probe the dev server before using it.
    /// - `true` (default): fall back to the manifest when the probe fails
    /// - `false`: trust `use_dev_server` blindly
    pub check_dev_server: bool,

    /// Public dev server URL (what appears in `<script src="">`).
    pub dev_server_public: String,

    /// Dev server URL as reachable from this process.
    pub dev_server_internal: String,

    /// Environment variable that must exist for the dev server to be used.
    /// Empty means no requirement.
    pub dev_server_env_var: String,

    /// Path probed on `dev_server_internal` to check liveness.
    pub ping_path: String,

    /// Base URL for manifest-resolved files.
    pub server_public: String,

    /// Entry injected into error pages while the dev server runs.
    pub error_entry: String,

    /// Verify TLS certificates for remote fetches.
    /// Off by default so self-signed dev server certificates keep working.
    pub verify_tls: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            use_dev_server: false,
            check_dev_server: true,
            dev_server_public: "http://localhost:5173/".into(),
            dev_server_internal: "http://localhost:5173/".into(),
            dev_server_env_var: String::new(),
            ping_path: "__vite_ping".into(),
            server_public: "/dist/".into(),
            error_entry: String::new(),
            verify_tls: false,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.server_public.trim().is_empty() {
            diag.error_with_hint(
                "server.server_public",
                "must not be empty",
                "e.g. \"/dist/\"",
            );
        }
        if self.use_dev_server && self.dev_server_public.trim().is_empty() {
            diag.error_with_hint(
                "server.dev_server_public",
                "must not be empty when use_dev_server is enabled",
                "e.g. \"http://localhost:5173/\"",
            );
        }
        if self.use_dev_server
            && self.check_dev_server
            && !is_absolute_url(&self.dev_server_internal)
        {
            diag.error_with_hint(
                "server.dev_server_internal",
                format!(
                    "'{}' is not an absolute http(s) URL",
                    self.dev_server_internal
                ),
                "set check_dev_server = false to skip probing",
            );
        }
    }

    /// Whether the environment allows using the dev server at all.
    pub fn dev_server_enabled(&self) -> bool {
        if !self.use_dev_server {
            return false;
        }
        self.dev_server_env_var.is_empty() || std::env::var_os(&self.dev_server_env_var).is_some()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{ConfigDiagnostics, test_parse_config};

    #[test]
    fn test_server_config_defaults() {
        let config = test_parse_config("");

        assert!(!config.server.use_dev_server);
        assert!(config.server.check_dev_server);
        assert_eq!(config.server.ping_path, "__vite_ping");
        assert_eq!(config.server.server_public, "/dist/");
        assert!(!config.server.verify_tls);
    }

    #[test]
    fn test_server_config_partial_override() {
        let config = test_parse_config(
            "[server]\nuse_dev_server = true\ndev_server_internal = \"http://vite:5173/\"",
        );

        assert!(config.server.use_dev_server);
        assert_eq!(config.server.dev_server_internal, "http://vite:5173/");
        // public URL keeps its default
        assert_eq!(config.server.dev_server_public, "http://localhost:5173/");
    }

    #[test]
    fn test_dev_server_env_var_gate() {
        let mut config = test_parse_config("[server]\nuse_dev_server = true");
        assert!(config.server.dev_server_enabled());

        config.server.dev_server_env_var = "VITELINE_TEST_SURELY_UNSET_VAR".into();
        assert!(!config.server.dev_server_enabled());

        config.server.use_dev_server = false;
        config.server.dev_server_env_var.clear();
        assert!(!config.server.dev_server_enabled());
    }

    #[test]
    fn test_validate_internal_url() {
        let config =
            test_parse_config("[server]\nuse_dev_server = true\ndev_server_internal = \"vite\"");
        let mut diag = ConfigDiagnostics::new();
        config.server.validate(&mut diag);
        assert_eq!(diag.len(), 1);

        let config = test_parse_config(
            "[server]\nuse_dev_server = true\ncheck_dev_server = false\ndev_server_internal = \"vite\"",
        );
        let mut diag = ConfigDiagnostics::new();
        config.server.validate(&mut diag);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_validate_server_public() {
        let config = test_parse_config("[server]\nserver_public = \" \"");
        let mut diag = ConfigDiagnostics::new();
        config.server.validate(&mut diag);
        assert_eq!(diag.len(), 1);
        assert!(format!("{diag}").contains("server.server_public"));
    }
}
