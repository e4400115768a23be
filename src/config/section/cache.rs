//! `[cache]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [cache]
//! dev_mode = true     # Expire fetched content quickly
//! dev_ttl = 1         # Seconds, only used in dev mode
//! key_suffix = ""     # Keeps several services' cache entries apart
//! ```
//!
//! In production entries live until explicitly invalidated or, for local
//! files, until the file's modification time changes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;

/// Content cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Development mode: fetched content expires after `dev_ttl` seconds.
    pub dev_mode: bool,

    /// Expiry in seconds for development mode.
    pub dev_ttl: u64,

    /// Appended to every cache key and invalidation tag.
    pub key_suffix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dev_mode: false,
            dev_ttl: 1,
            key_suffix: String::new(),
        }
    }
}

impl CacheConfig {
    /// Expiry for new entries, `None` meaning "until invalidated".
    pub fn ttl(&self) -> Option<Duration> {
        self.dev_mode.then(|| Duration::from_secs(self.dev_ttl))
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.dev_mode && self.dev_ttl == 0 {
            diag.error_with_hint(
                "cache.dev_ttl",
                "must be greater than zero",
                "disable dev_mode to cache until invalidation",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_cache_ttl() {
        let config = test_parse_config("");
        assert_eq!(config.cache.ttl(), None);

        let config = test_parse_config("[cache]\ndev_mode = true\ndev_ttl = 3");
        assert_eq!(config.cache.ttl(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let config = test_parse_config("[cache]\ndev_mode = true\ndev_ttl = 0");
        let mut diag = ConfigDiagnostics::new();
        config.cache.validate(&mut diag);
        assert!(!diag.is_empty());
    }
}
