//! Content fetching with conditional caching.
//!
//! # Module Structure
//!
//! - `http` - `HttpClient` trait and the ureq-backed client
//! - `cache` - `CacheBackend` trait and the in-memory cache
//! - `dependency` - tag / file / chained dependencies with snapshots
//! - `error` - `FetchError`
//!
//! # Flow
//!
//! ```text
//! path_or_url ──► EnvResolver ──► cache hit? ──► Arc<T>
//!                                    │ miss
//!                                    ▼
//!                     URL: HttpClient::get (200 only)
//!                     path: fs::read_to_string
//!                                    │ non-empty
//!                                    ▼
//!                       transform ──► cache set ──► Arc<T>
//! ```
//!
//! Every failure ends in `None`; nothing is returned to the caller as an error.

mod cache;
mod dependency;
mod error;
mod http;

pub use cache::{CacheBackend, Cached, MemoryCache};
pub use dependency::{Dependency, Snapshot, get_mtime};
pub use error::FetchError;
pub use http::{CONNECT_TIMEOUT, HttpClient, HttpResponse, TOTAL_TIMEOUT, UreqClient};

use std::borrow::Cow;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ViteConfig;
use crate::env::{EnvResolver, ShellResolver};
use crate::logger::OnceLog;
use crate::utils::url::{create_url, is_absolute_url};
use crate::{debug, log_once};

/// Namespace prefix of every cache key and tag.
pub const CACHE_NAMESPACE: &str = "vite";

/// Loads local files and remote URLs through a shared cache.
pub struct ContentFetcher {
    cache: Arc<dyn CacheBackend>,
    http: Arc<dyn HttpClient>,
    env: Arc<dyn EnvResolver>,
    key_suffix: String,
    ttl: Option<Duration>,
    scripts_dir: String,
    /// Failed targets, reported once until `invalidate`
    reported: OnceLog,
}

impl ContentFetcher {
    /// Fetcher with the default collaborators for `config`.
    pub fn new(config: &ViteConfig) -> Self {
        Self {
            cache: Arc::new(MemoryCache::new()),
            http: Arc::new(UreqClient::new(config.server.verify_tls)),
            env: Arc::new(ShellResolver::new(config.aliases.clone())),
            key_suffix: config.cache.key_suffix.clone(),
            ttl: config.cache.ttl(),
            scripts_dir: config.shims.scripts_dir.clone(),
            reported: OnceLog::new(),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheBackend>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_http(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = http;
        self
    }

    pub fn with_env(mut self, env: Arc<dyn EnvResolver>) -> Self {
        self.env = env;
        self
    }

    /// The HTTP client, shared with the dev server probe.
    pub fn http(&self) -> &dyn HttpClient {
        self.http.as_ref()
    }

    /// Resolve aliases and environment references in `input`.
    pub fn resolve_path<'a>(&self, input: &'a str) -> Cow<'a, str> {
        self.env.resolve(input)
    }

    /// Tag shared by every entry this fetcher stores.
    fn namespace_tag(&self) -> String {
        format!("{CACHE_NAMESPACE}{}", self.key_suffix)
    }

    /// Fetch `path_or_url` and cache the result of `transform`.
    ///
    /// `transform` only runs on non-empty content. A `None` from either the
    /// load or the transform is returned as-is and not cached.
    pub fn fetch<T, F>(&self, path_or_url: &str, transform: F) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce(String) -> Option<T>,
    {
        let target = self.resolve_path(path_or_url);
        let key = format!("{}{}", self.namespace_tag(), target);

        if let Some(hit) = self.cache.get(&key)
            && let Ok(value) = hit.downcast::<T>()
        {
            debug!("fetch"; "cache hit for {}", target);
            return Some(value);
        }

        let content = self.load(&target)?;
        if content.is_empty() {
            debug!("fetch"; "{} is empty", target);
            return None;
        }

        let value = Arc::new(transform(content)?);
        self.cache
            .set(&key, value.clone(), self.ttl, self.dependency(&target));
        Some(value)
    }

    /// Fetch `path_or_url` as text.
    pub fn fetch_text(&self, path_or_url: &str) -> Option<Arc<String>> {
        self.fetch(path_or_url, Some)
    }

    /// Fetch a shim script by file name from `shims.scripts_dir`.
    ///
    /// Returns `""` when no scripts dir is configured or the script cannot be
    /// loaded.
    pub fn fetch_script(&self, name: &str) -> String {
        if self.scripts_dir.is_empty() {
            return String::new();
        }
        let url = create_url(&self.scripts_dir, name);
        self.fetch_text(&url)
            .map(|s| s.as_ref().clone())
            .unwrap_or_default()
    }

    /// Drop every entry stored by this fetcher.
    pub fn invalidate(&self) {
        self.cache.invalidate_tags(&[&self.namespace_tag()]);
        self.reported.clear();
    }

    /// Tags for explicit invalidation, plus the file itself for local paths.
    fn dependency(&self, target: &str) -> Dependency {
        let namespace = self.namespace_tag();
        let tags = Dependency::Tags(vec![format!("{namespace}{target}"), namespace]);
        if is_absolute_url(target) {
            tags
        } else {
            Dependency::Chained(vec![tags, Dependency::File(PathBuf::from(target))])
        }
    }

    fn load(&self, target: &str) -> Option<String> {
        let result = if is_absolute_url(target) {
            self.get_remote(target)
        } else {
            fs::read_to_string(target).map_err(|err| FetchError::Io(target.into(), err))
        };

        match result {
            Ok(content) => Some(content),
            Err(err) if err.is_not_found() => {
                debug!("fetch"; "{}", err);
                None
            }
            Err(err) => {
                log_once!(self.reported, target; "fetch"; "{:#}", anyhow::Error::new(err));
                None
            }
        }
    }

    fn get_remote(&self, url: &str) -> Result<String, FetchError> {
        let response = self.http.get(url)?;
        if response.status != 200 {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status,
            });
        }
        Ok(String::from_utf8_lossy(&response.body).into_owned())
    }
}
