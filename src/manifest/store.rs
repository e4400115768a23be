//! Manifest loading and memoization.

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;

use super::Manifest;
use crate::fetch::{ContentFetcher, Dependency, Snapshot};
use crate::log_once;
use crate::logger::OnceLog;
use crate::utils::url::is_absolute_url;

/// A memoized load.
struct Memo {
    manifest: Arc<Manifest>,
    /// File state of a failed local load; a change allows another attempt.
    retry: Option<Snapshot>,
}

/// Loads manifests through the content fetcher and memoizes them per path.
///
/// With `memoize` off (cache dev mode) every load goes back to the fetcher,
/// whose short TTL then decides how fresh the manifest is.
pub struct ManifestStore {
    fetcher: Arc<ContentFetcher>,
    memo: DashMap<String, Memo>,
    memoize: bool,
    reported: OnceLog,
}

impl ManifestStore {
    pub fn new(fetcher: Arc<ContentFetcher>, memoize: bool) -> Self {
        Self {
            fetcher,
            memo: DashMap::new(),
            memoize,
            reported: OnceLog::new(),
        }
    }

    /// Load the manifest at `path`, or an empty one if it is missing or
    /// invalid.
    ///
    /// Failures are memoized too. A remote manifest is only fetched again
    /// after `reload`; a local one as soon as the file changes.
    pub fn load(&self, path: &str) -> Arc<Manifest> {
        if let Some(manifest) = self.memoized(path) {
            return manifest;
        }

        let parsed = self.fetcher.fetch(path, |content| {
            match Manifest::from_json(&content) {
                Ok(manifest) => Some(manifest),
                Err(e) => {
                    log_once!(self.reported, format!("invalid:{path}"); "manifest";
                        "{} is not a valid manifest: {}", path, e);
                    None
                }
            }
        });

        let (manifest, retry) = match parsed {
            Some(manifest) => (manifest, None),
            None => {
                log_once!(self.reported, format!("missing:{path}"); "manifest";
                    "no manifest loaded from {}", path);
                (Arc::new(Manifest::default()), self.retry_snapshot(path))
            }
        };
        if self.memoize {
            let memo = Memo {
                manifest: Arc::clone(&manifest),
                retry,
            };
            self.memo.insert(path.to_string(), memo);
        }
        manifest
    }

    /// Memoized manifest for `path`, loading it on first use.
    pub fn entries(&self, path: &str) -> Arc<Manifest> {
        self.load(path)
    }

    /// Forget every memoized manifest and reported diagnostic.
    pub fn reload(&self) {
        self.memo.clear();
        self.reported.clear();
    }

    fn memoized(&self, path: &str) -> Option<Arc<Manifest>> {
        let memo = self.memo.get(path)?;
        let changed = memo
            .retry
            .as_ref()
            .is_some_and(|snapshot| snapshot.is_stale(&|_: &str| 0));
        (!changed).then(|| Arc::clone(&memo.manifest))
    }

    fn retry_snapshot(&self, path: &str) -> Option<Snapshot> {
        let target = self.fetcher.resolve_path(path);
        if is_absolute_url(&target) {
            return None;
        }
        let file = Dependency::File(PathBuf::from(target.as_ref()));
        Some(file.snapshot(&|_: &str| 0))
    }
}
