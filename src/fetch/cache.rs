//! Content cache with tag and file dependencies.
//!
//! Values are type-erased so one cache holds both raw text and parsed
//! manifests; callers downcast on read and treat a mismatch as a miss.

use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use super::dependency::{Dependency, Snapshot};

/// A cached, type-erased value.
pub type Cached = Arc<dyn Any + Send + Sync>;

/// Get-or-set cache with dependency tracking and tag invalidation.
pub trait CacheBackend: Send + Sync {
    /// Return the value for `key` unless it is missing, expired or stale.
    fn get(&self, key: &str) -> Option<Cached>;

    /// Store `value`; `ttl = None` keeps it until invalidated.
    fn set(&self, key: &str, value: Cached, ttl: Option<Duration>, dependency: Dependency);

    /// Mark every entry carrying one of `tags` as stale.
    fn invalidate_tags(&self, tags: &[&str]);
}

struct Entry {
    value: Cached,
    snapshot: Snapshot,
    expires: Option<Instant>,
}

/// In-process `CacheBackend`.
///
/// Entries are stored under their full key. Tags carry a version
/// counter; invalidating a tag bumps it, which makes every snapshot taken
/// under the old version stale.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, Entry>,
    tags: DashMap<String, u64>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn tag_version(&self, tag: &str) -> u64 {
        self.tags.get(tag).map(|v| *v).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl CacheBackend for MemoryCache {
    fn get(&self, key: &str) -> Option<Cached> {
        let version = |tag: &str| self.tag_version(tag);

        let live = {
            let entry = self.entries.get(key)?;
            let expired = entry.expires.is_some_and(|at| Instant::now() >= at);
            (!expired && !entry.snapshot.is_stale(&version)).then(|| entry.value.clone())
        };

        if live.is_none() {
            self.entries.remove(key);
        }
        live
    }

    fn set(&self, key: &str, value: Cached, ttl: Option<Duration>, dependency: Dependency) {
        let version = |tag: &str| self.tag_version(tag);
        let entry = Entry {
            value,
            snapshot: dependency.snapshot(&version),
            expires: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.entries.insert(key.to_string(), entry);
    }

    fn invalidate_tags(&self, tags: &[&str]) {
        for tag in tags {
            *self.tags.entry((*tag).to_string()).or_insert(0) += 1;
        }
        self.entries.retain(|_, e| !e.snapshot.has_any_tag(tags));
    }
}
