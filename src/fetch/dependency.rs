//! Cache entry dependencies.
//!
//! A dependency is captured as a snapshot when an entry is stored and
//! re-evaluated on every read; an entry whose snapshot no longer matches is
//! stale.
//!
//! - **Tag**: stale once any tag was invalidated after the entry was stored.
//! - **File**: stale once the file's mtime (or existence) differs.
//! - **Chained**: stale if any member is.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// What a cached value depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dependency {
    /// Invalidation tags.
    Tags(Vec<String>),
    /// A local file whose modification time is tracked.
    File(PathBuf),
    /// All of the contained dependencies.
    Chained(Vec<Dependency>),
}

/// Dependency state at the time an entry was stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
    Tags(Vec<(String, u64)>),
    File(PathBuf, Option<SystemTime>),
    Chained(Vec<Snapshot>),
}

impl Dependency {
    /// Capture the current state, reading tag versions through `version`.
    pub fn snapshot(&self, version: &impl Fn(&str) -> u64) -> Snapshot {
        match self {
            Self::Tags(tags) => {
                Snapshot::Tags(tags.iter().map(|t| (t.clone(), version(t))).collect())
            }
            Self::File(path) => Snapshot::File(path.clone(), get_mtime(path)),
            Self::Chained(deps) => {
                Snapshot::Chained(deps.iter().map(|d| d.snapshot(version)).collect())
            }
        }
    }
}

impl Snapshot {
    /// Whether the dependency changed since this snapshot was taken.
    pub fn is_stale(&self, version: &impl Fn(&str) -> u64) -> bool {
        match self {
            Self::Tags(tags) => tags.iter().any(|(tag, v)| version(tag) != *v),
            Self::File(path, mtime) => get_mtime(path) != *mtime,
            Self::Chained(snapshots) => snapshots.iter().any(|s| s.is_stale(version)),
        }
    }

    /// Whether any tag of this snapshot is in `tags`.
    pub fn has_any_tag(&self, tags: &[&str]) -> bool {
        match self {
            Self::Tags(own) => own.iter().any(|(t, _)| tags.contains(&t.as_str())),
            Self::File(..) => false,
            Self::Chained(snapshots) => snapshots.iter().any(|s| s.has_any_tag(tags)),
        }
    }
}

/// Get the modification time of a file
///
/// Returns `None` if the file doesn't exist or mtime cannot be read
pub fn get_mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_tag_snapshot_goes_stale() {
        let v = Cell::new(0u64);
        let version = |_: &str| v.get();

        let dep = Dependency::Tags(vec!["vite".into(), "vitedist/manifest.json".into()]);
        let snap = dep.snapshot(&version);
        assert!(!snap.is_stale(&version));

        v.set(1);
        assert!(snap.is_stale(&version));
    }

    #[test]
    fn test_file_snapshot_tracks_mtime() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(&path, "{}").unwrap();

        let version = |_: &str| 0;
        let snap = Dependency::File(path.clone()).snapshot(&version);
        assert!(!snap.is_stale(&version));

        let later = SystemTime::now() + Duration::from_secs(10);
        fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(later)
            .unwrap();
        assert!(snap.is_stale(&version));
    }

    #[test]
    fn test_missing_file_appearing_is_stale() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");

        let version = |_: &str| 0;
        let snap = Dependency::File(path.clone()).snapshot(&version);
        assert!(!snap.is_stale(&version));

        fs::write(&path, "{}").unwrap();
        assert!(snap.is_stale(&version));
    }

    #[test]
    fn test_chained_tags() {
        let dep = Dependency::Chained(vec![
            Dependency::File(PathBuf::from("/nonexistent/manifest.json")),
            Dependency::Tags(vec!["vite-admin".into()]),
        ]);
        let snap = dep.snapshot(&|_| 0);
        assert!(snap.has_any_tag(&["vite-admin"]));
        assert!(!snap.has_any_tag(&["vite"]));
    }
}
