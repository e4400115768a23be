//! Configuration utility functions.

use std::path::{Path, PathBuf};

use crate::utils::url::is_absolute_url;

/// Find config file by searching upward from current directory
///
/// Starts from cwd and walks up parent directories until finding `config_name`
/// Returns the absolute path to the config file if found
///
/// # Example
/// ```text
/// /home/user/site/templates/blog/   ← cwd
/// /home/user/site/viteline.toml     ← found!
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_file_from(&cwd, config_name)
}

/// Upward config search starting at `start`.
pub fn find_config_file_from(start: &Path, config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.exists() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None, // Reached filesystem root
        }
    }
}

/// Anchor a configured path string at the project root.
///
/// URLs, absolute paths, aliases (`@webroot/...`), environment references
/// (`$DIST/...`) and home-relative paths (`~/...`) are left untouched: they
/// are resolved later by the `EnvResolver`.
pub fn anchor_at_root(value: &str, root: &Path) -> String {
    if value.is_empty()
        || root.as_os_str().is_empty()
        || is_absolute_url(value)
        || Path::new(value).is_absolute()
        || value.starts_with(['@', '$', '~'])
    {
        return value.to_string();
    }
    let relative = value.strip_prefix("./").unwrap_or(value);
    root.join(relative).to_string_lossy().into_owned()
}

// ============================================================================
// tests
// ============================================================================
