//! Logging utilities with colored output.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` macro, only printed when verbose mode is enabled
//! - `log_once!` macro plus `OnceLog` for diagnostics that must not repeat
//!
//! Everything is written to stderr: stdout belongs to the rendered markup
//! when the CLI is piped into a template.
//!
//! # Example
//!
//! ```ignore
//! log!("manifest"; "manifest not found at {}", path);
//! debug!("fetch"; "cache hit for {}", key);
//! ```

use crossterm::{
    execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use std::{
    io::{Write, stderr},
    sync::atomic::{AtomicBool, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macros
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

/// Log a message the first time `key` is recorded in the given `OnceLog`.
///
/// # Usage
/// ```ignore
/// log_once!(self.reported, format!("{manifest}:{path}"); "resolve"; "no entry for {}", path);
/// ```
#[macro_export]
macro_rules! log_once {
    ($once:expr, $key:expr; $module:expr; $($arg:tt)*) => {{
        if $once.first($key) {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    let mut stderr = stderr().lock();
    execute!(stderr, Clear(ClearType::UntilNewLine)).ok();
    writeln!(stderr, "{prefix} {message}").ok();
    stderr.flush().ok();
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let prefix = format!("[{module}]");
    match module_lower {
        "vite" => prefix.bright_blue().bold().to_string(),
        "fetch" | "manifest" => prefix.bright_green().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Once-only diagnostics
// ============================================================================

/// Set of diagnostic keys that were already reported.
///
/// Owned by whoever emits the diagnostics, so two independent services never
/// silence each other.
#[derive(Debug, Default)]
pub struct OnceLog {
    seen: Mutex<FxHashSet<String>>,
}

impl OnceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key` and return whether this is its first report.
    pub fn first(&self, key: impl Into<String>) -> bool {
        self.seen.lock().insert(key.into())
    }

    /// Forget every key so the next miss is logged again.
    pub fn clear(&self) {
        self.seen.lock().clear();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_once_log_reports_once() {
        let once = OnceLog::new();
        assert!(once.first("dist/manifest.json:src/missing.js"));
        assert!(!once.first("dist/manifest.json:src/missing.js"));
        assert!(once.first("dist/manifest.json:src/other.js"));
    }

    #[test]
    fn test_once_log_clear() {
        let once = OnceLog::new();
        assert!(once.first("key"));
        once.clear();
        assert!(once.first("key"));
    }

    #[test]
    fn test_colorize_prefix_contains_module() {
        assert!(colorize_prefix("vite", "vite").contains("[vite]"));
        assert!(colorize_prefix("Fetch", "fetch").contains("[Fetch]"));
    }
}
