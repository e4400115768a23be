//! Content-hash stripping for output file names.

/// Strip the build hash from the last segment of `path`.
///
/// The file name is split on `.`; with more than two parts, the
/// second-to-last one is the hash and is dropped.
///
/// ```ignore
/// filename_without_hash("assets/logo.a1b2c3.png") -> "logo.png"
/// filename_without_hash("logo.png")               -> "logo.png"
/// ```
///
/// Only stems without dots are stable under repeated stripping:
/// `jquery.min.abc.js` strips to `jquery.min.js`, then to `jquery.js`.
pub fn filename_without_hash(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    let mut parts: Vec<&str> = name.split('.').collect();
    if parts.len() > 2 {
        parts.remove(parts.len() - 2);
    }
    parts.join(".")
}
