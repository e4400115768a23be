//! URL helpers shared by the fetcher and the facade.

/// Join a base URL (or path) with a relative path.
///
/// Exactly one `/` separates the two parts, whatever slashes either side
/// carries.
///
/// # Examples
/// ```ignore
/// create_url("http://localhost:5173/", "/src/main.js") -> "http://localhost:5173/src/main.js"
/// create_url("/dist", "assets/app.js")                  -> "/dist/assets/app.js"
/// create_url("", "assets/app.js")                       -> "/assets/app.js"
/// ```
pub fn create_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_matches('/'))
}

/// Check whether `s` is an absolute `http`/`https` URL with a host.
///
/// Uses the `url` crate so that `C:\dist\manifest.json` and
/// `./manifest.json` are correctly treated as local paths.
pub fn is_absolute_url(s: &str) -> bool {
    match url::Url::parse(s) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https")
                && parsed.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}
