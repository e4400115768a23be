//! Manifest graph resolution.
//!
//! Turns a requested entry path into the ordered list of tags that load it:
//!
//! ```text
//! "src/main.js" ──► matching entries (document order)
//!                     │
//!                     ├─► File    assets/main.abc123.js
//!                     ├─► Import  assets/util.ghi789.js   (modern only)
//!                     └─► Css     assets/main.def456.css  (entry + imports)
//! ```
//!
//! Resolution never fails. An unknown path, an empty manifest or a dangling
//! import key all contribute nothing.

mod tag;
mod walk;

pub use tag::{AttrValue, Attrs, TagDescriptor, TagKind};

use rustc_hash::FxHashSet;

use crate::config::EntryMatch;
use crate::manifest::{Manifest, ManifestEntry, filename_without_hash};
use crate::utils::url::create_url;
use walk::Walk;

/// Inserted before the extension to derive the legacy entry key.
pub const LEGACY_INFIX: &str = "-legacy.";

/// Manifest key fragment of the `@vitejs/plugin-legacy` polyfill chunk.
pub const LEGACY_POLYFILLS: &str = "vite/legacy-polyfills";

/// Event dispatched by every entry script once loaded.
pub const SCRIPT_LOADED_EVENT: &str = "vite-script-loaded";

/// Caller-controlled resolution settings.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Load stylesheets with `media="print"` and swap to `all` on load
    pub async_css: bool,
    /// Extra attributes for entry scripts, applied last
    pub script_attrs: Attrs,
    /// Extra attributes for stylesheets, applied last
    pub css_attrs: Attrs,
    /// Resolve `nomodule` legacy scripts instead of module scripts
    pub legacy: bool,
    pub match_mode: EntryMatch,
    /// Follow `dynamicImports` edges when collecting CSS
    pub include_dynamic_imports: bool,
    /// Base URL prepended to every output path
    pub public_base: String,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            async_css: true,
            script_attrs: Attrs::new(),
            css_attrs: Attrs::new(),
            legacy: false,
            match_mode: EntryMatch::Exact,
            include_dynamic_imports: false,
            public_base: "/".into(),
        }
    }
}

// ============================================================================
// Tag resolution
// ============================================================================

/// Resolve the tags for every entry matching `path`.
pub fn resolve_tags(manifest: &Manifest, path: &str, options: &ResolveOptions) -> Vec<TagDescriptor> {
    extract_tags(manifest, path, options, options.match_mode)
}

/// Resolve the `nomodule` tags of the legacy build of `path`.
pub fn resolve_legacy_tags(
    manifest: &Manifest,
    path: &str,
    options: &ResolveOptions,
) -> Vec<TagDescriptor> {
    let legacy = ResolveOptions {
        legacy: true,
        ..options.clone()
    };
    extract_tags(manifest, &legacy_path(path), &legacy, options.match_mode)
}

/// Resolve the legacy polyfill chunk.
///
/// Its key carries a build-specific prefix and suffix, so it is always
/// matched by substring.
pub fn resolve_legacy_polyfills(manifest: &Manifest, options: &ResolveOptions) -> Vec<TagDescriptor> {
    let legacy = ResolveOptions {
        legacy: true,
        ..options.clone()
    };
    extract_tags(manifest, LEGACY_POLYFILLS, &legacy, EntryMatch::Substring)
}

fn extract_tags(
    manifest: &Manifest,
    path: &str,
    options: &ResolveOptions,
    match_mode: EntryMatch,
) -> Vec<TagDescriptor> {
    let mut tags = Vec::new();

    for (key, entry) in manifest.iter() {
        let Some(file) = entry.entry_file() else {
            continue;
        };
        // a substring request must not pull the other build's entries in
        if is_legacy_key(key) != options.legacy || !match_mode.matches(key, path) {
            continue;
        }

        let file_tag = file_tag(key, file, entry, options);
        let crossorigin = file_tag.attrs.get("crossorigin").cloned();
        tags.push(file_tag);

        let mut walk = Walk::new(manifest, options.include_dynamic_imports);
        walk.visit_root(key);

        if !options.legacy {
            for import_key in &walk.imports {
                if let Some(tag) = import_tag(manifest, import_key, crossorigin.clone(), options) {
                    tags.push(tag);
                }
            }
        }

        for css in &walk.css {
            tags.push(css_tag(css, options));
        }
    }

    dedupe(tags)
}

fn file_tag(key: &str, file: &str, entry: &ManifestEntry, options: &ResolveOptions) -> TagDescriptor {
    let mut attrs = if options.legacy {
        Attrs::new().with("nomodule", true)
    } else {
        Attrs::new().with("type", "module").with("crossorigin", true)
    };
    attrs.set("onload", onload_script(key));
    if let Some(integrity) = &entry.integrity {
        attrs.set("integrity", integrity.as_str());
    }
    attrs.merge(&options.script_attrs);

    TagDescriptor {
        kind: TagKind::File,
        key: key.to_string(),
        url: create_url(&options.public_base, file),
        attrs,
        integrity: entry.integrity.clone(),
    }
}

fn import_tag(
    manifest: &Manifest,
    key: &str,
    crossorigin: Option<AttrValue>,
    options: &ResolveOptions,
) -> Option<TagDescriptor> {
    let node = manifest.get(key)?;
    let file = node.file.as_deref()?;

    let mut attrs = Attrs::new().with("crossorigin", crossorigin.unwrap_or(AttrValue::Flag(true)));
    if let Some(integrity) = &node.integrity {
        attrs.set("integrity", integrity.as_str());
    }

    Some(TagDescriptor {
        kind: TagKind::Import,
        key: file.to_string(),
        url: create_url(&options.public_base, file),
        attrs,
        integrity: node.integrity.clone(),
    })
}

fn css_tag(file: &str, options: &ResolveOptions) -> TagDescriptor {
    let mut attrs = Attrs::new().with("rel", "stylesheet");
    if options.async_css {
        attrs.set("media", "print");
        attrs.set("onload", "this.media='all'");
    }
    attrs.merge(&options.css_attrs);

    TagDescriptor {
        kind: TagKind::Css,
        key: file.to_string(),
        url: create_url(&options.public_base, file),
        attrs,
        integrity: None,
    }
}

/// `onload` handler announcing that the entry `key` finished loading.
pub fn onload_script(key: &str) -> String {
    format!(
        "e=new CustomEvent('{SCRIPT_LOADED_EVENT}', {{detail:{{path: '{key}'}}}});document.dispatchEvent(e);"
    )
}

/// Keep the first tag of every key.
fn dedupe(tags: Vec<TagDescriptor>) -> Vec<TagDescriptor> {
    let mut seen = FxHashSet::default();
    tags.into_iter()
        .filter(|tag| seen.insert(tag.key.clone()))
        .collect()
}

/// Derive the legacy entry key: `src/main.js` -> `src/main-legacy.js`.
///
/// A name without extension gets a `-legacy` suffix.
pub fn legacy_path(path: &str) -> String {
    let (dir, name) = match path.rfind('/') {
        Some(i) => path.split_at(i + 1),
        None => ("", path),
    };
    match name.rfind('.') {
        Some(dot) if dot > 0 => {
            format!("{dir}{}{LEGACY_INFIX}{}", &name[..dot], &name[dot + 1..])
        }
        _ => format!("{dir}{name}-legacy"),
    }
}

/// Whether `key` names an entry of the legacy build.
pub fn is_legacy_key(key: &str) -> bool {
    key.contains(LEGACY_INFIX) || key.ends_with("-legacy")
}

// ============================================================================
// URL lookups
// ============================================================================

/// Output file of the entry matching `path`.
///
/// Falls back to the first CSS or asset file whose hash-stripped name equals
/// the file name of `path`.
pub fn resolve_entry_url(manifest: &Manifest, path: &str, match_mode: EntryMatch) -> Option<String> {
    let by_key = manifest
        .iter()
        .filter(|(key, _)| match_mode.matches(key, path))
        .find_map(|(_, entry)| entry.file.clone());
    if by_key.is_some() {
        return by_key;
    }

    let wanted = file_name(path);
    manifest
        .iter()
        .flat_map(|(_, entry)| entry.css.iter().chain(&entry.assets))
        .find(|file| filename_without_hash(file) == wanted)
        .cloned()
}

/// Output file of the static asset `path`, e.g. `src/img/logo.png`.
///
/// Vite 3+ lists assets as top-level entries, so the entry lookup is the
/// fallback.
pub fn resolve_asset_url(manifest: &Manifest, path: &str, match_mode: EntryMatch) -> Option<String> {
    manifest
        .asset_table()
        .get(file_name(path))
        .cloned()
        .or_else(|| resolve_entry_url(manifest, path, match_mode))
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
