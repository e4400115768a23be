//! Asset resolution facade.
//!
//! [`Vite`] is the long-lived service: configuration, content cache and
//! memoized manifests. It is `Send + Sync` and meant to be shared.
//!
//! [`Page`] is created per rendered response and owns everything that must
//! happen at most once per page: the dev server probe result and the shim
//! injection flags.
//!
//! ```ignore
//! let vite = Vite::new(ViteConfig::load(path)?);
//! let mut page = vite.page();
//! let html = page.script("src/main.js", &ScriptOptions::default());
//! ```
//!
//! # Modes
//!
//! | Mode       | Active when                                        | Output                          |
//! |------------|----------------------------------------------------|---------------------------------|
//! | dev server | `use_dev_server`, env gate, probe (unless skipped) | one module script from the dev server |
//! | manifest   | otherwise                                          | modern + legacy tags, shims     |

use std::sync::Arc;

use anyhow::Result;

use crate::config::ViteConfig;
use crate::embed::{REACT_REFRESH, RefreshVars, Shim, TemplateVars};
use crate::fetch::ContentFetcher;
use crate::logger::OnceLog;
use crate::manifest::{Manifest, ManifestStore};
use crate::render::{HtmlSink, TagSink};
use crate::resolve::{
    self, Attrs, ResolveOptions, TagDescriptor, TagKind, resolve_asset_url, resolve_entry_url,
};
use crate::utils::url::create_url;
use crate::{debug, log, log_once};

/// Per-call rendering options.
#[derive(Debug, Clone)]
pub struct ScriptOptions {
    /// Load stylesheets without blocking rendering
    pub async_css: bool,
    pub script_attrs: Attrs,
    pub css_attrs: Attrs,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            async_css: true,
            script_attrs: Attrs::new(),
            css_attrs: Attrs::new(),
        }
    }
}

// ============================================================================
// Vite
// ============================================================================

/// Shared resolution service.
pub struct Vite {
    config: ViteConfig,
    fetcher: Arc<ContentFetcher>,
    manifests: ManifestStore,
    reported: OnceLog,
}

impl Vite {
    /// Service with the default fetcher for `config`.
    pub fn new(config: ViteConfig) -> Self {
        let fetcher = ContentFetcher::new(&config);
        Self::with_parts(config, fetcher)
    }

    /// Service over a custom fetcher (cache, HTTP client, resolver).
    pub fn with_parts(config: ViteConfig, fetcher: ContentFetcher) -> Self {
        let fetcher = Arc::new(fetcher);
        let manifests = ManifestStore::new(Arc::clone(&fetcher), !config.cache.dev_mode);
        Self {
            config,
            fetcher,
            manifests,
            reported: OnceLog::new(),
        }
    }

    pub fn config(&self) -> &ViteConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &ContentFetcher {
        &self.fetcher
    }

    /// Start rendering a page.
    pub fn page(&self) -> Page<'_> {
        Page {
            vite: self,
            dev_server: None,
            legacy_polyfill_included: false,
            module_preload_included: false,
            dev_shims_included: false,
        }
    }

    /// The configured manifest, empty when it cannot be loaded.
    pub fn manifest(&self) -> Arc<Manifest> {
        self.manifests.load(&self.config.manifest.path)
    }

    /// Drop cached content, memoized manifests and reported diagnostics.
    pub fn invalidate_caches(&self) {
        self.fetcher.invalidate();
        self.manifests.reload();
        self.reported.clear();
        log!("vite"; "all vite caches cleared");
    }

    /// Ping the dev server; 200 and 404 both mean it answers.
    fn probe(&self) -> bool {
        let base = self.setting(&self.config.server.dev_server_internal);
        let url = create_url(&base, &self.config.server.ping_path);
        match self.fetcher.http().get(&url) {
            Ok(response) => {
                debug!("vite"; "dev server probe {} -> {}", url, response.status);
                matches!(response.status, 200 | 404)
            }
            Err(e) => {
                debug!("vite"; "dev server not reachable: {}", e);
                false
            }
        }
    }

    /// A configured URL or path with aliases and env vars resolved.
    fn setting(&self, value: &str) -> String {
        self.fetcher.resolve_path(value).into_owned()
    }

    fn resolve_options(&self, options: &ScriptOptions) -> ResolveOptions {
        ResolveOptions {
            async_css: options.async_css,
            script_attrs: options.script_attrs.clone(),
            css_attrs: options.css_attrs.clone(),
            legacy: false,
            match_mode: self.config.manifest.entry_match,
            include_dynamic_imports: self.config.manifest.dynamic_imports,
            public_base: self.setting(&self.config.server.server_public),
        }
    }

    /// Shim source: `shims.scripts_dir` copy if present, embedded otherwise.
    fn shim_source(&self, shim: Shim) -> String {
        let fetched = self.fetcher.fetch_script(shim.file_name());
        match shim {
            Shim::ReactRefresh => {
                let vars = RefreshVars::new(&self.setting(&self.config.server.dev_server_public));
                if fetched.is_empty() {
                    REACT_REFRESH.render(&vars)
                } else {
                    vars.apply(&fetched)
                }
            }
            _ if fetched.is_empty() => shim.embedded().to_string(),
            _ => fetched,
        }
    }

    fn report_miss(&self, kind: &str, path: &str) {
        let manifest = &self.config.manifest.path;
        log_once!(self.reported, format!("{kind}:{manifest}:{path}"); "resolve";
            "no {} for `{}` in {}", kind, path, manifest);
    }
}

// ============================================================================
// Page
// ============================================================================

/// Request-scoped view of a [`Vite`] service.
pub struct Page<'v> {
    vite: &'v Vite,
    dev_server: Option<bool>,
    legacy_polyfill_included: bool,
    module_preload_included: bool,
    dev_shims_included: bool,
}

impl Page<'_> {
    /// Whether modules are served by the dev server for this page.
    ///
    /// Probed at most once per page.
    pub fn dev_server_running(&mut self) -> bool {
        if let Some(running) = self.dev_server {
            return running;
        }
        let vite = self.vite;
        let server = &vite.config.server;
        let running = server.dev_server_enabled() && (!server.check_dev_server || vite.probe());
        self.dev_server = Some(running);
        running
    }

    /// Markup loading `path`, lines joined by `\r\n`.
    pub fn script(&mut self, path: &str, options: &ScriptOptions) -> String {
        let mut sink = HtmlSink::new();
        if let Err(e) = self.emit(path, options, &mut sink) {
            log!("vite"; "cannot render {}: {:#}", path, e);
        }
        sink.into_html()
    }

    /// Hand the elements loading `path` to `sink`.
    pub fn register(
        &mut self,
        path: &str,
        options: &ScriptOptions,
        sink: &mut dyn TagSink,
    ) -> Result<()> {
        self.emit(path, options, sink)
    }

    /// Resolve `path` and feed every element to `sink`, shims included.
    pub fn emit(&mut self, path: &str, options: &ScriptOptions, sink: &mut dyn TagSink) -> Result<()> {
        if self.dev_server_running() {
            self.emit_dev_server(path, options, sink)
        } else {
            self.emit_manifest(path, options, sink)
        }
    }

    /// Descriptors for `path` without shims.
    pub fn tags(&mut self, path: &str, options: &ScriptOptions) -> Vec<TagDescriptor> {
        if self.dev_server_running() {
            return vec![self.dev_server_tag(path, options)];
        }
        let manifest = self.vite.manifest();
        let resolve_options = self.vite.resolve_options(options);
        let mut tags = resolve::resolve_tags(&manifest, path, &resolve_options);
        tags.extend(resolve::resolve_legacy_tags(&manifest, path, &resolve_options));
        tags
    }

    /// URL of the built entry `path`, or `""`.
    pub fn entry(&mut self, path: &str) -> String {
        if self.dev_server_running() {
            return create_url(&self.vite.setting(&self.vite.config.server.dev_server_public), path);
        }
        let manifest = self.vite.manifest();
        match resolve_entry_url(&manifest, path, self.vite.config.manifest.entry_match) {
            Some(file) => create_url(&self.vite.setting(&self.vite.config.server.server_public), &file),
            None => {
                self.vite.report_miss("entry", path);
                String::new()
            }
        }
    }

    /// URL of the static asset `path`, or `""`.
    ///
    /// `public` assets are copied verbatim by Vite and live directly under
    /// `server_public`.
    pub fn asset(&mut self, path: &str, public: bool) -> String {
        let vite = self.vite;
        let server = &vite.config.server;
        if self.dev_server_running() {
            return create_url(&vite.setting(&server.dev_server_public), path);
        }
        if public {
            return create_url(&vite.setting(&server.server_public), path);
        }
        let manifest = vite.manifest();
        match resolve_asset_url(&manifest, path, vite.config.manifest.entry_match) {
            Some(file) => create_url(&vite.setting(&server.server_public), &file),
            None => {
                vite.report_miss("asset", path);
                String::new()
            }
        }
    }

    /// Contents of a local file or remote URL, or `""`.
    pub fn inline(&self, path_or_url: &str) -> String {
        self.vite
            .fetcher
            .fetch_text(path_or_url)
            .map(|text| text.as_ref().clone())
            .unwrap_or_default()
    }

    /// Register the configured error entry on 4xx/5xx responses while the
    /// dev server runs. Never fails; returns whether anything was registered.
    pub fn inject_error_entry(&mut self, status: u16, sink: &mut dyn TagSink) -> bool {
        if !(400..600).contains(&status) {
            return false;
        }
        let entry = self.vite.config.server.error_entry.clone();
        if entry.is_empty() || !self.dev_server_running() {
            return false;
        }
        match self.register(&entry, &ScriptOptions::default(), sink) {
            Ok(()) => true,
            Err(e) => {
                debug!("vite"; "error entry {} not injected: {:#}", entry, e);
                false
            }
        }
    }

    // ------------------------------------------------------------------------
    // modes
    // ------------------------------------------------------------------------

    fn dev_server_tag(&self, path: &str, options: &ScriptOptions) -> TagDescriptor {
        let mut attrs = Attrs::new().with("type", "module");
        attrs.merge(&options.script_attrs);
        TagDescriptor {
            kind: TagKind::File,
            key: path.to_string(),
            url: create_url(&self.vite.setting(&self.vite.config.server.dev_server_public), path),
            attrs,
            integrity: None,
        }
    }

    fn emit_dev_server(
        &mut self,
        path: &str,
        options: &ScriptOptions,
        sink: &mut dyn TagSink,
    ) -> Result<()> {
        if self.vite.config.shims.react_refresh && !self.dev_shims_included {
            let shim = Shim::ReactRefresh;
            let source = self.vite.shim_source(shim);
            sink.inline_script(&source, &Attrs::new().with("type", "module"), shim.key())?;
            self.dev_shims_included = true;
        }
        let tag = self.dev_server_tag(path, options);
        sink.script_file(&tag.url, &tag.attrs, &tag.key)
    }

    fn emit_manifest(
        &mut self,
        path: &str,
        options: &ScriptOptions,
        sink: &mut dyn TagSink,
    ) -> Result<()> {
        let manifest = self.vite.manifest();
        let resolve_options = self.vite.resolve_options(options);
        let mut tags = resolve::resolve_tags(&manifest, path, &resolve_options);
        let legacy = resolve::resolve_legacy_tags(&manifest, path, &resolve_options);
        if tags.is_empty() && legacy.is_empty() {
            self.vite.report_miss("entry", path);
            return Ok(());
        }

        if self.vite.config.shims.module_preload && !self.module_preload_included {
            let shim = Shim::ModulePreloadPolyfill;
            let source = self.vite.shim_source(shim);
            sink.inline_script(&source, &Attrs::new().with("type", "module"), shim.key())?;
            self.module_preload_included = true;
        }

        if !legacy.is_empty() && !self.legacy_polyfill_included {
            let shim = Shim::SafariNomoduleFix;
            let source = self.vite.shim_source(shim);
            sink.inline_script(&source, &Attrs::new(), shim.key())?;
            let mut polyfills = resolve::resolve_legacy_polyfills(&manifest, &resolve_options);
            polyfills.append(&mut tags);
            tags = polyfills;
            self.legacy_polyfill_included = true;
        }
        tags.extend(legacy);

        for tag in &tags {
            match tag.kind {
                TagKind::File => sink.script_file(&tag.url, &tag.attrs, &tag.key)?,
                TagKind::Css => sink.css_file(&tag.url, &tag.attrs)?,
                TagKind::Import => {
                    let mut attrs = Attrs::new()
                        .with("rel", "modulepreload")
                        .with("href", tag.url.as_str());
                    attrs.merge(&tag.attrs);
                    sink.link(&attrs)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
