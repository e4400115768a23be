use super::*;

use std::fs;
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use anyhow::anyhow;
use tempfile::TempDir;

use crate::fetch::{FetchError, HttpClient, HttpResponse};
use crate::render::{HeadItem, HeadRegistry};

const BASIC: &str = r#"{
    "src/main.js": {
        "file": "assets/main.abc123.js",
        "isEntry": true,
        "css": ["assets/main.def456.css"],
        "imports": ["src/util.js"],
        "assets": ["assets/logo.a1b2c3.png"]
    },
    "src/util.js": { "file": "assets/util.ghi789.js" },
    "src/error.js": { "file": "assets/error.e1.js", "isEntry": true }
}"#;

const LEGACY: &str = r#"{
    "../../vite/legacy-polyfills-legacy": {"file": "assets/polyfills-legacy.p1.js", "isEntry": true},
    "src/main.js": {"file": "assets/main.m1.js", "isEntry": true},
    "src/main-legacy.js": {"file": "assets/main-legacy.l1.js", "isEntry": true},
    "src/admin.js": {"file": "assets/admin.a1.js", "isEntry": true},
    "src/admin-legacy.js": {"file": "assets/admin-legacy.a2.js", "isEntry": true}
}"#;

/// Answers every request with one status and counts the calls.
struct StubHttp {
    status: u16,
    calls: AtomicUsize,
}

impl StubHttp {
    fn new(status: u16) -> Arc<Self> {
        Arc::new(Self {
            status,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HttpClient for StubHttp {
    fn get(&self, _url: &str) -> Result<HttpResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(HttpResponse {
            status: self.status,
            body: Vec::new(),
        })
    }
}

/// Sink rejecting everything, like a view that was already rendered.
struct ClosedSink;

impl TagSink for ClosedSink {
    fn script_file(&mut self, _: &str, _: &Attrs, _: &str) -> Result<()> {
        Err(anyhow!("view closed"))
    }
    fn inline_script(&mut self, _: &str, _: &Attrs, _: &str) -> Result<()> {
        Err(anyhow!("view closed"))
    }
    fn css_file(&mut self, _: &str, _: &Attrs) -> Result<()> {
        Err(anyhow!("view closed"))
    }
    fn link(&mut self, _: &Attrs) -> Result<()> {
        Err(anyhow!("view closed"))
    }
}

fn fixture(manifest: &str) -> (TempDir, ViteConfig) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("manifest.json");
    fs::write(&path, manifest).unwrap();
    let mut config = ViteConfig::default();
    config.manifest.path = path.to_string_lossy().into_owned();
    (dir, config)
}

fn vite_with(config: ViteConfig, http: Arc<StubHttp>) -> Vite {
    let fetcher = ContentFetcher::new(&config).with_http(http);
    Vite::with_parts(config, fetcher)
}

fn dev_config() -> ViteConfig {
    let mut config = ViteConfig::default();
    config.server.use_dev_server = true;
    config
}

fn lines(html: &str) -> Vec<&str> {
    html.split("\r\n").collect()
}

// ============================================================================
// Manifest mode
// ============================================================================

#[test]
fn test_manifest_script() {
    let (_dir, config) = fixture(BASIC);
    let vite = vite_with(config, StubHttp::new(200));
    let html = vite.page().script("src/main.js", &ScriptOptions::default());
    let lines = lines(&html);

    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("<script type=\"module\">"));
    assert!(lines[0].contains("modulepreload"));
    assert_eq!(
        lines[1],
        concat!(
            r#"<script src="/dist/assets/main.abc123.js" type="module" crossorigin"#,
            r#" onload="e=new CustomEvent(&#39;vite-script-loaded&#39;, {detail:{path: &#39;src/main.js&#39;}});document.dispatchEvent(e);"></script>"#,
        )
    );
    assert_eq!(
        lines[2],
        r#"<link rel="modulepreload" href="/dist/assets/util.ghi789.js" crossorigin>"#
    );
    assert_eq!(
        lines[3],
        r#"<link href="/dist/assets/main.def456.css" rel="stylesheet" media="print" onload="this.media=&#39;all&#39;">"#
    );
}

#[test]
fn test_manifest_mode_never_probes() {
    let (_dir, config) = fixture(BASIC);
    let http = StubHttp::new(200);
    let vite = vite_with(config, http.clone());
    let mut page = vite.page();
    assert!(!page.dev_server_running());
    page.script("src/main.js", &ScriptOptions::default());
    assert_eq!(http.calls(), 0);
}

#[test]
fn test_unknown_entry_renders_nothing() {
    let (_dir, config) = fixture(BASIC);
    let vite = vite_with(config, StubHttp::new(200));
    let mut page = vite.page();
    assert_eq!(page.script("src/missing.js", &ScriptOptions::default()), "");
    assert!(page.tags("src/missing.js", &ScriptOptions::default()).is_empty());
}

#[test]
fn test_missing_manifest_renders_nothing() {
    let dir = TempDir::new().unwrap();
    let mut config = ViteConfig::default();
    config.manifest.path = dir.path().join("nope.json").to_string_lossy().into_owned();
    let vite = vite_with(config, StubHttp::new(200));
    let mut page = vite.page();
    assert_eq!(page.script("src/main.js", &ScriptOptions::default()), "");
    assert_eq!(page.entry("src/main.js"), "");
}

#[test]
fn test_unreachable_remote_manifest_fetched_once() {
    let mut config = ViteConfig::default();
    config.manifest.path = "http://cdn.test/manifest.json".into();
    let http = StubHttp::new(503);
    let vite = vite_with(config, http.clone());

    for _ in 0..5 {
        assert_eq!(vite.page().script("src/main.js", &ScriptOptions::default()), "");
    }
    assert_eq!(http.calls(), 1);

    vite.invalidate_caches();
    assert_eq!(vite.page().entry("src/main.js"), "");
    assert_eq!(http.calls(), 2);
}

#[test]
fn test_invalid_manifest_parsed_once() {
    let (_dir, config) = fixture("<html>not json</html>");
    let vite = vite_with(config, StubHttp::new(200));
    let first = vite.manifest();
    assert!(first.is_empty());
    assert!(Arc::ptr_eq(&first, &vite.manifest()));
}

#[test]
fn test_module_preload_shim_once_per_page() {
    let (_dir, config) = fixture(BASIC);
    let vite = vite_with(config, StubHttp::new(200));

    let mut page = vite.page();
    let first = page.script("src/main.js", &ScriptOptions::default());
    let second = page.script("src/error.js", &ScriptOptions::default());
    assert!(first.starts_with("<script type=\"module\">"));
    assert_eq!(lines(&second).len(), 1);
    assert!(second.starts_with("<script src=\"/dist/assets/error.e1.js\""));

    // a new page gets its own shim
    let other = vite.page().script("src/error.js", &ScriptOptions::default());
    assert_eq!(lines(&other).len(), 2);
}

#[test]
fn test_module_preload_shim_disabled() {
    let (_dir, mut config) = fixture(BASIC);
    config.shims.module_preload = false;
    let vite = vite_with(config, StubHttp::new(200));
    let html = vite.page().script("src/main.js", &ScriptOptions::default());
    assert!(html.starts_with("<script src="));
}

#[test]
fn test_legacy_shims_once_per_page() {
    let (_dir, mut config) = fixture(LEGACY);
    config.shims.module_preload = false;
    let vite = vite_with(config, StubHttp::new(200));
    let mut page = vite.page();

    let html = page.script("src/main.js", &ScriptOptions::default());
    let first = lines(&html);
    assert_eq!(first.len(), 4);
    assert!(first[0].starts_with("<script>!function(){"));
    assert!(first[1].contains("/dist/assets/polyfills-legacy.p1.js"));
    assert!(first[1].contains(" nomodule"));
    assert!(first[2].contains("/dist/assets/main.m1.js"));
    assert!(first[3].contains("/dist/assets/main-legacy.l1.js"));
    assert!(first[3].contains(" nomodule"));

    let html = page.script("src/admin.js", &ScriptOptions::default());
    let second = lines(&html);
    assert_eq!(second.len(), 2);
    assert!(second[0].contains("/dist/assets/admin.a1.js"));
    assert!(second[1].contains("/dist/assets/admin-legacy.a2.js"));
}

#[test]
fn test_caller_attributes() {
    let (_dir, mut config) = fixture(BASIC);
    config.shims.module_preload = false;
    let vite = vite_with(config, StubHttp::new(200));
    let options = ScriptOptions {
        async_css: false,
        script_attrs: Attrs::new().with("nonce", "n1"),
        css_attrs: Attrs::new().with("nonce", "n1"),
    };
    let html = vite.page().script("src/main.js", &options);
    let lines = lines(&html);
    assert!(lines[0].ends_with(" nonce=\"n1\"></script>"));
    assert_eq!(
        lines[2],
        r#"<link href="/dist/assets/main.def456.css" rel="stylesheet" nonce="n1">"#
    );
}

#[test]
fn test_register_with_head_registry() {
    let (_dir, config) = fixture(BASIC);
    let vite = vite_with(config, StubHttp::new(200));
    let mut page = vite.page();
    let mut head = HeadRegistry::new();

    page.register("src/main.js", &ScriptOptions::default(), &mut head)
        .unwrap();
    page.register("src/main.js", &ScriptOptions::default(), &mut head)
        .unwrap();

    assert_eq!(head.len(), 4);
    assert!(matches!(head.items()[0], HeadItem::InlineScript { .. }));
    assert!(matches!(&head.items()[1], HeadItem::Script { url, .. } if url == "/dist/assets/main.abc123.js"));
    assert!(matches!(head.items()[2], HeadItem::Link { .. }));
    assert!(matches!(head.items()[3], HeadItem::Css { .. }));
}

#[test]
fn test_register_propagates_sink_errors() {
    let (_dir, config) = fixture(BASIC);
    let vite = vite_with(config, StubHttp::new(200));
    let result = vite
        .page()
        .register("src/main.js", &ScriptOptions::default(), &mut ClosedSink);
    assert!(result.is_err());
}

#[test]
fn test_tags_include_legacy() {
    let (_dir, config) = fixture(LEGACY);
    let vite = vite_with(config, StubHttp::new(200));
    let tags = vite.page().tags("src/main.js", &ScriptOptions::default());
    let keys: Vec<_> = tags.iter().map(|t| t.key.as_str()).collect();
    assert_eq!(keys, ["src/main.js", "src/main-legacy.js"]);
}

// ============================================================================
// URLs and inlining
// ============================================================================

#[test]
fn test_entry_and_asset_urls() {
    let (_dir, config) = fixture(BASIC);
    let vite = vite_with(config, StubHttp::new(200));
    let mut page = vite.page();

    assert_eq!(page.entry("src/main.js"), "/dist/assets/main.abc123.js");
    assert_eq!(page.entry("src/nope.js"), "");
    assert_eq!(page.asset("src/img/logo.png", false), "/dist/assets/logo.a1b2c3.png");
    assert_eq!(page.asset("favicon.ico", true), "/dist/favicon.ico");
    assert_eq!(page.asset("src/img/nope.png", false), "");
}

#[test]
fn test_inline() {
    let (dir, config) = fixture(BASIC);
    let svg = dir.path().join("icon.svg");
    fs::write(&svg, "<svg></svg>").unwrap();
    let vite = vite_with(config, StubHttp::new(200));
    let page = vite.page();

    assert_eq!(page.inline(svg.to_str().unwrap()), "<svg></svg>");
    assert_eq!(page.inline(dir.path().join("gone.svg").to_str().unwrap()), "");
}

#[test]
fn test_shim_from_scripts_dir() {
    let (dir, mut config) = fixture(BASIC);
    fs::write(dir.path().join("modulepreload-polyfill.min.js"), "custom()").unwrap();
    config.shims.scripts_dir = dir.path().to_string_lossy().into_owned();
    let vite = vite_with(config, StubHttp::new(200));

    let html = vite.page().script("src/main.js", &ScriptOptions::default());
    assert!(html.starts_with("<script type=\"module\">custom()</script>"));
}

#[test]
fn test_invalidate_caches_reloads_manifest() {
    let (dir, config) = fixture(BASIC);
    let vite = vite_with(config, StubHttp::new(200));
    assert_eq!(vite.page().entry("src/main.js"), "/dist/assets/main.abc123.js");

    fs::write(
        dir.path().join("manifest.json"),
        r#"{"src/main.js": {"file": "assets/main.new.js", "isEntry": true}}"#,
    )
    .unwrap();
    // memoized until invalidated
    assert_eq!(vite.page().entry("src/main.js"), "/dist/assets/main.abc123.js");

    vite.invalidate_caches();
    assert_eq!(vite.page().entry("src/main.js"), "/dist/assets/main.new.js");
}

// ============================================================================
// Dev server mode
// ============================================================================

#[test]
fn test_probe_statuses() {
    for (status, running) in [(200, true), (404, true), (500, false), (302, false)] {
        let vite = vite_with(dev_config(), StubHttp::new(status));
        assert_eq!(vite.page().dev_server_running(), running, "status {status}");
    }
}

#[test]
fn test_probe_cached_per_page() {
    let http = StubHttp::new(200);
    let vite = vite_with(dev_config(), http.clone());

    let mut page = vite.page();
    assert!(page.dev_server_running());
    assert!(page.dev_server_running());
    page.script("src/main.js", &ScriptOptions::default());
    assert_eq!(http.calls(), 1);

    vite.page().dev_server_running();
    assert_eq!(http.calls(), 2);
}

#[test]
fn test_probe_connection_refused() {
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let mut config = dev_config();
    config.server.dev_server_internal = format!("http://127.0.0.1:{port}/");
    let vite = Vite::new(config);
    assert!(!vite.page().dev_server_running());
}

#[test]
fn test_probe_real_server() {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let handle = thread::spawn(move || {
        let request = server.recv().unwrap();
        let url = request.url().to_string();
        let _ = request.respond(tiny_http::Response::empty(tiny_http::StatusCode(404)));
        url
    });

    let mut config = dev_config();
    config.server.dev_server_internal = format!("http://127.0.0.1:{port}/");
    let vite = Vite::new(config);
    assert!(vite.page().dev_server_running());
    assert_eq!(handle.join().unwrap(), "/__vite_ping");
}

#[test]
fn test_check_disabled_skips_probe() {
    let http = StubHttp::new(500);
    let mut config = dev_config();
    config.server.check_dev_server = false;
    let vite = vite_with(config, http.clone());
    assert!(vite.page().dev_server_running());
    assert_eq!(http.calls(), 0);
}

#[test]
fn test_env_var_gate() {
    let http = StubHttp::new(200);
    let mut config = dev_config();
    config.server.dev_server_env_var = "VITELINE_TEST_SURELY_UNSET_VAR".into();
    let vite = vite_with(config, http.clone());
    assert!(!vite.page().dev_server_running());
    assert_eq!(http.calls(), 0);
}

#[test]
fn test_dev_server_script() {
    let vite = vite_with(dev_config(), StubHttp::new(200));
    let options = ScriptOptions {
        script_attrs: Attrs::new().with("defer", true),
        ..Default::default()
    };
    assert_eq!(
        vite.page().script("src/main.js", &options),
        r#"<script src="http://localhost:5173/src/main.js" type="module" defer></script>"#
    );
}

#[test]
fn test_dev_server_urls() {
    let vite = vite_with(dev_config(), StubHttp::new(200));
    let mut page = vite.page();
    assert_eq!(page.entry("src/main.js"), "http://localhost:5173/src/main.js");
    assert_eq!(page.asset("/src/img/logo.png", false), "http://localhost:5173/src/img/logo.png");
}

#[test]
fn test_react_refresh_shim_once() {
    let mut config = dev_config();
    config.shims.react_refresh = true;
    config.server.dev_server_public = "https://vite.test:3001/".into();
    let vite = vite_with(config, StubHttp::new(200));
    let mut page = vite.page();

    let html = page.script("src/main.js", &ScriptOptions::default());
    let first = lines(&html);
    assert_eq!(first.len(), 2);
    assert!(first[0].starts_with("<script type=\"module\">"));
    assert!(first[0].contains("https://vite.test:3001/@react-refresh"));
    assert!(!first[0].contains("localhost:3000"));

    let second = page.script("src/admin.js", &ScriptOptions::default());
    assert_eq!(lines(&second).len(), 1);
}

// ============================================================================
// Error pages
// ============================================================================

#[test]
fn test_inject_error_entry() {
    let mut config = dev_config();
    config.server.error_entry = "src/error.js".into();
    let vite = vite_with(config, StubHttp::new(200));
    let mut page = vite.page();
    let mut head = HeadRegistry::new();

    assert!(!page.inject_error_entry(200, &mut head));
    assert!(!page.inject_error_entry(302, &mut head));
    assert!(head.is_empty());

    assert!(page.inject_error_entry(500, &mut head));
    assert!(matches!(&head.items()[0], HeadItem::Script { url, .. } if url == "http://localhost:5173/src/error.js"));
}

#[test]
fn test_inject_error_entry_requires_dev_server() {
    let mut config = dev_config();
    config.server.error_entry = "src/error.js".into();
    let vite = vite_with(config, StubHttp::new(503));
    let mut head = HeadRegistry::new();
    assert!(!vite.page().inject_error_entry(404, &mut head));
    assert!(head.is_empty());

    let vite = vite_with(dev_config(), StubHttp::new(200));
    assert!(!vite.page().inject_error_entry(404, &mut head));
}

#[test]
fn test_inject_error_entry_swallows_failures() {
    let mut config = dev_config();
    config.server.error_entry = "src/error.js".into();
    let vite = vite_with(config, StubHttp::new(200));
    assert!(!vite.page().inject_error_entry(500, &mut ClosedSink));
}

#[test]
fn test_vite_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Vite>();
}
