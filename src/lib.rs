//! viteline - resolve Vite build manifests into HTML tags.
//!
//! Maps logical entry names (`src/main.js`) to the hashed files of a Vite
//! build and produces the tags that load them, either from a running dev
//! server or from the build manifest.
//!
//! # Module Structure
//!
//! | Module     | Purpose                                               |
//! |------------|-------------------------------------------------------|
//! | `config`   | `viteline.toml` loading and validation                |
//! | `fetch`    | local/remote content loading with a dependency cache  |
//! | `manifest` | manifest model and per-path memoization               |
//! | `resolve`  | graph walk producing `TagDescriptor`s                 |
//! | `render`   | `TagSink` trait, HTML string and head registry sinks  |
//! | `vite`     | `Vite` service and request-scoped `Page`              |
//! | `embed`    | compiled-in shim scripts                              |
//!
//! # Example
//!
//! ```ignore
//! use viteline::{ScriptOptions, Vite, ViteConfig};
//!
//! let vite = Vite::new(ViteConfig::load("viteline.toml".as_ref())?);
//! let mut page = vite.page();
//! let tags = page.script("src/main.js", &ScriptOptions::default());
//! ```

pub mod cli;
pub mod config;
pub mod embed;
pub mod env;
pub mod fetch;
pub mod logger;
pub mod manifest;
pub mod render;
pub mod resolve;
pub mod utils;
pub mod vite;

pub use config::ViteConfig;
pub use render::{HeadRegistry, HtmlSink, TagSink};
pub use resolve::{Attrs, TagDescriptor, TagKind};
pub use vite::{Page, ScriptOptions, Vite};
