//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Resolve Vite entries to tags and URLs from a build manifest or dev server
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: viteline.toml, searched upward)
    #[arg(short = 'C', long, default_value = "viteline.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the tags loading an entry
    #[command(visible_alias = "s")]
    Script {
        /// Entry key, e.g. src/main.js
        path: String,

        #[command(flatten)]
        attrs: AttrArgs,
    },

    /// Print the resolved tag descriptors as JSON
    #[command(visible_alias = "t")]
    Tags {
        /// Entry key, e.g. src/main.js
        path: String,

        #[command(flatten)]
        attrs: AttrArgs,
    },

    /// Print the URL of a built entry
    #[command(visible_alias = "e")]
    Entry {
        /// Entry key, e.g. src/main.js
        path: String,
    },

    /// Print the URL of a static asset
    #[command(visible_alias = "a")]
    Asset {
        /// Asset source path, e.g. src/img/logo.png
        path: String,

        /// Treat the asset as a file from Vite's public directory
        #[arg(short, long)]
        public: bool,
    },

    /// Print the contents of a local file or remote URL
    #[command(visible_alias = "i")]
    Inline {
        /// File path or URL; aliases and environment variables are expanded
        path_or_url: String,
    },

    /// Report whether the dev server is used
    Status,
}

/// Attribute arguments shared by `script` and `tags`.
#[derive(clap::Args, Debug, Clone)]
pub struct AttrArgs {
    /// Load stylesheets synchronously instead of swapping `media` on load
    #[arg(long)]
    pub sync_css: bool,

    /// Extra script attributes, e.g. 'defer nonce="abc"'
    #[arg(long, value_name = "ATTRS", default_value = "")]
    pub script_attrs: String,

    /// Extra stylesheet attributes, e.g. 'nonce="abc"'
    #[arg(long, value_name = "ATTRS", default_value = "")]
    pub css_attrs: String,
}
