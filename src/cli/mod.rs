//! Command implementations.

pub mod args;

pub use args::{AttrArgs, Cli, Commands};

use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use crate::config::{ViteConfig, find_config_file};
use crate::debug;
use crate::resolve::{AttrValue, Attrs};
use crate::utils::html::parse_attributes;
use crate::vite::{ScriptOptions, Vite};

/// Run a parsed command line.
pub fn run(cli: &Cli) -> Result<()> {
    let config = load_config(&cli.config)?;
    let vite = Vite::new(config);
    let mut page = vite.page();

    match &cli.command {
        Commands::Script { path, attrs } => {
            println!("{}", page.script(path, &script_options(attrs)));
        }
        Commands::Tags { path, attrs } => {
            let tags = page.tags(path, &script_options(attrs));
            println!("{}", serde_json::to_string_pretty(&tags)?);
        }
        Commands::Entry { path } => println!("{}", page.entry(path)),
        Commands::Asset { path, public } => println!("{}", page.asset(path, *public)),
        Commands::Inline { path_or_url } => print!("{}", page.inline(path_or_url)),
        Commands::Status => print_status(&vite, page.dev_server_running()),
    }
    Ok(())
}

/// Load the config file, searching upward from the current directory.
///
/// A missing file is not an error: every setting has a default.
pub fn load_config(path: &Path) -> Result<ViteConfig> {
    match find_config_file(path) {
        Some(found) => ViteConfig::load(&found)
            .with_context(|| format!("failed to load {}", found.display())),
        None => {
            debug!("config"; "{} not found, using defaults", path.display());
            Ok(ViteConfig::default())
        }
    }
}

fn script_options(args: &AttrArgs) -> ScriptOptions {
    ScriptOptions {
        async_css: !args.sync_css,
        script_attrs: parse_attrs(&args.script_attrs),
        css_attrs: parse_attrs(&args.css_attrs),
    }
}

/// Parse `defer nonce="abc"` into attributes; valueless names are flags.
fn parse_attrs(s: &str) -> Attrs {
    parse_attributes(s)
        .into_iter()
        .map(|(name, value)| {
            let value = if value.is_empty() {
                AttrValue::Flag(true)
            } else {
                AttrValue::Text(value)
            };
            (name, value)
        })
        .collect()
}

fn print_status(vite: &Vite, running: bool) {
    let config = vite.config();
    if running {
        println!(
            "{} serving from {}",
            "dev server".green().bold(),
            config.server.dev_server_public
        );
        return;
    }

    let manifest = vite.manifest();
    let reason = if config.server.use_dev_server {
        "dev server not reachable"
    } else {
        "dev server disabled"
    };
    println!(
        "{} {} ({} entries, {})",
        "manifest".yellow().bold(),
        config.manifest.path,
        manifest.len(),
        reason
    );
}
