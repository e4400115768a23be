//! Path and URL string resolution.
//!
//! Configured paths may reference:
//! - aliases: `@webroot/dist/manifest.json` (from `[aliases]`)
//! - environment variables: `$DIST_DIR/manifest.json`, `${VITE_URL}`
//! - the home directory: `~/sites/dist`
//!
//! Resolution never fails: an unknown alias or undefined variable leaves the
//! string as written, so the subsequent fetch reports the miss.

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::debug;

/// Resolves aliases and environment references in path strings.
pub trait EnvResolver: Send + Sync {
    fn resolve<'a>(&self, input: &'a str) -> Cow<'a, str>;
}

/// Default resolver: alias table first, then `shellexpand`.
#[derive(Debug, Clone, Default)]
pub struct ShellResolver {
    aliases: BTreeMap<String, String>,
}

impl ShellResolver {
    pub fn new(aliases: BTreeMap<String, String>) -> Self {
        Self { aliases }
    }

    /// Replace a leading `@alias` segment.
    fn expand_alias<'a>(&self, input: &'a str) -> Cow<'a, str> {
        if !input.starts_with('@') {
            return Cow::Borrowed(input);
        }
        let (name, rest) = match input.find('/') {
            Some(idx) => input.split_at(idx),
            None => (input, ""),
        };
        match self.aliases.get(name) {
            Some(target) => Cow::Owned(format!("{}{}", target.trim_end_matches('/'), rest)),
            None => {
                debug!("env"; "unknown alias {}", name);
                Cow::Borrowed(input)
            }
        }
    }
}

impl EnvResolver for ShellResolver {
    fn resolve<'a>(&self, input: &'a str) -> Cow<'a, str> {
        let aliased = self.expand_alias(input);
        if !aliased.contains('$') && !aliased.starts_with('~') {
            return aliased;
        }
        let expanded = shellexpand::full(aliased.as_ref()).map(Cow::into_owned);
        match expanded {
            Ok(expanded) => Cow::Owned(expanded),
            Err(e) => {
                debug!("env"; "cannot expand {}: {}", input, e);
                aliased
            }
        }
    }
}
