//! Configuration section definitions.
//!
//! | Section      | Purpose                                        |
//! |--------------|------------------------------------------------|
//! | `[server]`   | Dev server URLs, probing, production base URL  |
//! | `[manifest]` | Manifest location and entry matching           |
//! | `[shims]`    | Polyfill / preamble injection                  |
//! | `[cache]`    | Content cache expiry and key suffix            |

mod cache;
mod manifest;
mod server;
mod shims;

pub use cache::CacheConfig;
pub use manifest::{EntryMatch, ManifestConfig};
pub use server::ServerConfig;
pub use shims::ShimsConfig;
