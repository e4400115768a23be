//! Content fetch errors.
//!
//! These never reach the public resolution API: the fetcher logs them and
//! reports "no content".

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to `{url}` failed")]
    Transport {
        url: String,
        #[source]
        source: ureq::Error,
    },

    #[error("`{url}` responded with status {status}")]
    Status { url: String, status: u16 },

    #[error("cannot read `{0}`")]
    Io(PathBuf, #[source] std::io::Error),
}

impl FetchError {
    /// Whether the error means "nothing there" rather than a real failure.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == 404,
            Self::Io(_, err) => err.kind() == std::io::ErrorKind::NotFound,
            Self::Transport { .. } => false,
        }
    }
}
