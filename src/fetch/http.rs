//! Blocking HTTP GET used for remote content and the dev server probe.

use std::time::Duration;

use ureq::tls::TlsConfig;

use super::FetchError;

/// Connect timeout for every outbound request.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Total timeout for every outbound request.
pub const TOTAL_TIMEOUT: Duration = Duration::from_secs(5);

const USER_AGENT: &str = concat!("viteline/", env!("CARGO_PKG_VERSION"));

/// A completed HTTP exchange, whatever its status.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Minimal HTTP client interface.
///
/// Non-2xx statuses are responses, not errors; only transport failures
/// (refused, timeout, TLS, DNS) are `Err`.
pub trait HttpClient: Send + Sync {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError>;
}

/// `HttpClient` backed by a shared `ureq::Agent`.
pub struct UreqClient {
    agent: ureq::Agent,
}

impl UreqClient {
    /// Build a client with the standard timeouts.
    ///
    /// `verify_tls = false` accepts any certificate, which is what local dev
    /// servers with self-signed certificates need.
    pub fn new(verify_tls: bool) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_connect(Some(CONNECT_TIMEOUT))
            .timeout_global(Some(TOTAL_TIMEOUT))
            .http_status_as_error(false)
            .tls_config(
                TlsConfig::builder()
                    .disable_verification(!verify_tls)
                    .build(),
            )
            .build();
        Self {
            agent: config.into(),
        }
    }
}

impl Default for UreqClient {
    fn default() -> Self {
        Self::new(false)
    }
}

impl HttpClient for UreqClient {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let mut response = self
            .agent
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "*/*")
            .call()
            .map_err(transport)?;

        let status = response.status().as_u16();
        let body = response.body_mut().read_to_vec().map_err(transport)?;
        Ok(HttpResponse { status, body })
    }
}
