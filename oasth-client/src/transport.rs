//! HTTP transport for the upstream API.
//!
//! The upstream serves the static datasets gzip-compressed and the live
//! endpoints as plain text. Both kinds are fetched with a GET on
//! `{base}/{endpoint}/?a=1`; there is no authentication.

use std::collections::HashMap;
use std::future::Future;
use std::io::Read;
use std::time::Duration;

use flate2::read::GzDecoder;

/// Default base URL of the API.
const DEFAULT_BASE_URL: &str = "https://old.oasth.gr/el/api";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Magic bytes opening every gzip stream.
const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];

/// Errors from fetching an endpoint.
///
/// Variants carry the full request URL so a failing dataset can be
/// re-fetched by hand. The type is `Clone` because fetch results travel
/// through shared futures during snapshot assembly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request could not be completed (connect, timeout, body read).
    #[error("GET {url}: {message}")]
    Request { url: String, message: String },

    /// The server answered with a non-success status.
    #[error("GET {url}: HTTP status {status}")]
    Status { url: String, status: u16 },

    /// The compressed body could not be decoded.
    #[error("GET {url}: gzip decode failed: {message}")]
    Gzip { url: String, message: String },

    /// The body was not valid UTF-8 text.
    #[error("GET {url}: body is not valid UTF-8")]
    NotText { url: String },
}

/// Access to the upstream endpoints.
///
/// The snapshot pipeline and the live queries are generic over this trait:
/// [`HttpTransport`] talks to the real API, [`StaticTransport`] serves
/// canned bodies in tests and offline demos.
pub trait Transport: Send + Sync {
    /// Fetches the body of a plain-text endpoint.
    fn fetch_text(
        &self,
        endpoint: &str,
    ) -> impl Future<Output = Result<String, TransportError>> + Send;

    /// Fetches the body of a gzip-compressed endpoint, transparently
    /// decompressed.
    fn fetch_gzipped_text(
        &self,
        endpoint: &str,
    ) -> impl Future<Output = Result<String, TransportError>> + Send;
}

/// Assembles the request URL for an endpoint name.
///
/// The endpoint name must not start or end with a slash. Parameterised
/// endpoints pass the parameter as part of the name (`getStopArrivals/15`).
pub(crate) fn endpoint_url(base_url: &str, endpoint: &str) -> String {
    format!("{base_url}/{endpoint}/?a=1")
}

/// Decompresses a gzipped response body into text.
///
/// Bodies without the gzip magic are passed through unchanged; some
/// deployments serve the nominally compressed endpoints as plain text.
pub(crate) fn decode_gzipped_body(url: &str, bytes: &[u8]) -> Result<String, TransportError> {
    if !bytes.starts_with(GZIP_MAGIC) {
        return String::from_utf8(bytes.to_vec()).map_err(|_| TransportError::NotText {
            url: url.to_string(),
        });
    }

    let mut text = String::new();
    GzDecoder::new(bytes)
        .read_to_string(&mut text)
        .map_err(|e| TransportError::Gzip {
            url: url.to_string(),
            message: e.to_string(),
        })?;
    Ok(text)
}

/// Configuration for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl TransportConfig {
    /// Creates a config with production defaults.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Sets a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Transport backed by a real HTTP client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Creates a transport with the given configuration.
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportError::Request {
                url: config.base_url.clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| TransportError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        tracing::debug!(url, bytes = body.len(), "fetched endpoint");
        Ok(body.to_vec())
    }
}

impl Transport for HttpTransport {
    async fn fetch_text(&self, endpoint: &str) -> Result<String, TransportError> {
        let url = endpoint_url(&self.base_url, endpoint);
        let bytes = self.get_bytes(&url).await?;
        String::from_utf8(bytes).map_err(|_| TransportError::NotText { url })
    }

    async fn fetch_gzipped_text(&self, endpoint: &str) -> Result<String, TransportError> {
        let url = endpoint_url(&self.base_url, endpoint);
        let bytes = self.get_bytes(&url).await?;
        decode_gzipped_body(&url, &bytes)
    }
}

/// Transport serving canned bodies from memory.
///
/// Endpoints not present in the map fail with a 404 status error, which
/// exercises the same failure path a missing endpoint takes in production.
#[derive(Debug, Clone, Default)]
pub struct StaticTransport {
    bodies: HashMap<String, String>,
}

impl StaticTransport {
    /// Creates an empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a canned body for an endpoint.
    pub fn with_body(mut self, endpoint: impl Into<String>, body: impl Into<String>) -> Self {
        self.bodies.insert(endpoint.into(), body.into());
        self
    }

    fn lookup(&self, endpoint: &str) -> Result<String, TransportError> {
        self.bodies
            .get(endpoint)
            .cloned()
            .ok_or_else(|| TransportError::Status {
                url: endpoint_url("static", endpoint),
                status: 404,
            })
    }
}

impl Transport for StaticTransport {
    async fn fetch_text(&self, endpoint: &str) -> Result<String, TransportError> {
        self.lookup(endpoint)
    }

    async fn fetch_gzipped_text(&self, endpoint: &str) -> Result<String, TransportError> {
        self.lookup(endpoint)
    }
}
