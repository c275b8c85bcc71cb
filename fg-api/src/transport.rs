//! Transport boundary.
//!
//! The engine assembles a [`WireRequest`] and hands it to an injected
//! [`Transport`] exactly once per builder. No retry happens at this layer;
//! only the album workflow's finalize step retries, one level up.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use tracing::debug;

use fg_core::config::ClientConfig;
use fg_core::constants;
use fg_core::error::{FgError, FgResult};

/// Request body material, already encoded.
pub enum WireBody {
    /// A fully materialized buffer with its content type.
    Bytes {
        /// Content-Type header value for the buffer.
        content_type: String,
        /// Body bytes.
        payload: Vec<u8>,
    },
    /// A multipart form; file parts stream lazily from their sources.
    Multipart(reqwest::multipart::Form),
}

impl fmt::Debug for WireBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireBody::Bytes { content_type, payload } => f
                .debug_struct("Bytes")
                .field("content_type", content_type)
                .field("len", &payload.len())
                .finish(),
            WireBody::Multipart(_) => f.write_str("Multipart"),
        }
    }
}

/// The fully assembled request ready for transmission. Immutable.
#[derive(Debug)]
pub struct WireRequest {
    /// HTTP method, derived from body presence (never set explicitly).
    pub method: Method,
    /// Absolute URL including the ordered query string.
    pub url: String,
    /// Header mapping; explicit headers first, defaults merged after.
    pub headers: Vec<(String, String)>,
    /// Encoded body, absent for GET requests.
    pub body: Option<WireBody>,
}

/// Raw response from the transport, cached on the builder after execution.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: Vec<(String, String)>,
    /// Response body bytes.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Body decoded as UTF-8, lossy.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Performs the actual network I/O for one wire request.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and collect the full response.
    async fn execute(&self, request: WireRequest) -> FgResult<RawResponse>;
}

/// Production transport backed by `reqwest`.
pub struct HttpTransport {
    inner: Client,
    /// Extended timeout applied to multipart requests (large transfers).
    extended_timeout: Duration,
}

impl HttpTransport {
    /// Build the transport from client configuration.
    pub fn new(config: &ClientConfig) -> FgResult<Self> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let mut builder = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(15))
            .pool_max_idle_per_host(5)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30));

        // Debug proxies present self-signed certificates
        if config.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let inner = builder
            .build()
            .map_err(|e| FgError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner,
            extended_timeout: timeout * constants::EXTENDED_TIMEOUT_MULTIPLIER as u32,
        })
    }

    /// Classify a reqwest error into an FgError variant.
    fn classify_error(e: reqwest::Error) -> FgError {
        if e.is_timeout() {
            FgError::Timeout(e.to_string())
        } else if e.is_connect() {
            FgError::Http(format!("connection failed: {e}"))
        } else {
            FgError::Http(e.to_string())
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: WireRequest) -> FgResult<RawResponse> {
        debug!("{} {}", request.method, request.url);

        let mut builder = self.inner.request(request.method, &request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        builder = match request.body {
            Some(WireBody::Bytes { content_type, payload }) => builder
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(payload),
            Some(WireBody::Multipart(form)) => {
                // Large transfers get the extended timeout
                builder.timeout(self.extended_timeout).multipart(form)
            }
            None => builder,
        };

        let response = builder.send().await.map_err(Self::classify_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| FgError::Http(format!("failed to read response body: {e}")))?
            .to_vec();

        Ok(RawResponse { status, headers, body })
    }
}
