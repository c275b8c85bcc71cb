//! Request construction and one-shot execution.
//!
//! A [`RequestBuilder`] accumulates query params, POST fields, file
//! attachments, headers, and flags, then assembles and sends the wire request
//! exactly once. The first `execute` caches the raw response; repeated calls
//! return the cache without touching the network, so calling a raw accessor
//! and a typed accessor on the same builder cannot double-post.

use std::path::Path;
use std::sync::Arc;

use rand::Rng;
use serde::de::DeserializeOwned;
use tracing::debug;

use fg_core::config::ApiVersion;
use fg_core::constants;
use fg_core::error::{FgError, FgResult};

use crate::body::{self, EncodedBody, FileAttachment};
use crate::ordering;
use crate::response::map_response;
use crate::session::SessionState;
use crate::sign::Signer;
use crate::transport::{RawResponse, Transport, WireBody, WireRequest};

/// Value accepted by `query` and `post`.
///
/// Booleans are normalized to the literal strings `"true"`/`"false"`; the
/// server expects string-typed booleans in form-encoded contexts.
pub trait IntoParam {
    /// Convert into the wire string representation.
    fn into_param(self) -> String;
}

impl IntoParam for String {
    fn into_param(self) -> String {
        self
    }
}

impl IntoParam for &str {
    fn into_param(self) -> String {
        self.to_string()
    }
}

impl IntoParam for bool {
    fn into_param(self) -> String {
        if self { "true".into() } else { "false".into() }
    }
}

impl IntoParam for i64 {
    fn into_param(self) -> String {
        self.to_string()
    }
}

impl IntoParam for u64 {
    fn into_param(self) -> String {
        self.to_string()
    }
}

/// Execution latch making the at-most-once-network-call invariant explicit.
#[derive(Debug)]
enum ExecState {
    Unsent,
    Executed(RawResponse),
}

/// Single-use request builder.
///
/// Created via [`crate::ApiClient::request`]; mutated only through its own
/// methods; consumed by the first `execute`.
pub struct RequestBuilder {
    endpoint: String,
    version: ApiVersion,
    query: Vec<(String, String)>,
    post: Vec<(String, String)>,
    files: Vec<(String, FileAttachment)>,
    headers: Vec<(String, String)>,
    raw_body: Option<(String, Vec<u8>)>,
    needs_auth: bool,
    sign_post: bool,
    use_default_headers: bool,
    state: ExecState,
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionState>,
    signer: Arc<dyn Signer>,
}

fn upsert(pairs: &mut Vec<(String, String)>, key: &str, value: String) {
    if let Some(existing) = pairs.iter_mut().find(|(k, _)| k == key) {
        existing.1 = value;
    } else {
        pairs.push((key.to_string(), value));
    }
}

impl RequestBuilder {
    pub(crate) fn new(
        endpoint: &str,
        version: ApiVersion,
        transport: Arc<dyn Transport>,
        session: Arc<dyn SessionState>,
        signer: Arc<dyn Signer>,
    ) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            version,
            query: Vec::new(),
            post: Vec::new(),
            files: Vec::new(),
            headers: Vec::new(),
            raw_body: None,
            needs_auth: false,
            sign_post: false,
            use_default_headers: true,
            state: ExecState::Unsent,
            transport,
            session,
            signer,
        }
    }

    /// Add a query parameter. Setting the same key again replaces the value.
    pub fn query(mut self, key: &str, value: impl IntoParam) -> Self {
        upsert(&mut self.query, key, value.into_param());
        self
    }

    /// Add a POST field. Final serialization order is always recomputed, so
    /// insertion order does not matter.
    pub fn post(mut self, key: &str, value: impl IntoParam) -> Self {
        upsert(&mut self.post, key, value.into_param());
        self
    }

    /// Attach an on-disk file. Fails immediately on a missing or unreadable
    /// path, before any network activity.
    pub fn file(mut self, key: &str, path: &Path, mime_type: &str) -> FgResult<Self> {
        let attachment = FileAttachment::from_path(path, mime_type)?;
        self.files.retain(|(k, _)| k != key);
        self.files.push((key.to_string(), attachment));
        Ok(self)
    }

    /// Attach an in-memory buffer as a file part.
    pub fn file_bytes(mut self, key: &str, data: Vec<u8>, file_name: &str, mime_type: &str) -> Self {
        self.files.retain(|(k, _)| k != key);
        self.files
            .push((key.to_string(), FileAttachment::from_bytes(data, file_name, mime_type)));
        self
    }

    /// Set a header explicitly. Last write wins; explicit headers are never
    /// overwritten by the default-header merge.
    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(key));
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    /// Replace the body with raw bytes. When set, all POST fields and file
    /// attachments are ignored at encode time.
    pub fn raw_body(mut self, content_type: &str, payload: Vec<u8>) -> Self {
        self.raw_body = Some((content_type.to_string(), payload));
        self
    }

    /// Gate execution on a logged-in session.
    pub fn auth_required(mut self, required: bool) -> Self {
        self.needs_auth = required;
        self
    }

    /// Run the injected signer over the ordered POST fields before encoding.
    pub fn sign_post(mut self, sign: bool) -> Self {
        self.sign_post = sign;
        self
    }

    /// Toggle the default app headers (on by default).
    pub fn default_headers(mut self, enabled: bool) -> Self {
        self.use_default_headers = enabled;
        self
    }

    /// Resolve relative endpoints against a different API version.
    pub fn version(mut self, version: ApiVersion) -> Self {
        self.version = version;
        self
    }

    /// Build and send the wire request, or return the cached response.
    ///
    /// The first call runs the full pipeline (auth gate, URL assembly,
    /// ordering, signing, encoding, transport) and latches the result; every
    /// later call returns the cached response without network I/O. A failed
    /// attempt does not latch: a retry reassembles and sends the same
    /// request.
    pub async fn execute(&mut self) -> FgResult<&RawResponse> {
        if matches!(self.state, ExecState::Unsent) {
            let response = self.send_once().await?;
            self.state = ExecState::Executed(response);
        }
        match &self.state {
            ExecState::Executed(response) => Ok(response),
            ExecState::Unsent => Err(FgError::Internal("execution latch not set".into())),
        }
    }

    /// Execute (or reuse the cached response) and map into a typed shape.
    pub async fn json<T: DeserializeOwned>(&mut self) -> FgResult<T> {
        let raw = self.execute().await?;
        map_response(raw)
    }

    async fn send_once(&self) -> FgResult<RawResponse> {
        if self.needs_auth && !self.session.is_authenticated() {
            return Err(FgError::AuthRequired);
        }

        let url = self.assemble_url()?;
        let body = self.build_body().await?;
        let method = if body.is_some() {
            reqwest::Method::POST
        } else {
            reqwest::Method::GET
        };
        let headers = self.assemble_headers();

        debug!("{} {}", method, url);
        self.transport
            .execute(WireRequest { method, url, headers, body })
            .await
    }

    /// Endpoint + version base URL, with the ordered query string appended.
    fn assemble_url(&self) -> FgResult<String> {
        let mut url = if self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")
        {
            self.endpoint.clone()
        } else {
            format!("{}{}", self.version.base_url(), self.endpoint.trim_start_matches('/'))
        };

        if !self.query.is_empty() {
            let ordered = ordering::reorder(self.query.clone());
            let query_string = serde_urlencoded::to_string(&ordered)
                .map_err(|e| FgError::Serialization(format!("query encode failed: {e}")))?;
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&query_string);
        }

        Ok(url)
    }

    /// Explicit headers plus the default app headers as non-destructive
    /// fallbacks: two fixed headers and one randomized bandwidth value.
    fn assemble_headers(&self) -> Vec<(String, String)> {
        let mut headers = self.headers.clone();
        if self.use_default_headers {
            let (lo, hi) = constants::BANDWIDTH_KBPS_RANGE;
            let bandwidth = rand::thread_rng().gen_range(lo..=hi).to_string();
            let defaults = [
                (constants::HEADER_CAPABILITIES.0, constants::HEADER_CAPABILITIES.1.to_string()),
                (
                    constants::HEADER_CONNECTION_TYPE.0,
                    constants::HEADER_CONNECTION_TYPE.1.to_string(),
                ),
                (constants::HEADER_BANDWIDTH, bandwidth),
            ];
            for (key, value) in defaults {
                if !headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(key)) {
                    headers.push((key.to_string(), value));
                }
            }
        }
        headers
    }

    /// Order, sign, and encode the POST material into a wire body.
    ///
    /// A raw-body override bypasses fields and files entirely. The builder's
    /// accumulated state is read, not consumed: a transport failure leaves
    /// the fields and attachments in place, so a fresh `execute` on the same
    /// builder assembles the identical wire request. File handles are still
    /// opened per attempt, inside encoding, and consumed into the body.
    async fn build_body(&self) -> FgResult<Option<WireBody>> {
        if let Some((content_type, payload)) = &self.raw_body {
            return Ok(Some(WireBody::Bytes {
                content_type: content_type.clone(),
                payload: payload.clone(),
            }));
        }

        if self.post.is_empty() && self.files.is_empty() {
            return Ok(None);
        }

        let ordered = ordering::reorder(self.post.clone());
        let fields = if self.sign_post && !ordered.is_empty() {
            self.signer.sign(ordered)
        } else {
            ordered
        };

        let encoded = body::encode(fields, self.files.clone()).await?;
        Ok(Some(match encoded {
            EncodedBody::UrlEncoded(buffer) => WireBody::Bytes {
                content_type: constants::FORM_CONTENT_TYPE.to_string(),
                payload: buffer.into_bytes(),
            },
            EncodedBody::Multipart(form) => WireBody::Multipart(form),
        }))
    }
}
