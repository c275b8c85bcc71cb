//! Typed response mapping.
//!
//! Every fotogram payload carries a `status` discriminant. A failing payload
//! becomes a structured API error with the remote code and message instead of
//! a partially populated object. Unknown payload fields are tolerated so
//! server-side additions do not break deserialization.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use fg_core::error::{FgError, FgResult};

use crate::transport::RawResponse;

/// Status discriminant value the server uses for success payloads.
pub const STATUS_OK: &str = "ok";

/// Status discriminant value the server uses for failure payloads.
pub const STATUS_FAIL: &str = "fail";

/// Minimal probe of the envelope, deserialized before the target shape.
#[derive(Debug, Deserialize)]
struct StatusProbe {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_type: Option<String>,
}

/// Map a raw response into the target shape.
///
/// A `"fail"` status short-circuits into [`FgError::Api`] carrying the remote
/// error code and message. Responses that are not JSON at all surface the
/// HTTP status when it is an error, otherwise a serialization error.
pub fn map_response<T: DeserializeOwned>(raw: &RawResponse) -> FgResult<T> {
    let probe: StatusProbe = match serde_json::from_slice(&raw.body) {
        Ok(probe) => probe,
        Err(e) => {
            if raw.status >= 400 {
                return Err(FgError::Http(format!(
                    "server returned status {} with non-JSON body",
                    raw.status
                )));
            }
            return Err(FgError::Serialization(format!("invalid response payload: {e}")));
        }
    };

    if probe.status.as_deref() == Some(STATUS_FAIL) {
        return Err(FgError::Api {
            code: probe.error_type.unwrap_or_else(|| "unknown".to_string()),
            message: probe.message.unwrap_or_default(),
        });
    }

    serde_json::from_slice(&raw.body)
        .map_err(|e| FgError::Serialization(format!("response shape mismatch: {e}")))
}

/// Envelope shared by responses that carry nothing beyond the discriminant.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    /// Success/failure discriminant ("ok" on success).
    pub status: String,
}

impl StatusResponse {
    /// Whether the payload reported success.
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}
