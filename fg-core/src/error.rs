//! Global error types for the fotogram client.
//!
//! All error categories across the client are unified into a single
//! `FgError` enum with conversions from underlying library errors.

use thiserror::Error;

use crate::constants;

/// Convenience type alias for Results using FgError.
pub type FgResult<T> = Result<T, FgError>;

/// Unified error type covering all error categories in the client.
#[derive(Error, Debug)]
pub enum FgError {
    // -- Configuration errors --
    /// Failed to load or parse client configuration.
    #[error("configuration error: {0}")]
    Config(String),

    // -- Usage errors --
    /// The caller violated the API contract (missing file, invalid item
    /// type/count). Raised before any I/O, never retried.
    #[error("usage error: {0}")]
    Usage(String),

    /// An auth-gated request was attempted without a logged-in session.
    #[error("authentication required: not logged in")]
    AuthRequired,

    // -- Network errors --
    /// HTTP request failed at the transport level.
    #[error("http error: {0}")]
    Http(String),

    /// HTTP request timed out.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// The server answered but the payload reported a failure.
    #[error("api error ({code}): {message}")]
    Api {
        /// Remote error code identifier.
        code: String,
        /// Remote error message.
        message: String,
    },

    /// A retried operation exhausted its retry budget.
    #[error("retries exhausted after {attempts} attempts")]
    RetriesExhausted {
        /// Total attempts performed, including the first.
        attempts: u32,
    },

    // -- File/IO errors --
    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    // -- Generic --
    /// An unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),

    /// Wrapping anyhow errors for interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FgError {
    /// Whether this error belongs to the transient failure class that the
    /// finalize step of a multi-step upload may retry.
    ///
    /// Timeouts and a fixed set of "not ready yet" API codes are transient;
    /// usage, auth, and other API errors are permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            FgError::Timeout(_) => true,
            FgError::Api { code, .. } => constants::TRANSIENT_API_CODES
                .iter()
                .any(|c| c == code),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for FgError {
    fn from(e: serde_json::Error) -> Self {
        FgError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for FgError {
    fn from(e: toml::de::Error) -> Self {
        FgError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fg_error_display() {
        let err = FgError::Api {
            code: "login_required".into(),
            message: "login required".into(),
        };
        assert_eq!(err.to_string(), "api error (login_required): login required");
    }

    #[test]
    fn test_transient_classification() {
        assert!(FgError::Timeout("read timed out".into()).is_transient());
        assert!(FgError::Api {
            code: "transcode_not_finished".into(),
            message: "Transcode not finished yet.".into(),
        }
        .is_transient());
        assert!(!FgError::Api {
            code: "login_required".into(),
            message: "login required".into(),
        }
        .is_transient());
        assert!(!FgError::Usage("bad item".into()).is_transient());
        assert!(!FgError::AuthRequired.is_transient());
    }
}
