//! Session state boundary.
//!
//! Credential storage and login flows live outside this crate. The engine
//! only needs three facts about the ambient session, consumed through this
//! trait so request execution stays testable without a real account.

use std::sync::RwLock;

use uuid::Uuid;

/// Read-only view of the current session, injected into the client.
pub trait SessionState: Send + Sync {
    /// Whether a login has completed. Auth-gated requests fail fast locally
    /// when this is false; it does not guarantee server-side validity.
    fn is_authenticated(&self) -> bool;

    /// CSRF token captured from the login response cookies.
    fn csrf_token(&self) -> String;

    /// Stable device UUID presented in upload requests.
    fn device_uuid(&self) -> String;
}

/// In-memory session state.
///
/// Suitable for construction before login and for tests; persistent session
/// stores implement [`SessionState`] themselves.
pub struct MemorySession {
    authenticated: RwLock<bool>,
    csrf_token: RwLock<String>,
    device_uuid: String,
}

impl MemorySession {
    /// Create a logged-out session with a fresh random device UUID.
    pub fn new() -> Self {
        Self {
            authenticated: RwLock::new(false),
            csrf_token: RwLock::new(String::new()),
            device_uuid: Uuid::new_v4().to_string(),
        }
    }

    /// Create a logged-in session with the given token, for tests and
    /// for callers restoring a persisted login.
    pub fn logged_in(csrf_token: &str) -> Self {
        Self {
            authenticated: RwLock::new(true),
            csrf_token: RwLock::new(csrf_token.to_string()),
            device_uuid: Uuid::new_v4().to_string(),
        }
    }

    /// Record a completed login.
    pub fn set_logged_in(&self, csrf_token: &str) {
        *self.authenticated.write().expect("session lock poisoned") = true;
        *self.csrf_token.write().expect("session lock poisoned") = csrf_token.to_string();
    }

    /// Clear the login state.
    pub fn set_logged_out(&self) {
        *self.authenticated.write().expect("session lock poisoned") = false;
        self.csrf_token.write().expect("session lock poisoned").clear();
    }
}

impl Default for MemorySession {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState for MemorySession {
    fn is_authenticated(&self) -> bool {
        *self.authenticated.read().expect("session lock poisoned")
    }

    fn csrf_token(&self) -> String {
        self.csrf_token.read().expect("session lock poisoned").clone()
    }

    fn device_uuid(&self) -> String {
        self.device_uuid.clone()
    }
}
