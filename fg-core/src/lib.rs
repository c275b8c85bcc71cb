//! Fotogram Core - Foundation types, error handling, configuration, and logging.
//!
//! This crate provides the shared foundation used by the fotogram client crates:
//! - Client configuration (API version, user agent, timeouts)
//! - Global error types covering all error categories
//! - Structured logging with tracing
//! - Wire-format and workflow constants

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;

// Re-export commonly used items at the crate root
pub use config::ClientConfig;
pub use error::{FgError, FgResult};
pub use logging::init_logging;
