//! Client-wide constants.
//!
//! Wire-format values here are reproduced from the mobile app's observed
//! traffic; changing them breaks server-side validation.

/// Client name.
pub const CLIENT_NAME: &str = "fotogram";

/// Client version.
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Base URL for v1 API endpoints.
pub const API_BASE_V1: &str = "https://api.fotogram.app/api/v1/";

/// Base URL for v2 API endpoints (upload and media configure).
pub const API_BASE_V2: &str = "https://api.fotogram.app/api/v2/";

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Extended timeout multiplier for media uploads.
pub const EXTENDED_TIMEOUT_MULTIPLIER: u64 = 12;

/// User agent string presented by the emulated app build.
pub const DEFAULT_USER_AGENT: &str =
    "Fotogram 85.0.0.21.100 Android (24/7.0; 380dpi; 1080x1920; Armani; armani; qcom; en_US)";

/// Content type for urlencoded POST bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// Fixed capability header sent with every request unless overridden.
pub const HEADER_CAPABILITIES: (&str, &str) = ("X-FG-Capabilities", "3brTvx8=");

/// Fixed connection-type header sent with every request unless overridden.
pub const HEADER_CONNECTION_TYPE: (&str, &str) = ("X-FG-Connection-Type", "WIFI");

/// Name of the randomized bandwidth-simulation header.
pub const HEADER_BANDWIDTH: &str = "X-FG-Bandwidth-Speed-KBPS";

/// Inclusive range the bandwidth header value is drawn from.
pub const BANDWIDTH_KBPS_RANGE: (u32, u32) = (1_000, 5_000);

/// Minimum number of items in an album upload.
pub const ALBUM_MIN_ITEMS: usize = 2;

/// Maximum number of items in an album upload.
pub const ALBUM_MAX_ITEMS: usize = 10;

/// Maximum retries for the album configure call (attempts = retries + 1).
pub const CONFIGURE_MAX_RETRIES: u32 = 3;

/// Delay between configure retry attempts, in milliseconds.
pub const CONFIGURE_RETRY_DELAY_MS: u64 = 2_000;

/// API error codes the server returns for "not ready yet" conditions.
/// Only these (plus timeouts) are safe to retry on finalize.
pub const TRANSIENT_API_CODES: &[&str] = &["transcode_not_finished", "try_again_later"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bandwidth_range_ordered() {
        assert!(BANDWIDTH_KBPS_RANGE.0 < BANDWIDTH_KBPS_RANGE.1);
    }

    #[test]
    fn test_album_bounds() {
        assert!(ALBUM_MIN_ITEMS >= 2);
        assert!(ALBUM_MAX_ITEMS <= 10);
    }
}
