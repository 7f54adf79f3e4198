//! Constants shared by the setup checks.
//!
//! Keys and endpoint paths here form the contract with the push server and
//! the Nextcloud app config; changing any of them breaks the handshake.

use std::time::Duration;

// ============================================================================
// App config
// ============================================================================

/// App id under which every value in the app config store is written.
pub const APP_ID: &str = "notify_push";

/// App config key holding the cookie of the current run.
///
/// The push server reads it back through the Nextcloud API during the
/// reverse connectivity check.
pub const COOKIE_KEY: &str = "cookie";

/// App config key holding the accepted push server URL.
pub const BASE_ENDPOINT_KEY: &str = "base_endpoint";

// ============================================================================
// Queue
// ============================================================================

/// Channel the test cookie is published on.
pub const TEST_COOKIE_CHANNEL: &str = "notify_test_cookie";

// ============================================================================
// Push server endpoints
// ============================================================================

/// Returns the last cookie the push server received over the queue.
pub const COOKIE_TEST_PATH: &str = "/cookie_test";

/// Returns the mount count for a storage id (`/mapping_test/{storage_id}`).
pub const MAPPING_TEST_PATH: &str = "/mapping_test";

/// Makes the push server fetch the cookie from Nextcloud and return it.
pub const REVERSE_COOKIE_TEST_PATH: &str = "/reverse_cookie_test";

// ============================================================================
// Timeouts & limits
// ============================================================================

/// Default HTTP request timeout for calls to the push server.
pub const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound of the cookie range (inclusive), 2^30.
pub const COOKIE_MAX: i64 = 1 << 30;

/// Maximum number of response body characters echoed back in diagnostics.
pub const MAX_REPORTED_BODY_LEN: usize = 64;

/// Default table prefix of a Nextcloud installation.
pub const DEFAULT_TABLE_PREFIX: &str = "oc_";
