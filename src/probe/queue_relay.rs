//! Checks that the push server reads the Redis channel the application
//! writes to.

use crate::app_config::AppConfigStore;
use crate::constants::{APP_ID, COOKIE_KEY, COOKIE_TEST_PATH, TEST_COOKIE_CHANNEL};
use crate::cookie::Cookie;
use crate::error::SetupError;
use crate::http::HttpGet;
use crate::queue::Queue;

use super::{fetch_and_compare, ProbeResult};

/// Publishes `cookie`, stores it in the app config and asks the push server
/// which cookie it last received.
///
/// The push server may consume the published message or expose the stored
/// value; either way its answer must equal `cookie`. A Redis that rejects the
/// publish is a configuration problem and ends the check before any request.
pub fn run(
    queue: &dyn Queue,
    config: &dyn AppConfigStore,
    http: &dyn HttpGet,
    server: &str,
    cookie: Cookie,
) -> Result<ProbeResult, SetupError> {
    if let Err(err) = queue.push(TEST_COOKIE_CHANNEL, cookie.value()) {
        log::warn!("Publishing test cookie failed: {}", err);
        return Ok(ProbeResult::Unconfigured {
            message: format!("can't publish to redis: {}", err),
        });
    }
    config.set_value(APP_ID, COOKIE_KEY, &cookie.to_string())?;

    let url = format!("{}{}", server, COOKIE_TEST_PATH);
    Ok(fetch_and_compare(http, &url, cookie.value()))
}
