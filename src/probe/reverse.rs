//! Checks that the push server can reach back to Nextcloud.

use crate::constants::REVERSE_COOKIE_TEST_PATH;
use crate::cookie::Cookie;
use crate::http::HttpGet;

use super::{fetch_and_compare, ProbeResult};

/// Asks the push server to fetch the stored cookie from Nextcloud's API.
///
/// The cookie must already be in the app config store (the queue relay
/// check writes it). A firewall between the push server and Nextcloud shows
/// up here even when every forward request works.
pub fn run(http: &dyn HttpGet, server: &str, cookie: Cookie) -> ProbeResult {
    let url = format!("{}{}", server, REVERSE_COOKIE_TEST_PATH);
    fetch_and_compare(http, &url, cookie.value())
}
