//! The three connectivity probes run by setup.
//!
//! Each probe asks the push server for a value the application already knows
//! and compares the answer:
//!
//! - [`queue_relay`] - the cookie the push server received over Redis
//! - [`mapping`] - a mount count the push server computes from the database
//! - [`reverse`] - the cookie the push server fetched back from Nextcloud
//!
//! A probe always yields exactly one [`ProbeResult`]. Only failures of local
//! collaborators surface as errors.

pub mod mapping;
pub mod queue_relay;
pub mod reverse;

use serde::Serialize;

use crate::constants::MAX_REPORTED_BODY_LEN;
use crate::http::HttpGet;

/// Outcome of a single check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ProbeResult {
    /// The push server returned the expected value.
    Success,
    /// A precondition is missing locally; nothing was sent.
    Unconfigured {
        /// What is missing.
        message: String,
    },
    /// The request to the push server did not complete.
    TransportFailure {
        /// Error reported by the HTTP client.
        message: String,
    },
    /// The push server answered with something other than the expected value.
    MismatchFailure {
        /// Value known locally.
        expected: i64,
        /// Body returned by the push server, trimmed.
        actual: String,
    },
    /// There was nothing to validate against.
    Inconclusive {
        /// Why the check could not run.
        message: String,
    },
}

impl ProbeResult {
    /// Whether the check passed.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Compares a response body against the expected integer.
///
/// A body that does not parse as an integer is a mismatch, never an error.
pub fn compare_body(expected: i64, body: &str) -> ProbeResult {
    let body = body.trim();
    match body.parse::<i64>() {
        Ok(actual) if actual == expected => ProbeResult::Success,
        _ => ProbeResult::MismatchFailure {
            expected,
            actual: body.chars().take(MAX_REPORTED_BODY_LEN).collect(),
        },
    }
}

/// Fetches `url` and compares the body against `expected`.
///
/// No comparison happens when the request fails.
pub fn fetch_and_compare(http: &dyn HttpGet, url: &str, expected: i64) -> ProbeResult {
    match http.get(url) {
        Ok(body) => compare_body(expected, &body),
        Err(err) => {
            log::warn!("Request to {} failed: {}", url, err);
            ProbeResult::TransportFailure {
                message: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use crate::error::{QueueError, TransportError};
    use crate::http::HttpGet;
    use crate::queue::Queue;

    /// Configured queue that remembers what was published.
    #[derive(Debug, Default)]
    pub struct RecordingQueue {
        pub published: RefCell<Vec<(String, i64)>>,
    }

    impl Queue for RecordingQueue {
        fn push(&self, channel: &str, value: i64) -> Result<(), QueueError> {
            self.published.borrow_mut().push((channel.to_string(), value));
            Ok(())
        }

        fn is_configured(&self) -> bool {
            true
        }
    }

    /// Replays canned responses and records requested URLs.
    #[derive(Debug, Default)]
    pub struct ScriptedHttp {
        pub responses: RefCell<VecDeque<Result<String, String>>>,
        pub requests: RefCell<Vec<String>>,
    }

    impl ScriptedHttp {
        pub fn new(responses: Vec<Result<&str, &str>>) -> Self {
            Self {
                responses: RefCell::new(
                    responses
                        .into_iter()
                        .map(|r| r.map(str::to_string).map_err(str::to_string))
                        .collect(),
                ),
                requests: RefCell::default(),
            }
        }
    }

    impl HttpGet for ScriptedHttp {
        fn get(&self, url: &str) -> Result<String, TransportError> {
            self.requests.borrow_mut().push(url.to_string());
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err("no scripted response".to_string()))
                .map_err(TransportError)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::ScriptedHttp;
    use super::*;

    #[test]
    fn test_compare_body_equal() {
        assert_eq!(compare_body(42, "42"), ProbeResult::Success);
        assert_eq!(compare_body(42, " 42\n"), ProbeResult::Success);
    }

    #[test]
    fn test_compare_body_different_integer() {
        assert_eq!(
            compare_body(42, "41"),
            ProbeResult::MismatchFailure {
                expected: 42,
                actual: "41".to_string()
            }
        );
    }

    #[test]
    fn test_compare_body_non_numeric_is_mismatch() {
        let result = compare_body(42, "<html>Bad Gateway</html>");
        assert!(matches!(result, ProbeResult::MismatchFailure { expected: 42, .. }));
        assert!(!result.is_success());
    }

    #[test]
    fn test_compare_body_truncates_long_bodies() {
        let body = "x".repeat(500);
        match compare_body(1, &body) {
            ProbeResult::MismatchFailure { actual, .. } => {
                assert_eq!(actual.len(), MAX_REPORTED_BODY_LEN);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_fetch_and_compare_transport_failure() {
        let http = ScriptedHttp::new(vec![Err("connection refused")]);
        let result = fetch_and_compare(&http, "http://push/cookie_test", 7);
        assert_eq!(
            result,
            ProbeResult::TransportFailure {
                message: "connection refused".to_string()
            }
        );
    }

    #[test]
    fn test_result_serializes_tagged() {
        let json = serde_json::to_value(ProbeResult::MismatchFailure {
            expected: 3,
            actual: "4".to_string(),
        })
        .unwrap();
        assert_eq!(json["result"], "mismatch_failure");
        assert_eq!(json["expected"], 3);
        assert_eq!(json["actual"], "4");
    }
}
