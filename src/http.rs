//! HTTP access to the push server.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::TransportError;

/// Blocking `GET` returning the response body.
///
/// Connection failures, DNS failures and non-2xx statuses are all
/// [`TransportError`]s.
pub trait HttpGet: std::fmt::Debug {
    /// Fetches `url` and returns its body as text.
    fn get(&self, url: &str) -> Result<String, TransportError>;
}

/// [`HttpGet`] backed by a reqwest blocking client.
#[derive(Debug, Clone)]
pub struct ReqwestHttp {
    client: Client,
}

impl ReqwestHttp {
    /// Creates a client whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl HttpGet for ReqwestHttp {
    fn get(&self, url: &str) -> Result<String, TransportError> {
        log::debug!("GET {}", url);
        let response = self.client.get(url).send()?.error_for_status()?;
        let body = response.text()?;
        log::debug!("GET {} -> {:?}", url, body);
        Ok(body)
    }
}
