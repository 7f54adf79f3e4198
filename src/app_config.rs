//! Key-value app configuration shared with the push server.
//!
//! Setup uses it as a side channel: the cookie is stashed here for the push
//! server's callback, and the accepted endpoint is saved here on success.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::StoreError;

/// Per-app key-value configuration (Nextcloud's `appconfig`).
pub trait AppConfigStore: std::fmt::Debug {
    /// Stores `value` under `app`/`key`, replacing any previous value.
    fn set_value(&self, app: &str, key: &str, value: &str) -> Result<(), StoreError>;

    /// Reads the value under `app`/`key`.
    fn get_value(&self, app: &str, key: &str) -> Result<Option<String>, StoreError>;
}

/// In-process store, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryAppConfig {
    values: Mutex<HashMap<(String, String), String>>,
}

impl MemoryAppConfig {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AppConfigStore for MemoryAppConfig {
    fn set_value(&self, app: &str, key: &str, value: &str) -> Result<(), StoreError> {
        self.values
            .lock()
            .map_err(|_poisoned| StoreError::Poisoned)?
            .insert((app.to_string(), key.to_string()), value.to_string());
        Ok(())
    }

    fn get_value(&self, app: &str, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().map_err(|_poisoned| StoreError::Poisoned)?;
        Ok(values.get(&(app.to_string(), key.to_string())).cloned())
    }
}
