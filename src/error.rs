//! Error types for the setup checks.
//!
//! Remote misbehaviour is never an error here: it is reported as a
//! [`ProbeResult`](crate::probe::ProbeResult). These types cover the local
//! collaborators (queue, database) and the raw transport layer.

use thiserror::Error;

/// The HTTP request to the push server did not complete with a 2xx response.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self(err.to_string())
    }
}

/// Publishing to the queue failed.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Redis rejected the connection or the command.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    /// The message could not be encoded.
    #[error("failed to encode queue message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Reading from or writing to the Nextcloud database failed.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite returned an error.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A poisoned lock guarded an in-memory store.
    #[error("store lock poisoned")]
    Poisoned,
}

/// A local collaborator failed while a setup run was in progress.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The test cookie could not be published.
    #[error("failed to publish test cookie")]
    Queue(#[from] QueueError),
    /// The app config store or metadata query failed.
    #[error("failed to access the Nextcloud database")]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_setup_error_keeps_source() {
        let err = SetupError::from(StoreError::Poisoned);
        assert_eq!(err.to_string(), "failed to access the Nextcloud database");
        assert_eq!(
            err.source().map(ToString::to_string).as_deref(),
            Some("store lock poisoned")
        );
    }

    #[test]
    fn test_transport_error_displays_message() {
        let err = TransportError("connection refused".to_string());
        assert_eq!(err.to_string(), "connection refused");
    }
}
