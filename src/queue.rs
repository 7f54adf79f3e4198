//! Queue backends the push server listens on.
//!
//! The push server subscribes to Redis pub/sub channels. Setup only needs to
//! publish a single message, but it must also know whether a real backend
//! exists at all, which every implementation answers via
//! [`Queue::is_configured`].

use redis::Commands;

use crate::error::QueueError;

/// A message queue the application writes push signals into.
pub trait Queue: std::fmt::Debug {
    /// Publishes `value` on `channel`.
    fn push(&self, channel: &str, value: i64) -> Result<(), QueueError>;

    /// Whether messages actually leave this process.
    ///
    /// `false` for stand-in backends; setup refuses to run against those.
    fn is_configured(&self) -> bool;
}

/// Redis pub/sub backend.
#[derive(Debug, Clone)]
pub struct RedisQueue {
    client: redis::Client,
}

impl RedisQueue {
    /// Creates a queue for the given Redis URL (e.g. `redis://127.0.0.1/`).
    ///
    /// Only the URL is validated here; the connection is opened per push.
    pub fn new(url: &str) -> Result<Self, QueueError> {
        Ok(Self {
            client: redis::Client::open(url)?,
        })
    }
}

impl Queue for RedisQueue {
    fn push(&self, channel: &str, value: i64) -> Result<(), QueueError> {
        // The push server decodes every message as JSON.
        let payload = serde_json::to_string(&value)?;
        let mut conn = self.client.get_connection()?;
        let receivers: i64 = conn.publish(channel, payload)?;
        log::debug!("Published to {} ({} subscribers)", channel, receivers);
        Ok(())
    }

    fn is_configured(&self) -> bool {
        true
    }
}

/// Backend used when no Redis is configured. Drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullQueue;

impl Queue for NullQueue {
    fn push(&self, channel: &str, _value: i64) -> Result<(), QueueError> {
        log::debug!("Dropping message for {} (no queue configured)", channel);
        Ok(())
    }

    fn is_configured(&self) -> bool {
        false
    }
}

/// Picks the backend for an optional Redis URL.
pub fn from_url(redis_url: Option<&str>) -> Result<Box<dyn Queue>, QueueError> {
    match redis_url {
        Some(url) if !url.trim().is_empty() => Ok(Box::new(RedisQueue::new(url.trim())?)),
        _ => Ok(Box::new(NullQueue)),
    }
}
