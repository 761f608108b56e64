//! Redis Backend Module
//!
//! Production backend speaking the Redis protocol through the `redis` crate.

use std::time::Duration;

use redis::{Client, Commands, Connection};

use crate::error::{CacheError, Result};

use super::Backend;

/// Smallest timeout accepted by socket options; zero means "block forever".
const MIN_TIMEOUT: Duration = Duration::from_millis(1);

// == Redis Backend ==
/// Redis-backed store.
///
/// The `Client` is shared and thread-safe; a connection is opened per call,
/// bounded by `connect_timeout`, with `operation_timeout` on reads and writes.
/// A dead server therefore costs one bounded attempt and nothing is kept
/// around to go stale.
pub struct RedisBackend {
    client: Client,
    connect_timeout: Duration,
    operation_timeout: Duration,
}

impl RedisBackend {
    // == Constructor ==
    /// Parses `url` and prepares a client. Does not connect.
    pub fn open(url: &str, connect_timeout: Duration, operation_timeout: Duration) -> Result<Self> {
        let client = Client::open(url)
            .map_err(|e| CacheError::InvalidConfig(format!("invalid store URL '{}': {}", url, e)))?;

        Ok(Self {
            client,
            connect_timeout: connect_timeout.max(MIN_TIMEOUT),
            operation_timeout: operation_timeout.max(MIN_TIMEOUT),
        })
    }

    fn connection(&self) -> Result<Connection> {
        let conn = self.client.get_connection_with_timeout(self.connect_timeout)?;
        conn.set_read_timeout(Some(self.operation_timeout))?;
        conn.set_write_timeout(Some(self.operation_timeout))?;
        Ok(conn)
    }
}

impl Backend for RedisBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection()?;
        let value: Option<String> = conn.get(key)?;
        Ok(value)
    }

    fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        let mut conn = self.connection()?;
        let _: () = conn.set_ex(key, value, ttl_seconds)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection()?;
        let removed: i64 = conn.del(key)?;
        Ok(removed > 0)
    }

    fn ping(&self) -> Result<()> {
        let mut conn = self.connection()?;
        let _: String = redis::cmd("PING").query(&mut conn)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
