//! TTL key-value backends.

use crate::error::RevocationError;
use async_trait::async_trait;
use redis::AsyncCommands;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// Trait for TTL-capable key-value backends.
///
/// Entries expire on their own after `ttl`; there is no delete operation
/// because the token core never un-revokes.
#[async_trait]
pub trait TtlStore: Send + Sync {
    /// Store `value` under `key`, evicted automatically after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), RevocationError>;

    /// Fetch the value under `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, RevocationError>;
}

/// Redis-backed store. The client is constructed by the process entry point
/// and injected; this type never owns connection lifecycle beyond
/// per-operation multiplexed handles.
pub struct RedisTtlStore {
    client: Arc<redis::Client>,
    op_timeout: Duration,
}

impl RedisTtlStore {
    pub fn new(client: Arc<redis::Client>, op_timeout: Duration) -> Self {
        Self { client, op_timeout }
    }

    async fn connection(
        &self,
    ) -> Result<redis::aio::MultiplexedConnection, RevocationError> {
        let connect = self.client.get_multiplexed_async_connection();
        tokio::time::timeout(self.op_timeout, connect)
            .await
            .map_err(|_| RevocationError::Unavailable("connect timed out".to_string()))?
            .map_err(|e| RevocationError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl TtlStore for RedisTtlStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), RevocationError> {
        let mut conn = self.connection().await?;
        // SET EX rounds sub-second TTLs up so a record never expires early.
        let seconds = ttl.as_secs().max(1);
        let op = async {
            let _: () = conn.set_ex(key, value, seconds).await?;
            Ok::<_, redis::RedisError>(())
        };
        tokio::time::timeout(self.op_timeout, op)
            .await
            .map_err(|_| RevocationError::Unavailable("set timed out".to_string()))?
            .map_err(|e| RevocationError::Unavailable(e.to_string()))
    }

    async fn get(&self, key: &str) -> Result<Option<String>, RevocationError> {
        let mut conn = self.connection().await?;
        let op = conn.get::<_, Option<String>>(key);
        tokio::time::timeout(self.op_timeout, op)
            .await
            .map_err(|_| RevocationError::Unavailable("get timed out".to_string()))?
            .map_err(|e| RevocationError::Unavailable(e.to_string()))
    }
}

/// In-memory store for tests and single-process development.
#[derive(Default)]
pub struct MemoryTtlStore {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl MemoryTtlStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TtlStore for MemoryTtlStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), RevocationError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| RevocationError::Unavailable(e.to_string()))?;
        entries.insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, RevocationError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| RevocationError::Unavailable(e.to_string()))?;
        match entries.get(key) {
            Some((_, deadline)) if *deadline <= Instant::now() => {
                entries.remove(key);
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value.clone())),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_set_get() {
        let store = MemoryTtlStore::new();
        store
            .set("k", "v", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn memory_store_expires_entries() {
        let store = MemoryTtlStore::new();
        store.set("k", "v", Duration::from_millis(10)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}
