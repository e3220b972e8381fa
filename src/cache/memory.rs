//! In-process TTL cache.
//!
//! A plain `HashMap` behind a `RwLock`: reads take the shared lock, writes
//! and evictions take the exclusive lock, matching the reader-writer
//! discipline the spec calls for (and the same `Arc<RwLock<HashMap<_>>>`
//! shape used for shared state elsewhere in this codebase). Stored byte
//! buffers are copied on both `get` and `set` so a caller can never mutate
//! what's sitting in the cache out from under it.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::CacheStore;

struct Entry {
    bytes: Vec<u8>,
    expires_at: Option<Instant>,
}

/// Default TTL applied when a caller passes `ttl <= 0`. Constructed from the
/// gateway's `cache.ttl` setting; `Duration::ZERO` disables storage.
pub struct MemoryCache {
    items: RwLock<HashMap<String, Entry>>,
    default_ttl: Duration,
}

impl MemoryCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, String> {
        let expired = {
            let items = self.items.read().map_err(|_| "cache lock poisoned".to_string())?;
            match items.get(key) {
                None => return Ok(None),
                Some(entry) => match entry.expires_at {
                    Some(exp) if Instant::now() >= exp => true,
                    _ => return Ok(Some(entry.bytes.clone())),
                },
            }
        };

        if expired {
            let mut items = self.items.write().map_err(|_| "cache lock poisoned".to_string())?;
            if let Some(entry) = items.get(key) {
                if matches!(entry.expires_at, Some(exp) if Instant::now() >= exp) {
                    items.remove(key);
                }
            }
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), String> {
        let effective_ttl = if ttl.is_zero() { self.default_ttl } else { ttl };
        if effective_ttl.is_zero() {
            return Ok(());
        }

        let entry = Entry {
            bytes: value.to_vec(),
            expires_at: Some(Instant::now() + effective_ttl),
        };
        let mut items = self.items.write().map_err(|_| "cache lock poisoned".to_string())?;
        items.insert(key.to_string(), entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn miss_on_unknown_key() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        assert_eq!(cache.get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        cache.set("k", b"hello", Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn zero_ttl_uses_default() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        cache.set("k", b"hello", Duration::ZERO).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn zero_default_disables_storage() {
        let cache = MemoryCache::new(Duration::ZERO);
        cache.set("k", b"hello", Duration::ZERO).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_entry_is_a_miss() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        cache.set("k", b"hello", Duration::from_millis(10)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn stored_bytes_are_copied_not_aliased() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        let mut buf = b"hello".to_vec();
        cache.set("k", &buf, Duration::from_secs(60)).await.unwrap();
        buf[0] = b'X';
        assert_eq!(cache.get("k").await.unwrap(), Some(b"hello".to_vec()));
    }
}
