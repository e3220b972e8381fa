//! Response cache abstraction and adapters.
//!
//! Handlers only ever see a `dyn CacheStore`; the in-memory and remote
//! (Redis) adapters are interchangeable behind it, selected once at startup
//! from `cache.driver`. Cache failures are always non-fatal to the request
//! path: a `get` error is surfaced so the caller can treat it as a miss
//! (never silently promoted to a hit), and a `set` error is logged and
//! dropped — caching must never mask a successful upstream response.

pub mod memory;
pub mod remote;

use async_trait::async_trait;
use std::time::Duration;

/// Uniform get/set-with-TTL interface consumed by the proxy and aggregation
/// handlers.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the stored bytes for `key`, or `Ok(None)` on a clean miss.
    /// A backend error is returned as `Err` rather than folded into a miss,
    /// so the two logical failure modes are never conflated.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, String>;

    /// Stores `value` under `key`. `ttl <= 0` means "use the adapter's
    /// configured default"; a zero default disables storage entirely.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), String>;
}

/// Builds the cache key the spec mandates: `METHOD:original-target`, with no
/// normalization of query order.
pub fn cache_key(method: &str, original_target: &str) -> String {
    format!("{method}:{original_target}")
}
