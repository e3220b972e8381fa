//! Redis-backed cache adapter.
//!
//! Thin translation over an async `redis` connection: a missing key (`nil`
//! reply) becomes a clean miss rather than an error, and writes use `SET ...
//! EX` so the TTL is enforced by Redis itself.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use super::CacheStore;
use crate::config::model::CacheConfig;
use crate::models::error::GatewayError;

pub struct RedisCache {
    client: redis::Client,
    default_ttl: Duration,
}

impl RedisCache {
    /// Connects eagerly (a connection failure here is a bootstrap failure,
    /// not a per-request one) and validates reachability with a `PING`.
    pub async fn connect(cfg: &CacheConfig, default_ttl: Duration) -> Result<Self, GatewayError> {
        let url = build_redis_url(cfg);
        let client = redis::Client::open(url.as_str())
            .map_err(|e| GatewayError::Config(format!("invalid redis address {url}: {e}")))?;

        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| GatewayError::Config(format!("connect redis {url}: {e}")))?;
        let _: () = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| GatewayError::Config(format!("ping redis {url}: {e}")))?;

        Ok(Self { client, default_ttl })
    }
}

fn build_redis_url(cfg: &CacheConfig) -> String {
    if cfg.password.is_empty() {
        format!("redis://{}:{}/{}", cfg.host, cfg.port, cfg.db)
    } else {
        format!("redis://:{}@{}:{}/{}", cfg.password, cfg.host, cfg.port, cfg.db)
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, String> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| e.to_string())?;
        let value: Option<Vec<u8>> = conn.get(key).await.map_err(|e| e.to_string())?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), String> {
        let effective_ttl = if ttl.is_zero() { self.default_ttl } else { ttl };
        if effective_ttl.is_zero() {
            return Ok(());
        }

        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| e.to_string())?;
        let _: () = conn
            .set_ex(key, value, effective_ttl.as_secs().max(1))
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}
