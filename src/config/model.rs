//! Configuration data model.
//!
//! These types mirror the YAML document shape described by the gateway's
//! configuration contract. They are intentionally permissive (most fields are
//! `Option`/default-driven) because validation and normalization happen in
//! [`crate::config::loader`] and [`crate::routes::registry`] rather than at
//! deserialization time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Top-level document as it appears on disk (and in each included file).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
    #[serde(default)]
    pub includes: Vec<String>,
}

fn default_version() -> String {
    "v1".to_string()
}

/// Partial document contributed by an `includes` glob match: only
/// `services`/`endpoints` are recognized from included files.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncludedConfig {
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub address: String,
    #[serde(default = "default_read_timeout")]
    pub read_timeout_sec: u64,
    #[serde(default = "default_write_timeout")]
    pub write_timeout_sec: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_sec: u64,
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_sec: u64,
}

fn default_read_timeout() -> u64 {
    15
}
fn default_write_timeout() -> u64 {
    15
}
fn default_idle_timeout() -> u64 {
    60
}
fn default_shutdown_timeout() -> u64 {
    15
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            read_timeout_sec: default_read_timeout(),
            write_timeout_sec: default_write_timeout(),
            idle_timeout_sec: default_idle_timeout(),
            shutdown_timeout_sec: default_shutdown_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_driver")]
    pub driver: String,
    #[serde(default = "default_cache_host")]
    pub host: String,
    #[serde(default = "default_cache_port")]
    pub port: u16,
    #[serde(default)]
    pub db: i64,
    #[serde(default)]
    pub password: String,
    /// Gateway-wide default TTL, as a duration string (`"60s"`) or integer seconds.
    #[serde(default)]
    pub ttl: String,
}

fn default_cache_driver() -> String {
    "memory".to_string()
}
fn default_cache_host() -> String {
    "localhost".to_string()
}
fn default_cache_port() -> u16 {
    6379
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Service {
    pub name: String,
    pub proxy_url: String,
    #[serde(default)]
    pub timeout: String,
    #[serde(default)]
    pub transport: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Endpoint {
    pub path: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub backend: Option<Backend>,
    #[serde(default)]
    pub calls: Vec<AggCall>,
    #[serde(default)]
    pub response_mapping: HashMap<String, String>,
    #[serde(default)]
    pub auth_required: bool,
    #[serde(default)]
    pub fail_on_error: Option<bool>,
    #[serde(default)]
    pub cache_ttl: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Backend {
    pub service: String,
    pub path: String,
    #[serde(default)]
    pub method: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AggCall {
    pub name: String,
    pub service: String,
    pub path: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub mapping: HashMap<String, String>,
}

/// Routing table assembled from a [`RawConfig`] plus any expanded includes.
///
/// This is the immutable view handed to the route registry; it never changes
/// after startup.
#[derive(Debug, Clone, Serialize)]
pub struct FinalConfig {
    pub gateway: GatewayConfig,
    pub cache: CacheConfig,
    pub services: Vec<Service>,
    pub endpoints: Vec<Endpoint>,
}
