//! Shared, read-only-after-startup state handed to every worker.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::CacheStore;
use crate::config::model::Service;
use crate::services::http_client::UpstreamClient;

pub struct AppState {
    pub services: HashMap<String, Service>,
    pub cache: Option<Arc<dyn CacheStore>>,
    pub cache_default_ttl: Duration,
    pub client: UpstreamClient,
}

impl AppState {
    /// Effective TTL for an endpoint: its own `cache_ttl` if it parses to a
    /// non-zero duration, else the gateway-wide default.
    pub fn effective_ttl(&self, endpoint_cache_ttl: &str) -> Duration {
        crate::utils::ttl::parse_duration_or_default(endpoint_cache_ttl, self.cache_default_ttl)
    }
}
