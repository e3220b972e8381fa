//! Upstream HTTP client.
//!
//! One operation: send a request to a named service and come back with the
//! body bytes and status, or a typed [`GatewayError`]. Used identically by
//! the proxy and aggregation handlers, which is why the header allow-list
//! lives here as a single shared constant rather than being duplicated at
//! each call site.

use std::time::Duration;

use log::debug;
use reqwest::{Client, Method};

use crate::config::model::Service;
use crate::models::error::GatewayError;
use crate::utils::path::path_join;
use crate::utils::ttl::parse_duration_or_default;

/// Headers forwarded to upstream services by both the proxy and aggregation
/// paths. Anything else present on the inbound request is dropped.
pub const FORWARDED_HEADERS: &[&str] = &[
    "authorization",
    "x-request-id",
    "accept",
    "content-type",
    "user-agent",
    "x-forwarded-for",
    "x-real-ip",
];

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Response of an upstream call: headers are preserved in raw (name, value)
/// pairs so the proxy handler can copy them through byte-for-byte.
pub struct UpstreamResponse {
    pub status: u16,
    pub headers: Vec<(String, Vec<u8>)>,
    pub body: Vec<u8>,
}

/// Thin wrapper over a shared `reqwest::Client`. One instance is built at
/// startup and handed to both handlers via `web::Data`.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
}

impl UpstreamClient {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }

    /// Issues a request to `service`, at `resolved_path` with `raw_query`,
    /// forwarding `headers` (already filtered to the allow-list) and an
    /// optional body. `method` empty defaults to `GET`.
    pub async fn call(
        &self,
        service: &Service,
        method: &str,
        resolved_path: &str,
        raw_query: &str,
        headers: &[(String, String)],
        body: Option<Vec<u8>>,
    ) -> Result<UpstreamResponse, GatewayError> {
        let timeout = parse_duration_or_default(&service.timeout, DEFAULT_TIMEOUT);
        let url = build_url(&service.proxy_url, resolved_path, raw_query)?;

        let method = if method.trim().is_empty() { "GET" } else { method };
        let reqwest_method = Method::from_bytes(method.as_bytes())
            .map_err(|e| GatewayError::Config(format!("invalid method {method}: {e}")))?;

        debug!("upstream call {method} {url}");

        let mut builder = self.client.request(reqwest_method, url).timeout(timeout);
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| (name.to_string(), value.as_bytes().to_vec()))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?
            .to_vec();

        Ok(UpstreamResponse { status, headers, body })
    }
}

impl Default for UpstreamClient {
    fn default() -> Self {
        Self::new()
    }
}

fn build_url(proxy_url: &str, resolved_path: &str, raw_query: &str) -> Result<String, GatewayError> {
    let base = if proxy_url.contains("://") {
        proxy_url.to_string()
    } else {
        format!("http://{proxy_url}")
    };

    let parsed = reqwest::Url::parse(&base)
        .map_err(|e| GatewayError::Config(format!("invalid proxy_url {proxy_url}: {e}")))?;

    let joined_path = path_join(parsed.path(), resolved_path);
    let mut url = parsed;
    url.set_path(&joined_path);
    url.set_query(if raw_query.is_empty() { None } else { Some(raw_query) });

    Ok(url.to_string())
}

/// Filters an inbound header set down to [`FORWARDED_HEADERS`], preserving
/// the original casing of values but matching names case-insensitively.
pub fn filter_forwarded_headers<'a, I>(headers: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    headers
        .into_iter()
        .filter(|(name, _)| {
            let lower = name.to_ascii_lowercase();
            FORWARDED_HEADERS.contains(&lower.as_str())
        })
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}
