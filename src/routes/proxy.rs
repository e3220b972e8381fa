//! Proxy handler: single-upstream pass-through with caching.
//!
//! **Cache asymmetry (intentional).** Unlike the aggregation path, a cache
//! hit here replays only the previously stored body bytes, with no status
//! code or headers attached (so a hit always reports 200 with whatever
//! headers Actix applies by default). This mirrors the upstream system this
//! gateway's behavior is grounded on and is preserved deliberately rather
//! than "fixed," since generalizing it would change cache-hit response shape
//! for existing deployments in a way nothing here tests for.

use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, info, warn};

use crate::cache::cache_key;
use crate::config::model::Endpoint;
use crate::context::{log_prefix, request_id};
use crate::models::error::GatewayError;
use crate::routes::state::AppState;
use crate::services::http_client::filter_forwarded_headers;

pub async fn handle(req: HttpRequest, body: web::Bytes, endpoint: Arc<Endpoint>, state: Arc<AppState>) -> HttpResponse {
    let rid = request_id(&req);
    let prefix = log_prefix(&rid);

    let backend = match &endpoint.backend {
        Some(b) => b,
        None => return HttpResponse::InternalServerError().body("backend not configured"),
    };

    let ttl = state.effective_ttl(&endpoint.cache_ttl);
    let original_target = req.uri().to_string();
    let key = cache_key(req.method().as_str(), &original_target);

    if let Some(cache) = &state.cache {
        if !ttl.is_zero() {
            match cache.get(&key).await {
                Ok(Some(bytes)) => {
                    debug!("{prefix} cache hit key={key} path={}", req.path());
                    return HttpResponse::Ok().body(bytes);
                }
                Ok(None) => {}
                Err(e) => warn!("{prefix} cache get error: {e}"),
            }
        }
    }

    let service = match state.services.get(&backend.service) {
        Some(s) => s,
        None => return HttpResponse::BadGateway().body("unknown backend service"),
    };

    let transport = service.transport.trim().to_ascii_lowercase();
    if transport == "grpc" {
        info!("{prefix} grpc transport for service={} not implemented yet", service.name);
        return HttpResponse::NotImplemented().body("gRPC transport not implemented yet");
    }

    let method = if backend.method.trim().is_empty() {
        req.method().as_str().to_string()
    } else {
        backend.method.clone()
    };
    let raw_query = req.uri().query().unwrap_or("").to_string();

    let headers = filter_forwarded_headers(req.headers().iter().filter_map(|(n, v)| {
        v.to_str().ok().map(|s| (n.as_str(), s))
    }));

    let call_body = if body.is_empty() { None } else { Some(body.to_vec()) };

    debug!("{prefix} call svc={} method={method} path={}", service.name, backend.path);
    let response = state
        .client
        .call(service, &method, &backend.path, &raw_query, &headers, call_body)
        .await;

    let upstream = match response {
        Ok(r) => r,
        Err(e) => return <GatewayError as actix_web::error::ResponseError>::error_response(&e),
    };

    let mut builder = HttpResponse::build(
        actix_web::http::StatusCode::from_u16(upstream.status).unwrap_or(actix_web::http::StatusCode::BAD_GATEWAY),
    );
    for (name, value) in &upstream.headers {
        if let Ok(header_value) = actix_web::http::header::HeaderValue::from_bytes(value) {
            builder.insert_header((name.as_str(), header_value));
        }
    }

    if let Some(cache) = &state.cache {
        if !ttl.is_zero() && upstream.status < 500 {
            if let Err(e) = cache.set(&key, &upstream.body, ttl).await {
                warn!("{prefix} cache set error: {e}");
            }
        }
    }

    builder.body(upstream.body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::MemoryCache;
    use crate::config::model::Backend;
    use crate::services::http_client::UpstreamClient;
    use actix_web::test::TestRequest;
    use std::collections::HashMap;
    use std::time::Duration;

    fn state_without_cache() -> Arc<AppState> {
        Arc::new(AppState {
            services: HashMap::new(),
            cache: None,
            cache_default_ttl: Duration::from_secs(60),
            client: UpstreamClient::new(),
        })
    }

    #[actix_web::test]
    async fn missing_backend_is_a_500() {
        let endpoint = Arc::new(Endpoint { path: "/x".into(), ..Default::default() });
        let req = TestRequest::default().to_http_request();
        let resp = handle(req, web::Bytes::new(), endpoint, state_without_cache()).await;
        assert_eq!(resp.status(), 500);
    }

    #[actix_web::test]
    async fn unknown_service_is_a_502() {
        let endpoint = Arc::new(Endpoint {
            path: "/x".into(),
            backend: Some(Backend { service: "nope".into(), path: "/".into(), method: String::new() }),
            ..Default::default()
        });
        let req = TestRequest::default().to_http_request();
        let resp = handle(req, web::Bytes::new(), endpoint, state_without_cache()).await;
        assert_eq!(resp.status(), 502);
    }

    #[actix_web::test]
    async fn grpc_transport_is_a_501() {
        let mut services = HashMap::new();
        services.insert(
            "svc".to_string(),
            crate::config::model::Service {
                name: "svc".into(),
                proxy_url: "http://example.com".into(),
                timeout: String::new(),
                transport: "grpc".into(),
            },
        );
        let state = Arc::new(AppState {
            services,
            cache: None,
            cache_default_ttl: Duration::from_secs(60),
            client: UpstreamClient::new(),
        });
        let endpoint = Arc::new(Endpoint {
            path: "/x".into(),
            backend: Some(Backend { service: "svc".into(), path: "/".into(), method: String::new() }),
            ..Default::default()
        });
        let req = TestRequest::default().to_http_request();
        let resp = handle(req, web::Bytes::new(), endpoint, state).await;
        assert_eq!(resp.status(), 501);
    }

    #[actix_web::test]
    async fn cache_hit_short_circuits_before_resolving_service() {
        let cache = Arc::new(MemoryCache::new(Duration::from_secs(60)));
        cache.set("GET:/ping", b"cached-body", Duration::from_secs(60)).await.unwrap();

        let state = Arc::new(AppState {
            services: HashMap::new(),
            cache: Some(cache as Arc<dyn crate::cache::CacheStore>),
            cache_default_ttl: Duration::from_secs(60),
            client: UpstreamClient::new(),
        });
        let endpoint = Arc::new(Endpoint {
            path: "/ping".into(),
            backend: Some(Backend { service: "unresolved".into(), path: "/".into(), method: String::new() }),
            cache_ttl: "60s".into(),
            ..Default::default()
        });
        let req = TestRequest::with_uri("/ping").to_http_request();
        let resp = handle(req, web::Bytes::new(), endpoint, state).await;
        assert_eq!(resp.status(), 200);
    }
}
