//! Route registry: turns the resolved configuration into live Actix routes.

use std::sync::Arc;

use actix_web::{web, HttpRequest};
use log::{info, warn};

use crate::config::model::FinalConfig;
use crate::routes::state::AppState;
use crate::routes::{aggregate, debug, health, proxy};

/// Registers `/health`, the dev-only `/debug/config`, and every configured
/// endpoint against `service_cfg`. Dispatches to [`proxy::handle`] when an
/// endpoint declares a single `backend`, or [`aggregate::handle`] when it
/// declares `calls`; endpoints with neither are skipped with a warning, as
/// are endpoints whose method this gateway doesn't support.
pub fn configure(service_cfg: &mut web::ServiceConfig, config: &FinalConfig, state: Arc<AppState>) {
    service_cfg.route("/health", web::get().to(health::health));

    if is_dev_env() {
        service_cfg.app_data(web::Data::new(Arc::new(config.clone())));
        service_cfg.route("/debug/config", web::get().to(debug::debug_config));
    }

    for endpoint in &config.endpoints {
        if endpoint.backend.is_none() && endpoint.calls.is_empty() {
            warn!("endpoint {} {} has neither backend nor calls, skipping", endpoint.method, endpoint.path);
            continue;
        }

        let method_name = if endpoint.method.trim().is_empty() {
            "GET".to_string()
        } else {
            endpoint.method.trim().to_ascii_uppercase()
        };
        let method = match method_name.as_str() {
            "GET" => actix_web::http::Method::GET,
            "POST" => actix_web::http::Method::POST,
            "PUT" => actix_web::http::Method::PUT,
            "PATCH" => actix_web::http::Method::PATCH,
            "DELETE" => actix_web::http::Method::DELETE,
            other => {
                warn!("unsupported method {other} for path {}, skipping", endpoint.path);
                continue;
            }
        };

        let is_proxy = endpoint.backend.is_some();
        let endpoint = Arc::new(endpoint.clone());
        let route_state = state.clone();

        info!("register endpoint {method_name} {}", endpoint.path);

        service_cfg.route(
            &endpoint.path,
            web::method(method).to(move |req: HttpRequest, body: web::Bytes| {
                let endpoint = endpoint.clone();
                let state = route_state.clone();
                async move {
                    if is_proxy {
                        proxy::handle(req, body, endpoint, state).await
                    } else {
                        aggregate::handle(req, body, endpoint, state).await
                    }
                }
            }),
        );
    }
}

fn is_dev_env() -> bool {
    std::env::var("APP_ENV")
        .map(|v| v.trim().eq_ignore_ascii_case("dev"))
        .unwrap_or(false)
}
