//! Process entry point: load configuration, wire up shared state, bind and
//! serve, shut down gracefully on Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use log::{error, info};
use tokio::signal;

use junction_gateway::cache::memory::MemoryCache;
use junction_gateway::cache::remote::RedisCache;
use junction_gateway::cache::CacheStore;
use junction_gateway::config::validation::index_services;
use junction_gateway::config::{loader, model::FinalConfig};
use junction_gateway::logs::logger::configure_logger;
use junction_gateway::routes::registry;
use junction_gateway::routes::state::AppState;
use junction_gateway::services::http_client::UpstreamClient;
use junction_gateway::utils::ttl::parse_duration_or_default;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    configure_logger();

    let config = match loader::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    info!("starting gateway with {} service(s), {} endpoint(s)", config.services.len(), config.endpoints.len());

    let state = match build_state(&config).await {
        Ok(s) => s,
        Err(e) => {
            error!("failed to initialize gateway state: {e}");
            std::process::exit(1);
        }
    };

    let address = if config.gateway.address.trim().is_empty() {
        "0.0.0.0:8080".to_string()
    } else {
        config.gateway.address.clone()
    };
    let read_timeout = Duration::from_secs(config.gateway.read_timeout_sec);
    let write_timeout = Duration::from_secs(config.gateway.write_timeout_sec);
    let idle_timeout = Duration::from_secs(config.gateway.idle_timeout_sec);
    let shutdown_timeout = Duration::from_secs(config.gateway.shutdown_timeout_sec);

    let config_for_app = config.clone();
    let server = HttpServer::new(move || {
        let state = state.clone();
        App::new().configure(move |cfg| registry::configure(cfg, &config_for_app, state.clone()))
    })
    .client_request_timeout(read_timeout)
    .client_disconnect_timeout(write_timeout)
    .keep_alive(idle_timeout)
    .shutdown_timeout(shutdown_timeout.as_secs())
    .bind(&address)?
    .run();

    info!("listening on {address}");

    tokio::select! {
        result = server => {
            match result {
                Ok(_) => info!("server stopped gracefully"),
                Err(e) => error!("server error: {e}"),
            }
        }
        _ = signal::ctrl_c() => {
            info!("received shutdown signal, stopping server...");
        }
    }

    Ok(())
}

async fn build_state(config: &FinalConfig) -> Result<Arc<AppState>, String> {
    let services = index_services(&config.services);
    let cache_default_ttl = parse_duration_or_default(&config.cache.ttl, Duration::ZERO);

    let cache: Option<Arc<dyn CacheStore>> = match config.cache.driver.trim().to_ascii_lowercase().as_str() {
        "memory" => Some(Arc::new(MemoryCache::new(cache_default_ttl))),
        "redis" => {
            let redis = RedisCache::connect(&config.cache, cache_default_ttl)
                .await
                .map_err(|e| e.to_string())?;
            Some(Arc::new(redis))
        }
        other => {
            info!("cache.driver={other} is not recognized, caching disabled");
            None
        }
    };

    Ok(Arc::new(AppState {
        services,
        cache,
        cache_default_ttl,
        client: UpstreamClient::new(),
    }))
}
