//! Gateway error taxonomy.
//!
//! Mirrors the failure classes the request-handling engine actually
//! distinguishes (config / transport / protocol / not-implemented); handlers
//! match on these variants to pick the right status code rather than relying
//! on string sniffing.

use actix_web::HttpResponse;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Unresolved service, invalid `proxy_url`, malformed config/template.
    #[error("{0}")]
    Config(String),
    /// Connect/read/write failure, deadline exceeded, cancellation.
    #[error("{0}")]
    Transport(String),
    /// Upstream responded but with a status the caller treats as a failure.
    #[error("downstream status {0}")]
    UpstreamStatus(u16),
    /// Declared transport not implemented by this gateway (`grpc`).
    #[error("{0}")]
    NotImplemented(String),
}

impl GatewayError {
    /// Short text body used for the handful of places the engine writes a
    /// plain-text error response directly (as opposed to going through
    /// Actix's `ResponseError` machinery).
    pub fn short_message(&self) -> String {
        self.to_string()
    }
}

impl actix_web::error::ResponseError for GatewayError {
    fn error_response(&self) -> HttpResponse {
        match self {
            GatewayError::Config(msg) => HttpResponse::InternalServerError().body(msg.clone()),
            GatewayError::Transport(msg) => HttpResponse::BadGateway().body(msg.clone()),
            GatewayError::UpstreamStatus(_) => HttpResponse::BadGateway().body(self.to_string()),
            GatewayError::NotImplemented(msg) => HttpResponse::NotImplemented().body(msg.clone()),
        }
    }
}
