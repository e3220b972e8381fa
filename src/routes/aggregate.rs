//! Aggregation handler: parallel fan-out, partial-failure policy, response
//! synthesis, caching.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, info, warn};
use serde_json::Value;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::cache::cache_key;
use crate::config::model::{AggCall, Endpoint};
use crate::context::{log_prefix, request_id};
use crate::routes::state::AppState;
use crate::services::http_client::filter_forwarded_headers;
use crate::utils::path::resolve_path_template;

pub async fn handle(req: HttpRequest, _body: web::Bytes, endpoint: Arc<Endpoint>, state: Arc<AppState>) -> HttpResponse {
    let rid = request_id(&req);
    let prefix = log_prefix(&rid);

    let ttl = state.effective_ttl(&endpoint.cache_ttl);
    let original_target = req.uri().to_string();
    let key = cache_key(req.method().as_str(), &original_target);

    if let Some(cache) = &state.cache {
        if !ttl.is_zero() {
            match cache.get(&key).await {
                Ok(Some(bytes)) => {
                    debug!("{prefix} cache hit key={key} path={}", req.path());
                    return match serde_json::from_slice::<Value>(&bytes) {
                        Ok(value) => HttpResponse::Ok().json(value),
                        Err(_) => HttpResponse::Ok().body(bytes),
                    };
                }
                Ok(None) => {}
                Err(e) => warn!("{prefix} cache get error: {e}"),
            }
        }
    }

    let fail_on_error = endpoint.fail_on_error.unwrap_or(true);
    let actual_path = req.path().to_string();
    let raw_query = req.uri().query().unwrap_or("").to_string();
    let headers = filter_forwarded_headers(req.headers().iter().filter_map(|(n, v)| {
        v.to_str().ok().map(|s| (n.as_str(), s))
    }));

    let results: Arc<Mutex<HashMap<String, Value>>> = Arc::new(Mutex::new(HashMap::new()));
    let token = CancellationToken::new();
    let mut join_set = JoinSet::new();

    for call in endpoint.calls.clone() {
        let token = token.clone();
        let state = state.clone();
        let results = results.clone();
        let endpoint_path = endpoint.path.clone();
        let actual_path = actual_path.clone();
        let raw_query = raw_query.clone();
        let headers = headers.clone();
        let prefix = prefix.clone();

        join_set.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => Err("cancelled".to_string()),
                res = run_call(&call, &endpoint_path, &actual_path, &raw_query, fail_on_error, &headers, &state, &results, &prefix) => res,
            }
        });
    }

    let mut failed = false;
    while let Some(joined) = join_set.join_next().await {
        let outcome = joined.unwrap_or_else(|e| Err(e.to_string()));
        if let Err(reason) = outcome {
            warn!("{prefix} aggregate call failed: {reason}");
            failed = true;
            if fail_on_error {
                token.cancel();
            }
        }
    }

    if failed && fail_on_error {
        return HttpResponse::BadGateway().body("backend error in aggregate");
    }

    let per_call = Arc::try_unwrap(results).map(|m| m.into_inner().unwrap()).unwrap_or_default();
    let final_value = build_aggregate_response(&endpoint.response_mapping, &per_call);

    if let Some(cache) = &state.cache {
        if !ttl.is_zero() {
            if let Ok(bytes) = serde_json::to_vec(&final_value) {
                if let Err(e) = cache.set(&key, &bytes, ttl).await {
                    warn!("{prefix} cache set error: {e}");
                }
            }
        }
    }

    let errors: Vec<String> = per_call
        .keys()
        .filter(|k| k.ends_with("_error"))
        .map(|k| {
            let base = k.trim_end_matches("_error");
            format!("{base}={}", per_call[k])
        })
        .collect();
    if !errors.is_empty() {
        info!("{prefix} aggregate completed with downstream errors: {}", errors.join(", "));
    }

    HttpResponse::Ok().json(final_value)
}

#[allow(clippy::too_many_arguments)]
async fn run_call(
    call: &AggCall,
    endpoint_path: &str,
    actual_path: &str,
    raw_query: &str,
    fail_on_error: bool,
    headers: &[(String, String)],
    state: &AppState,
    results: &Mutex<HashMap<String, Value>>,
    prefix: &str,
) -> Result<(), String> {
    let service = match state.services.get(&call.service) {
        Some(s) => s.clone(),
        None => {
            let msg = format!("unknown service \"{}\"", call.service);
            if fail_on_error {
                return Err(msg);
            }
            results.lock().unwrap().insert(call.name.clone(), serde_json::json!({ "_error": msg }));
            return Ok(());
        }
    };

    let transport = service.transport.trim().to_ascii_lowercase();
    if transport == "grpc" {
        let msg = format!("grpc in aggregate not implemented for service \"{}\"", service.name);
        if fail_on_error {
            return Err(msg);
        }
        results.lock().unwrap().insert(call.name.clone(), serde_json::json!({ "_error": msg }));
        return Ok(());
    }

    let resolved_path = resolve_path_template(endpoint_path, &call.path, actual_path);
    let method = if call.method.trim().is_empty() { "GET" } else { call.method.as_str() };

    debug!("{prefix} aggregate call name={} svc={} path={resolved_path}", call.name, service.name);
    let response = state.client.call(&service, method, &resolved_path, raw_query, headers, None).await;

    let (status, body) = match response {
        Ok(r) => (r.status, r.body),
        Err(e) => {
            let msg = e.short_message();
            if fail_on_error {
                return Err(msg);
            }
            results.lock().unwrap().insert(call.name.clone(), serde_json::json!({ "_error": msg }));
            return Ok(());
        }
    };

    if status >= 400 && fail_on_error {
        return Err(format!("downstream status {status}"));
    }

    let mut value = decode_with_mapping(&body, &call.mapping);
    if status >= 400 && value.is_null() {
        value = Value::String(format!("status={status}"));
    }

    let mut guard = results.lock().unwrap();
    guard.insert(call.name.clone(), value);
    if status >= 400 {
        guard.insert(format!("{}_error", call.name), Value::String(format!("status={status}")));
    }
    Ok(())
}

fn decode_with_mapping(body: &[u8], mapping: &HashMap<String, String>) -> Value {
    if mapping.is_empty() {
        return serde_json::from_slice(body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()));
    }

    let decoded: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(_) => return Value::String(String::from_utf8_lossy(body).into_owned()),
    };
    let obj = match decoded.as_object() {
        Some(o) => o,
        None => return Value::String(String::from_utf8_lossy(body).into_owned()),
    };

    let mut mapped = serde_json::Map::new();
    for (out_key, json_field) in mapping {
        if let Some(v) = obj.get(json_field) {
            mapped.insert(out_key.clone(), v.clone());
        }
    }
    Value::Object(mapped)
}

fn build_aggregate_response(mapping: &HashMap<String, String>, per_call: &HashMap<String, Value>) -> Value {
    if mapping.is_empty() {
        return Value::Object(per_call.iter().map(|(k, v)| (k.clone(), v.clone())).collect());
    }

    let mut out = serde_json::Map::new();
    for (out_key, expr) in mapping {
        let mut parts = expr.splitn(2, '.');
        let call_name = parts.next().unwrap_or("");
        let field = parts.next();
        let call_val = match per_call.get(call_name) {
            Some(v) => v,
            None => continue,
        };
        match field {
            None => {
                out.insert(out_key.clone(), call_val.clone());
            }
            Some(f) => {
                if let Some(obj) = call_val.as_object() {
                    if let Some(v) = obj.get(f) {
                        out.insert(out_key.clone(), v.clone());
                    }
                }
            }
        }
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_with_mapping_projects_named_fields() {
        let mut mapping = HashMap::new();
        mapping.insert("title".to_string(), "post_title".to_string());
        let value = decode_with_mapping(br#"{"post_title":"hi","other":1}"#, &mapping);
        assert_eq!(value, serde_json::json!({"title": "hi"}));
    }

    #[test]
    fn decode_with_mapping_falls_back_to_string_on_parse_failure() {
        let mapping = HashMap::new();
        let value = decode_with_mapping(b"not json", &mapping);
        assert_eq!(value, Value::String("not json".to_string()));
    }

    #[test]
    fn decode_with_mapping_empty_mapping_keeps_raw_json() {
        let mapping = HashMap::new();
        let value = decode_with_mapping(br#"{"a":1}"#, &mapping);
        assert_eq!(value, serde_json::json!({"a": 1}));
    }

    #[test]
    fn build_aggregate_response_without_mapping_returns_raw_results() {
        let mut per_call = HashMap::new();
        per_call.insert("post".to_string(), serde_json::json!({"title": "hi"}));
        let value = build_aggregate_response(&HashMap::new(), &per_call);
        assert_eq!(value, serde_json::json!({"post": {"title": "hi"}}));
    }

    #[test]
    fn build_aggregate_response_projects_dotted_expressions() {
        let mut per_call = HashMap::new();
        per_call.insert("post".to_string(), serde_json::json!({"title": "hello"}));
        per_call.insert("test".to_string(), serde_json::json!({"body": "world"}));
        let mut mapping = HashMap::new();
        mapping.insert("title".to_string(), "post.title".to_string());
        mapping.insert("message".to_string(), "test.body".to_string());
        let value = build_aggregate_response(&mapping, &per_call);
        assert_eq!(value, serde_json::json!({"title": "hello", "message": "world"}));
    }

    #[test]
    fn build_aggregate_response_skips_absent_calls_and_fields() {
        let mut per_call = HashMap::new();
        per_call.insert("post".to_string(), serde_json::json!({"title": "hello"}));
        let mut mapping = HashMap::new();
        mapping.insert("a".to_string(), "missing.title".to_string());
        mapping.insert("b".to_string(), "post.missing_field".to_string());
        let value = build_aggregate_response(&mapping, &per_call);
        assert_eq!(value, serde_json::json!({}));
    }
}
