//! Configuration loading: YAML file + environment overrides + `includes` expansion.
//!
//! The YAML file is the base layer, loaded through `figment` (the same
//! file-provider approach used elsewhere in the wider gateway ecosystem this
//! project draws from). A small, explicitly-named set of environment
//! variables then overrides individual `gateway.*`/`cache.*` fields — this
//! mirrors the source system's env-override convention more directly than a
//! generic nested-key scheme would, and keeps the override surface auditable.

use std::path::{Path, PathBuf};

use figment::providers::{Format, Yaml};
use figment::Figment;
use glob::glob;
use log::{debug, warn};

use crate::config::model::{FinalConfig, IncludedConfig, RawConfig};
use crate::models::error::GatewayError;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Reads `APP_CONFIG` (default `config.yaml`) and builds the immutable
/// [`FinalConfig`], expanding `includes` when the document opts in.
pub fn load() -> Result<FinalConfig, GatewayError> {
    let path = std::env::var("APP_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    build(Path::new(&path))
}

/// Builds a [`FinalConfig`] from an explicit config file path. Exposed
/// separately from [`load`] so tests can point at a fixture file without
/// touching the process environment's working directory assumptions.
pub fn build(path: &Path) -> Result<FinalConfig, GatewayError> {
    let mut raw = load_raw(path)?;
    apply_env_overrides(&mut raw);

    let mut services = raw.services.clone();
    let mut endpoints = raw.endpoints.clone();

    if !raw.includes.is_empty() {
        if raw.version == "v1" {
            warn!(
                "config declares includes but version=v1 does not support them; ignoring {} pattern(s)",
                raw.includes.len()
            );
        } else {
            let (inc_services, inc_endpoints) = expand_includes(path, &raw.includes)?;
            services.extend(inc_services);
            endpoints.extend(inc_endpoints);
        }
    }

    Ok(FinalConfig {
        gateway: raw.gateway,
        cache: raw.cache,
        services,
        endpoints,
    })
}

fn load_raw(path: &Path) -> Result<RawConfig, GatewayError> {
    debug!("loading configuration from {}", path.display());

    if !path.exists() {
        warn!("config file {} not found; using defaults", path.display());
        return Ok(RawConfig::default());
    }

    Figment::from(Yaml::file(path))
        .extract()
        .map_err(|e| GatewayError::Config(format!("parse config {}: {e}", path.display())))
}

/// Applies the env-override convention named in the configuration contract:
/// `GATEWAY_ADDR` and friends for the server block, `CACHE_*` for the cache
/// block. Unset variables leave the YAML-derived value untouched.
fn apply_env_overrides(raw: &mut RawConfig) {
    if let Ok(v) = std::env::var("GATEWAY_ADDR") {
        raw.gateway.address = v;
    }
    if let Ok(v) = std::env::var("GATEWAY_READ_TIMEOUT") {
        if let Ok(n) = v.parse() {
            raw.gateway.read_timeout_sec = n;
        }
    }
    if let Ok(v) = std::env::var("GATEWAY_WRITE_TIMEOUT") {
        if let Ok(n) = v.parse() {
            raw.gateway.write_timeout_sec = n;
        }
    }
    if let Ok(v) = std::env::var("GATEWAY_IDLE_TIMEOUT") {
        if let Ok(n) = v.parse() {
            raw.gateway.idle_timeout_sec = n;
        }
    }
    if let Ok(v) = std::env::var("GATEWAY_SHUTDOWN_TIMEOUT") {
        if let Ok(n) = v.parse() {
            raw.gateway.shutdown_timeout_sec = n;
        }
    }
    if let Ok(v) = std::env::var("CACHE_DRIVER") {
        raw.cache.driver = v;
    }
    if let Ok(v) = std::env::var("CACHE_HOST") {
        raw.cache.host = v;
    }
    if let Ok(v) = std::env::var("CACHE_PORT") {
        if let Ok(n) = v.parse() {
            raw.cache.port = n;
        }
    }
    if let Ok(v) = std::env::var("CACHE_DB") {
        if let Ok(n) = v.parse() {
            raw.cache.db = n;
        }
    }
    if let Ok(v) = std::env::var("CACHE_PASSWORD") {
        raw.cache.password = v;
    }
    if let Ok(v) = std::env::var("CACHE_TTL") {
        raw.cache.ttl = v;
    }
}

/// Expands `includes` glob patterns relative to `main_path`'s directory,
/// substituting `{env}` with `APP_ENV` (default `dev`), and merges in each
/// matched file's `services`/`endpoints`.
fn expand_includes(
    main_path: &Path,
    patterns: &[String],
) -> Result<(Vec<crate::config::model::Service>, Vec<crate::config::model::Endpoint>), GatewayError> {
    let base_dir = main_path.parent().unwrap_or_else(|| Path::new("."));
    let env = std::env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

    let mut all_services = Vec::new();
    let mut all_endpoints = Vec::new();

    for pattern in patterns {
        let substituted = pattern.replace("{env}", &env);
        let full_pattern = resolve_include_pattern(base_dir, &substituted);

        let matches = glob(&full_pattern)
            .map_err(|e| GatewayError::Config(format!("bad includes pattern {full_pattern:?}: {e}")))?;

        for entry in matches {
            let file = entry.map_err(|e| GatewayError::Config(format!("glob error: {e}")))?;
            let data = std::fs::read_to_string(&file)
                .map_err(|e| GatewayError::Config(format!("read included {}: {e}", file.display())))?;
            let partial: IncludedConfig = serde_yaml::from_str(&data)
                .map_err(|e| GatewayError::Config(format!("parse included {}: {e}", file.display())))?;

            debug!(
                "included {} contributed {} service(s), {} endpoint(s)",
                file.display(),
                partial.services.len(),
                partial.endpoints.len()
            );

            all_services.extend(partial.services);
            all_endpoints.extend(partial.endpoints);
        }
    }

    Ok((all_services, all_endpoints))
}

fn resolve_include_pattern(base_dir: &Path, pattern: &str) -> String {
    let candidate = Path::new(pattern);
    let joined: PathBuf = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        base_dir.join(candidate)
    };
    joined.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn duplicate_service_names_last_one_wins_after_indexing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tmp(
            &dir,
            "config.yaml",
            r#"
version: v1
services:
  - name: svc
    proxy_url: http://first
  - name: svc
    proxy_url: http://second
endpoints: []
"#,
        );

        let cfg = build(&path).unwrap();
        let indexed = crate::config::validation::index_services(&cfg.services);
        assert_eq!(indexed.get("svc").unwrap().proxy_url, "http://second");
    }

    #[test]
    fn includes_are_ignored_under_v1() {
        let dir = tempfile::tempdir().unwrap();
        write_tmp(
            &dir,
            "extra.yaml",
            "services:\n  - name: extra\n    proxy_url: http://extra\n",
        );
        let path = write_tmp(
            &dir,
            "config.yaml",
            "version: v1\nincludes:\n  - extra.yaml\nservices: []\nendpoints: []\n",
        );

        let cfg = build(&path).unwrap();
        assert!(cfg.services.is_empty());
    }

    #[test]
    fn includes_expand_under_non_v1() {
        let dir = tempfile::tempdir().unwrap();
        write_tmp(
            &dir,
            "extra.yaml",
            "services:\n  - name: extra\n    proxy_url: http://extra\n",
        );
        let path = write_tmp(
            &dir,
            "config.yaml",
            "version: v2\nincludes:\n  - extra.yaml\nservices: []\nendpoints: []\n",
        );

        let cfg = build(&path).unwrap();
        assert_eq!(cfg.services.len(), 1);
        assert_eq!(cfg.services[0].name, "extra");
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.yaml");
        let cfg = build(&path).unwrap();
        assert!(cfg.services.is_empty());
        assert_eq!(cfg.cache.driver, "memory");
    }
}
