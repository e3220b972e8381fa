//! URL and path manipulation utilities used by the proxy and aggregation
//! handlers to resolve upstream targets from declared patterns.
//!
//! - [`path`] - path joining, `{id}` template resolution, raw-query extraction.
//! - [`ttl`] - shared duration parsing for service timeouts and cache TTLs.

pub mod path;
pub mod ttl;
