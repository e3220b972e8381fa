//! Upstream-facing services.
//!
//! - [`http_client`] - the shared reqwest-backed client used by both the
//!   proxy and aggregation handlers.

pub mod http_client;
