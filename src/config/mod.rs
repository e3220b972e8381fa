//! Configuration loading and the routing-table data model.
//!
//! - [`model`] - the YAML document shape (`RawConfig`, `Service`, `Endpoint`, ...).
//! - [`loader`] - file + env-override loading, `includes` glob expansion.
//! - [`validation`] - service indexing (duplicate names, transport normalization).
//!
//! Configuration is loaded once at startup into an immutable [`model::FinalConfig`];
//! everything downstream (the route registry, the handlers) treats it as read-only.

pub mod loader;
pub mod model;
pub mod validation;
