//! Structured logging setup.
//!
//! - [`logger`] - colorized `env_logger` formatter, honoring `NO_COLOR` and
//!   `RUST_LOG`.

pub mod logger;
