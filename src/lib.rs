//! Configuration-driven HTTP gateway: declared routes that either proxy a
//! single upstream or fan out to several in parallel and synthesize a JSON
//! response, fronted by a per-route-TTL cache.

pub mod cache;
pub mod config;
pub mod context;
pub mod logs;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;
