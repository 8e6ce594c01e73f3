//! API layer - HTTP handlers and middleware
//!
//! Handlers only translate HTTP to service calls; every rule lives in
//! `services` and `domain`. Requests pass through the rate limiter when a
//! Redis cache is configured.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::{AppState, HealthProbe, InfraProbe};
