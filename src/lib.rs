//! Agenda API - multi-tenant appointment booking for service businesses
//!
//! Companies register clients, professionals and the services they offer.
//! Clients book appointments on a professional's calendar, pay through a
//! simulated gateway and receive email or WhatsApp notifications.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Entities plus the scheduling, fee and analytics rules
//! - **services**: Use cases over the unit of work
//! - **infra**: Database, cache, job queue and message delivery
//! - **jobs**: apalis job handlers
//! - **api**: HTTP handlers, middleware and routes
//! - **types**: Pagination and response helpers
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! agenda-api serve --port 3000
//!
//! # Run migrations
//! agenda-api migrate up
//!
//! # Deliver due reminders without a worker
//! agenda-api jobs dispatch
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod jobs;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::{create_router, AppState};
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use infra::Cache;
