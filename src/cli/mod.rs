//! CLI module - Command-line interface for the application.
//!
//! - `serve` - Start the HTTP server
//! - `migrate` - Database migrations
//! - `jobs` - Notification worker and outbox maintenance

pub mod args;

pub use args::{Cli, Commands};
