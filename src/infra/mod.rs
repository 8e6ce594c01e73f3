//! Infrastructure layer - External systems integration
//!
//! - Database connection, migrations and repositories
//! - Redis cache and rate-limit counters
//! - apalis job queue for deferred notifications
//! - Outbound message delivery

pub mod cache;
pub mod db;
pub mod notifier;
pub mod queue;
pub mod repositories;
pub mod unit_of_work;

pub use cache::Cache;
pub use db::{Database, Migrator};
pub use notifier::{LogSender, NotificationSender, OutgoingMessage};
pub use queue::{JobQueue, NotificationQueue};
pub use unit_of_work::{Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use notifier::MockNotificationSender;
#[cfg(any(test, feature = "test-utils"))]
pub use queue::MockNotificationQueue;
