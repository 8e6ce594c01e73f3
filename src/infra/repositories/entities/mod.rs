//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.
//! Enumerations are stored as their lowercase string form.

pub mod appointment;
pub mod client;
pub mod company;
pub mod notification;
pub mod payment;
pub mod professional;
pub mod professional_service;
pub mod service;
