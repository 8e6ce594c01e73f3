//! HTTP request handlers, one module per resource.

pub mod analytics_handler;
pub mod appointment_handler;
pub mod client_handler;
pub mod company_handler;
pub mod notification_handler;
pub mod payment_handler;
pub mod professional_handler;
pub mod service_handler;

pub use analytics_handler::analytics_routes;
pub use appointment_handler::appointment_routes;
pub use client_handler::client_routes;
pub use company_handler::company_routes;
pub use notification_handler::notification_routes;
pub use payment_handler::payment_routes;
pub use professional_handler::professional_routes;
pub use service_handler::service_routes;
