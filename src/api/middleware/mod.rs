//! API middleware.

mod rate_limit;

pub use rate_limit::{client_identifier, rate_limit_middleware, RateLimitError};
