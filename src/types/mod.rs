//! Shared request and response types.

mod pagination;
mod response;

pub use pagination::{
    Paginated, PaginatedAppointments, PaginatedClients, PaginatedPayments, PaginationMeta,
    PaginationParams,
};
pub use response::MessageResponse;
