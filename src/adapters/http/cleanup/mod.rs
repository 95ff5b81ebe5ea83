//! Retention cleanup endpoints.

mod handlers;
mod routes;

pub use routes::routes;
