//! Klaviyo diagnostic endpoints.

mod dto;
mod handlers;
mod routes;

pub use routes::routes;
