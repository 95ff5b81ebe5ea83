//! Foundation module - Shared domain primitives.
//!
//! Contains the attribute map value object and error types that form the
//! vocabulary of the event-sync domain.

mod attributes;
mod errors;

pub use attributes::Attributes;
pub use errors::{DomainError, ErrorCode};
