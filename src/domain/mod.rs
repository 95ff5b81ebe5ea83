//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (attribute maps, errors)
//! - `event` - Marketing event entity and ingestion input
//! - `profile` - Customer profile entity keyed by email

pub mod event;
pub mod foundation;
pub mod profile;
