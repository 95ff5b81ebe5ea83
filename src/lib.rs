//! Klaviyo Bridge - Marketing event collection backend.
//!
//! Records marketing events and profile attributes locally, synchronizes them
//! to the Klaviyo API on a best-effort basis, and runs scheduled retention
//! cleanup of old data.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
