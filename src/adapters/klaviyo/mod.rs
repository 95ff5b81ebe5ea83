//! Klaviyo API client adapter.

mod client;

pub use client::{KlaviyoClientConfig, KlaviyoHttpClient};
