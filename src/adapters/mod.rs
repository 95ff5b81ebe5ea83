//! Adapter implementations for external systems.

pub mod http;
pub mod klaviyo;
pub mod postgres;
pub mod scheduler;

pub use klaviyo::{KlaviyoClientConfig, KlaviyoHttpClient};
pub use postgres::{PgEventStore, PgProfileStore};
pub use scheduler::spawn_daily_cleanup;
