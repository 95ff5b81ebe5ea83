//! PostgreSQL persistence adapters.

mod event_store;
mod profile_store;

pub use event_store::PgEventStore;
pub use profile_store::PgProfileStore;
