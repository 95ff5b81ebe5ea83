//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between the
//! domain and the outside world. Adapters implement these ports.
//!
//! - `EventStore` - Append-only event persistence with filtered queries and
//!   range delete
//! - `ProfileStore` - Profile persistence keyed by email, with orphan lookup
//! - `KlaviyoGateway` - The remote marketing service client

mod event_store;
mod klaviyo;
mod profile_store;

pub use event_store::EventStore;
pub use klaviyo::{EventSubmission, KlaviyoError, KlaviyoGateway, RemoteProfile};
pub use profile_store::ProfileStore;
