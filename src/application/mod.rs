//! Application layer - orchestration over the ports.
//!
//! - `ingestion` - Event Ingestion & Sync Engine: validate, upsert profile,
//!   persist event, best-effort Klaviyo sync, record the outcome
//! - `cleanup` - Retention Cleanup Engine: retention deletes and orphaned
//!   profile removal

pub mod cleanup;
pub mod ingestion;

pub use cleanup::{CleanupOutcome, CleanupService, CleanupStats};
pub use ingestion::EventIngestionService;
