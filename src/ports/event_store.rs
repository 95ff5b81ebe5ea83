//! EventStore port for event persistence and filtered queries.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::event::Event;
use crate::domain::foundation::DomainError;

/// Persistence for marketing events.
///
/// Events are written once on ingestion and updated exactly once afterwards
/// to record the sync outcome. All date filters operate on the day-granular
/// `event_date` column.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persists a freshly recorded event.
    async fn insert(&self, event: &Event) -> Result<(), DomainError>;

    /// Records the outcome of the Klaviyo sync attempt for an event.
    async fn record_sync_outcome(
        &self,
        id: Uuid,
        sent_to_klaviyo: bool,
        response: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), DomainError>;

    /// Distinct event names across all stored events.
    async fn distinct_event_names(&self) -> Result<Vec<String>, DomainError>;

    /// Distinct event names for events referencing the given email.
    async fn distinct_event_names_for_email(&self, email: &str)
        -> Result<Vec<String>, DomainError>;

    /// Count of events matching an exact day and event name.
    async fn count_by_date_and_metric(
        &self,
        date: NaiveDate,
        metric: &str,
    ) -> Result<u64, DomainError>;

    /// Distinct non-null emails of events on a day, optionally narrowed to
    /// one event name.
    async fn distinct_emails_by_date(
        &self,
        date: NaiveDate,
        metric: Option<&str>,
    ) -> Result<Vec<String>, DomainError>;

    /// Total number of stored events.
    async fn count_all(&self) -> Result<u64, DomainError>;

    /// Number of events with `event_date` strictly before the cutoff day.
    async fn count_older_than(&self, cutoff: NaiveDate) -> Result<u64, DomainError>;

    /// Deletes events with `event_date` strictly before the cutoff day,
    /// returning the number of rows removed.
    async fn delete_older_than(&self, cutoff: NaiveDate) -> Result<u64, DomainError>;
}
