//! Retention Cleanup Engine.
//!
//! Deletes events older than the retention window and profiles that no event
//! references anymore. Ordering matters in the combined run: events are
//! deleted first, which can newly orphan profiles that the subsequent profile
//! pass then removes in the same call. Deletes are idempotent against rows
//! already removed, so a concurrent scheduled and manual run are individually
//! safe.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use tracing::{error, info};

use crate::domain::foundation::DomainError;
use crate::ports::{EventStore, ProfileStore};

/// Result of a combined cleanup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupOutcome {
    pub deleted_events: u64,
    pub deleted_profiles: u64,
}

/// Read-only counts using the same cutoff and orphan definitions as the
/// destructive operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupStats {
    pub total_events: u64,
    pub events_to_delete: u64,
    pub total_profiles: u64,
    pub orphaned_profiles: u64,
    pub retention_days: u32,
}

pub struct CleanupService {
    events: Arc<dyn EventStore>,
    profiles: Arc<dyn ProfileStore>,
    retention_days: u32,
}

impl CleanupService {
    pub fn new(
        events: Arc<dyn EventStore>,
        profiles: Arc<dyn ProfileStore>,
        retention_days: u32,
    ) -> Self {
        Self {
            events,
            profiles,
            retention_days,
        }
    }

    /// First day still inside the retention window; events strictly before
    /// it are eligible for deletion.
    fn cutoff(&self) -> NaiveDate {
        Utc::now().date_naive() - Duration::days(i64::from(self.retention_days))
    }

    /// Deletes events older than the retention window, returning the count.
    pub async fn cleanup_old_events(&self) -> Result<u64, DomainError> {
        let cutoff = self.cutoff();
        info!(%cutoff, retention_days = self.retention_days, "deleting events older than cutoff");

        let deleted = self.events.delete_older_than(cutoff).await?;
        info!(deleted, "old events deleted");
        Ok(deleted)
    }

    /// Deletes profiles with no event referencing their email, returning the
    /// count.
    pub async fn cleanup_orphaned_profiles(&self) -> Result<u64, DomainError> {
        let orphaned = self.profiles.find_orphaned().await?;
        if orphaned.is_empty() {
            info!("no orphaned profiles found");
            return Ok(0);
        }

        let ids: Vec<_> = orphaned.iter().map(|p| p.id).collect();
        let deleted = self.profiles.delete_by_ids(&ids).await?;
        info!(deleted, "orphaned profiles deleted");
        Ok(deleted)
    }

    /// Runs both cleanups, events first so that newly orphaned profiles are
    /// removed in the same call.
    pub async fn manual_cleanup(&self) -> Result<CleanupOutcome, DomainError> {
        let deleted_events = self.cleanup_old_events().await?;
        let deleted_profiles = self.cleanup_orphaned_profiles().await?;
        Ok(CleanupOutcome {
            deleted_events,
            deleted_profiles,
        })
    }

    /// Read-only statistics; does not mutate state.
    pub async fn get_cleanup_stats(&self) -> Result<CleanupStats, DomainError> {
        let cutoff = self.cutoff();
        Ok(CleanupStats {
            total_events: self.events.count_all().await?,
            events_to_delete: self.events.count_older_than(cutoff).await?,
            total_profiles: self.profiles.count_all().await?,
            orphaned_profiles: self.profiles.count_orphaned().await?,
            retention_days: self.retention_days,
        })
    }

    /// Entry point for the scheduled trigger: failures are logged and
    /// swallowed so the task never escapes to crash the process.
    pub async fn run_scheduled(&self) {
        info!("starting scheduled cleanup");
        match self.manual_cleanup().await {
            Ok(outcome) => info!(
                deleted_events = outcome.deleted_events,
                deleted_profiles = outcome.deleted_profiles,
                "scheduled cleanup finished"
            ),
            Err(err) => error!(error = %err, "scheduled cleanup failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::Event;
    use crate::domain::foundation::Attributes;
    use crate::domain::profile::Profile;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::Mutex;
    use uuid::Uuid;

    struct InMemoryEvents {
        events: Mutex<Vec<Event>>,
    }

    impl InMemoryEvents {
        fn new() -> Self {
            Self {
                events: Mutex::new(Vec::new()),
            }
        }

        fn add(&self, email: Option<&str>, days_ago: i64) {
            let now = Utc::now();
            let mut event = Event::record(
                &crate::domain::event::NewEvent {
                    event_name: "Purchase".to_string(),
                    event_attributes: Attributes::new(),
                    profile_attributes: None,
                    email: email.map(String::from),
                },
                None,
                now,
            );
            event.event_date = now.date_naive() - Duration::days(days_ago);
            self.events.lock().unwrap().push(event);
        }
    }

    #[async_trait]
    impl EventStore for InMemoryEvents {
        async fn insert(&self, event: &Event) -> Result<(), DomainError> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }

        async fn record_sync_outcome(
            &self,
            _id: Uuid,
            _sent_to_klaviyo: bool,
            _response: &str,
            _updated_at: DateTime<Utc>,
        ) -> Result<(), DomainError> {
            Ok(())
        }

        async fn distinct_event_names(&self) -> Result<Vec<String>, DomainError> {
            Ok(Vec::new())
        }

        async fn distinct_event_names_for_email(
            &self,
            _email: &str,
        ) -> Result<Vec<String>, DomainError> {
            Ok(Vec::new())
        }

        async fn count_by_date_and_metric(
            &self,
            _date: chrono::NaiveDate,
            _metric: &str,
        ) -> Result<u64, DomainError> {
            Ok(0)
        }

        async fn distinct_emails_by_date(
            &self,
            _date: chrono::NaiveDate,
            _metric: Option<&str>,
        ) -> Result<Vec<String>, DomainError> {
            Ok(Vec::new())
        }

        async fn count_all(&self) -> Result<u64, DomainError> {
            Ok(self.events.lock().unwrap().len() as u64)
        }

        async fn count_older_than(&self, cutoff: NaiveDate) -> Result<u64, DomainError> {
            Ok(self
                .events
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.event_date < cutoff)
                .count() as u64)
        }

        async fn delete_older_than(&self, cutoff: NaiveDate) -> Result<u64, DomainError> {
            let mut events = self.events.lock().unwrap();
            let before = events.len();
            events.retain(|e| e.event_date >= cutoff);
            Ok((before - events.len()) as u64)
        }
    }

    struct InMemoryProfiles {
        profiles: Mutex<Vec<Profile>>,
        events: Arc<InMemoryEvents>,
    }

    impl InMemoryProfiles {
        fn new(events: Arc<InMemoryEvents>) -> Self {
            Self {
                profiles: Mutex::new(Vec::new()),
                events,
            }
        }

        fn add(&self, email: &str) {
            self.profiles.lock().unwrap().push(Profile::first_seen(
                email,
                None,
                "Purchase",
                &Attributes::new(),
                Utc::now(),
            ));
        }

        fn emails(&self) -> Vec<String> {
            self.profiles
                .lock()
                .unwrap()
                .iter()
                .map(|p| p.email.clone())
                .collect()
        }

        fn orphans(&self) -> Vec<Profile> {
            let events = self.events.events.lock().unwrap();
            self.profiles
                .lock()
                .unwrap()
                .iter()
                .filter(|p| !events.iter().any(|e| e.email.as_deref() == Some(&p.email)))
                .cloned()
                .collect()
        }
    }

    #[async_trait]
    impl ProfileStore for InMemoryProfiles {
        async fn insert(&self, profile: &Profile) -> Result<(), DomainError> {
            self.profiles.lock().unwrap().push(profile.clone());
            Ok(())
        }

        async fn update(&self, _profile: &Profile) -> Result<(), DomainError> {
            Ok(())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, DomainError> {
            Ok(self
                .profiles
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.email == email)
                .cloned())
        }

        async fn count_all(&self) -> Result<u64, DomainError> {
            Ok(self.profiles.lock().unwrap().len() as u64)
        }

        async fn find_orphaned(&self) -> Result<Vec<Profile>, DomainError> {
            Ok(self.orphans())
        }

        async fn count_orphaned(&self) -> Result<u64, DomainError> {
            Ok(self.orphans().len() as u64)
        }

        async fn delete_by_ids(&self, ids: &[Uuid]) -> Result<u64, DomainError> {
            let mut profiles = self.profiles.lock().unwrap();
            let before = profiles.len();
            profiles.retain(|p| !ids.contains(&p.id));
            Ok((before - profiles.len()) as u64)
        }
    }

    fn setup() -> (Arc<InMemoryEvents>, Arc<InMemoryProfiles>, CleanupService) {
        let events = Arc::new(InMemoryEvents::new());
        let profiles = Arc::new(InMemoryProfiles::new(events.clone()));
        let service = CleanupService::new(events.clone(), profiles.clone(), 7);
        (events, profiles, service)
    }

    #[tokio::test]
    async fn deletes_only_events_older_than_retention_window() {
        let (events, _, service) = setup();
        events.add(Some("a@x.com"), 10);
        events.add(Some("b@x.com"), 3);
        events.add(None, 7); // exactly at the cutoff day survives

        let deleted = service.cleanup_old_events().await.unwrap();

        assert_eq!(deleted, 1);
        assert_eq!(events.events.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn cleanup_is_idempotent() {
        let (events, _, service) = setup();
        events.add(Some("a@x.com"), 10);

        assert_eq!(service.cleanup_old_events().await.unwrap(), 1);
        assert_eq!(service.cleanup_old_events().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn never_deletes_profiles_with_remaining_events() {
        let (events, profiles, service) = setup();
        events.add(Some("kept@x.com"), 1);
        profiles.add("kept@x.com");
        profiles.add("orphan@x.com");

        let deleted = service.cleanup_orphaned_profiles().await.unwrap();

        assert_eq!(deleted, 1);
        assert_eq!(profiles.emails(), vec!["kept@x.com".to_string()]);
    }

    #[tokio::test]
    async fn manual_cleanup_removes_profiles_orphaned_by_event_deletion() {
        let (events, profiles, service) = setup();
        // The profile's only event is past retention, so the event pass
        // orphans it and the profile pass removes it in the same run.
        events.add(Some("stale@x.com"), 30);
        profiles.add("stale@x.com");

        let outcome = service.manual_cleanup().await.unwrap();

        assert_eq!(
            outcome,
            CleanupOutcome {
                deleted_events: 1,
                deleted_profiles: 1,
            }
        );
        assert!(profiles.emails().is_empty());
    }

    #[tokio::test]
    async fn stats_report_counts_without_mutating() {
        let (events, profiles, service) = setup();
        events.add(Some("a@x.com"), 10);
        events.add(Some("a@x.com"), 1);
        profiles.add("a@x.com");
        profiles.add("orphan@x.com");

        let stats = service.get_cleanup_stats().await.unwrap();

        assert_eq!(
            stats,
            CleanupStats {
                total_events: 2,
                events_to_delete: 1,
                total_profiles: 2,
                orphaned_profiles: 1,
                retention_days: 7,
            }
        );
        // Nothing was deleted by the read.
        assert_eq!(events.events.lock().unwrap().len(), 2);
        assert_eq!(profiles.emails().len(), 2);
    }

    #[tokio::test]
    async fn scheduled_run_swallows_store_failures() {
        struct FailingEvents;

        #[async_trait]
        impl EventStore for FailingEvents {
            async fn insert(&self, _event: &Event) -> Result<(), DomainError> {
                Err(DomainError::database("down"))
            }
            async fn record_sync_outcome(
                &self,
                _id: Uuid,
                _sent: bool,
                _response: &str,
                _updated_at: DateTime<Utc>,
            ) -> Result<(), DomainError> {
                Err(DomainError::database("down"))
            }
            async fn distinct_event_names(&self) -> Result<Vec<String>, DomainError> {
                Err(DomainError::database("down"))
            }
            async fn distinct_event_names_for_email(
                &self,
                _email: &str,
            ) -> Result<Vec<String>, DomainError> {
                Err(DomainError::database("down"))
            }
            async fn count_by_date_and_metric(
                &self,
                _date: NaiveDate,
                _metric: &str,
            ) -> Result<u64, DomainError> {
                Err(DomainError::database("down"))
            }
            async fn distinct_emails_by_date(
                &self,
                _date: NaiveDate,
                _metric: Option<&str>,
            ) -> Result<Vec<String>, DomainError> {
                Err(DomainError::database("down"))
            }
            async fn count_all(&self) -> Result<u64, DomainError> {
                Err(DomainError::database("down"))
            }
            async fn count_older_than(&self, _cutoff: NaiveDate) -> Result<u64, DomainError> {
                Err(DomainError::database("down"))
            }
            async fn delete_older_than(&self, _cutoff: NaiveDate) -> Result<u64, DomainError> {
                Err(DomainError::database("down"))
            }
        }

        let events = Arc::new(InMemoryEvents::new());
        let profiles = Arc::new(InMemoryProfiles::new(events));
        let service = CleanupService::new(Arc::new(FailingEvents), profiles, 7);

        // Must not panic or propagate.
        service.run_scheduled().await;
    }
}
