//! Event Ingestion & Sync Engine.
//!
//! Orchestrates the write path: upsert the profile, persist the event, then
//! attempt the Klaviyo sync as a best-effort side effect and record its
//! outcome. Local durability is prioritized over remote consistency: a failed
//! sync is logged and stored on the event, never propagated and never
//! retried.
//!
//! Read paths that have a remote-preferred variant (`get_all_metrics`,
//! `get_profile_attributes`) degrade to local data on any remote failure,
//! including a missing API key.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::event::{Event, NewEvent};
use crate::domain::foundation::DomainError;
use crate::domain::profile::Profile;
use crate::ports::{EventStore, EventSubmission, KlaviyoGateway, ProfileStore};

pub struct EventIngestionService {
    events: Arc<dyn EventStore>,
    profiles: Arc<dyn ProfileStore>,
    klaviyo: Arc<dyn KlaviyoGateway>,
}

impl EventIngestionService {
    pub fn new(
        events: Arc<dyn EventStore>,
        profiles: Arc<dyn ProfileStore>,
        klaviyo: Arc<dyn KlaviyoGateway>,
    ) -> Self {
        Self {
            events,
            profiles,
            klaviyo,
        }
    }

    /// Creates one event: profile upsert, local persist, best-effort sync.
    ///
    /// The returned event reflects the final sync status. A Klaviyo failure
    /// leaves the locally persisted event intact with `sent_to_klaviyo =
    /// false` and the failure text recorded; only store errors propagate.
    pub async fn create_event(&self, input: NewEvent) -> Result<Event, DomainError> {
        if input.event_name.trim().is_empty() {
            return Err(DomainError::validation("eventName", "must not be empty"));
        }

        let now = Utc::now();
        let profile_id = match input.email.as_deref() {
            Some(email) => Some(self.upsert_profile(email, &input).await?),
            None => None,
        };

        let mut event = Event::record(&input, profile_id, now);
        self.events.insert(&event).await?;

        // No email means no profile linkage and no remote sync at all.
        if input.email.is_some() {
            self.sync_to_klaviyo(&mut event, &input).await?;
        }

        Ok(event)
    }

    /// Creates many events, strictly sequentially, preserving input order.
    ///
    /// Sync failures are recorded per event and do not abort the batch; a
    /// local store failure does.
    pub async fn create_bulk_events(
        &self,
        inputs: Vec<NewEvent>,
    ) -> Result<Vec<Event>, DomainError> {
        let mut created = Vec::with_capacity(inputs.len());
        for input in inputs {
            created.push(self.create_event(input).await?);
        }
        Ok(created)
    }

    /// Distinct metric names, preferring the live Klaviyo listing and falling
    /// back to local event names on any remote failure. Remote errors never
    /// reach the caller.
    pub async fn get_all_metrics(&self) -> Result<Vec<String>, DomainError> {
        match self.klaviyo.list_metrics().await {
            Ok(metrics) => Ok(metrics),
            Err(err) => {
                debug!(error = %err, "Klaviyo metrics unavailable, using local event names");
                self.events.distinct_event_names().await
            }
        }
    }

    /// Local count of events for an exact day and metric.
    pub async fn get_events_count_by_metric(
        &self,
        date: NaiveDate,
        metric: &str,
    ) -> Result<u64, DomainError> {
        self.events.count_by_date_and_metric(date, metric).await
    }

    /// Distinct non-null emails for a day, optionally narrowed by metric.
    pub async fn get_emails_by_date_and_metric(
        &self,
        date: NaiveDate,
        metric: Option<&str>,
    ) -> Result<Vec<String>, DomainError> {
        self.events.distinct_emails_by_date(date, metric).await
    }

    /// Profile lookup, preferring Klaviyo.
    ///
    /// A remote hit is merged into the local profile (remote values win on
    /// shared keys, local-only keys survive), creating the local record if it
    /// did not exist. Remote failure or remote not-found falls back to the
    /// pure local lookup; `None` means no profile exists anywhere.
    pub async fn get_profile_attributes(
        &self,
        email: &str,
    ) -> Result<Option<Profile>, DomainError> {
        match self.klaviyo.fetch_profile(email).await {
            Ok(Some(remote)) => {
                let now = Utc::now();
                match self.profiles.find_by_email(email).await? {
                    Some(mut profile) => {
                        profile.merge_remote(&remote.id, &remote.attributes, now);
                        self.profiles.update(&profile).await?;
                        Ok(Some(profile))
                    }
                    None => {
                        let profile = Profile::from_remote(email, &remote.id, &remote.attributes, now);
                        self.profiles.insert(&profile).await?;
                        Ok(Some(profile))
                    }
                }
            }
            Ok(None) => self.profiles.find_by_email(email).await,
            Err(err) => {
                debug!(error = %err, email, "Klaviyo profile lookup failed, using local profile");
                self.profiles.find_by_email(email).await
            }
        }
    }

    /// Distinct event names seen locally for one email.
    pub async fn get_profile_metrics(&self, email: &str) -> Result<Vec<String>, DomainError> {
        self.events.distinct_event_names_for_email(email).await
    }

    async fn upsert_profile(&self, email: &str, input: &NewEvent) -> Result<Uuid, DomainError> {
        match self.profiles.find_by_email(email).await? {
            Some(mut profile) => {
                // Only events that carry profile attributes touch an
                // existing profile.
                if let Some(profile_attributes) = &input.profile_attributes {
                    profile.apply_event(
                        profile_attributes,
                        &input.event_name,
                        &input.event_attributes,
                        Utc::now(),
                    );
                    self.profiles.update(&profile).await?;
                }
                Ok(profile.id)
            }
            None => {
                let profile = Profile::first_seen(
                    email,
                    input.profile_attributes.as_ref(),
                    &input.event_name,
                    &input.event_attributes,
                    Utc::now(),
                );
                self.profiles.insert(&profile).await?;
                Ok(profile.id)
            }
        }
    }

    async fn sync_to_klaviyo(
        &self,
        event: &mut Event,
        input: &NewEvent,
    ) -> Result<(), DomainError> {
        let submission = EventSubmission {
            event_name: input.event_name.clone(),
            event_attributes: input.event_attributes.clone(),
            profile_attributes: input.profile_attributes.clone().unwrap_or_default(),
            email: input.email.clone(),
        };

        match self.klaviyo.create_event(&submission).await {
            Ok(body) => {
                info!(event_name = %input.event_name, "event synced to Klaviyo");
                event.mark_synced(sync_marker(&body), Utc::now());
            }
            Err(err) => {
                warn!(event_name = %input.event_name, error = %err, "Klaviyo sync failed");
                event.mark_sync_failed(err.to_string(), Utc::now());
            }
        }

        let response = event.klaviyo_response.clone().unwrap_or_default();
        self.events
            .record_sync_outcome(event.id, event.sent_to_klaviyo, &response, event.updated_at)
            .await
    }
}

/// Success marker stored on the event: the remote event id when the response
/// carries one, a plain acceptance note otherwise.
fn sync_marker(body: &Value) -> String {
    body.get("data")
        .and_then(|data| data.get("id"))
        .and_then(Value::as_str)
        .map(|id| format!("accepted: {}", id))
        .unwrap_or_else(|| "accepted".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Attributes;
    use crate::ports::{KlaviyoError, RemoteProfile};
    use async_trait::async_trait;
    use chrono::DateTime;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct MockEventStore {
        events: Mutex<Vec<Event>>,
    }

    impl MockEventStore {
        fn new() -> Self {
            Self {
                events: Mutex::new(Vec::new()),
            }
        }

        fn stored(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EventStore for MockEventStore {
        async fn insert(&self, event: &Event) -> Result<(), DomainError> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }

        async fn record_sync_outcome(
            &self,
            id: Uuid,
            sent_to_klaviyo: bool,
            response: &str,
            updated_at: DateTime<Utc>,
        ) -> Result<(), DomainError> {
            let mut events = self.events.lock().unwrap();
            let event = events
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or_else(|| DomainError::internal("event not found"))?;
            event.sent_to_klaviyo = sent_to_klaviyo;
            event.klaviyo_response = Some(response.to_string());
            event.updated_at = updated_at;
            Ok(())
        }

        async fn distinct_event_names(&self) -> Result<Vec<String>, DomainError> {
            let mut names: Vec<String> = Vec::new();
            for event in self.events.lock().unwrap().iter() {
                if !names.contains(&event.event_name) {
                    names.push(event.event_name.clone());
                }
            }
            Ok(names)
        }

        async fn distinct_event_names_for_email(
            &self,
            email: &str,
        ) -> Result<Vec<String>, DomainError> {
            let mut names: Vec<String> = Vec::new();
            for event in self.events.lock().unwrap().iter() {
                if event.email.as_deref() == Some(email) && !names.contains(&event.event_name) {
                    names.push(event.event_name.clone());
                }
            }
            Ok(names)
        }

        async fn count_by_date_and_metric(
            &self,
            date: NaiveDate,
            metric: &str,
        ) -> Result<u64, DomainError> {
            Ok(self
                .events
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.event_date == date && e.event_name == metric)
                .count() as u64)
        }

        async fn distinct_emails_by_date(
            &self,
            date: NaiveDate,
            metric: Option<&str>,
        ) -> Result<Vec<String>, DomainError> {
            let mut emails: Vec<String> = Vec::new();
            for event in self.events.lock().unwrap().iter() {
                if event.event_date != date {
                    continue;
                }
                if let Some(metric) = metric {
                    if event.event_name != metric {
                        continue;
                    }
                }
                if let Some(email) = &event.email {
                    if !emails.contains(email) {
                        emails.push(email.clone());
                    }
                }
            }
            Ok(emails)
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

    struct MockProfileStore {
        profiles: Mutex<Vec<Profile>>,
    }

    impl MockProfileStore {
        fn new() -> Self {
            Self {
                profiles: Mutex::new(Vec::new()),
            }
        }

        fn with_profile(self, profile: Profile) -> Self {
            self.profiles.lock().unwrap().push(profile);
            self
        }

        fn stored(&self) -> Vec<Profile> {
            self.profiles.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProfileStore for MockProfileStore {
        async fn insert(&self, profile: &Profile) -> Result<(), DomainError> {
            self.profiles.lock().unwrap().push(profile.clone());
            Ok(())
        }

        async fn update(&self, profile: &Profile) -> Result<(), DomainError> {
            let mut profiles = self.profiles.lock().unwrap();
            let stored = profiles
                .iter_mut()
                .find(|p| p.id == profile.id)
                .ok_or_else(|| DomainError::internal("profile not found"))?;
            *stored = profile.clone();
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
            unimplemented!("not used by ingestion")
        }

        async fn count_orphaned(&self) -> Result<u64, DomainError> {
            unimplemented!("not used by ingestion")
        }

        async fn delete_by_ids(&self, _ids: &[Uuid]) -> Result<u64, DomainError> {
            unimplemented!("not used by ingestion")
        }
    }

    /// Klaviyo mock: `fail_sync` makes write calls return transport errors,
    /// `remote_profile` controls the fetch result, `calls` counts
    /// create_event invocations.
    struct MockKlaviyo {
        fail_sync: bool,
        fail_reads: bool,
        remote_profile: Option<RemoteProfile>,
        metrics: Vec<String>,
        calls: AtomicUsize,
    }

    impl MockKlaviyo {
        fn new() -> Self {
            Self {
                fail_sync: false,
                fail_reads: false,
                remote_profile: None,
                metrics: Vec::new(),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                fail_sync: true,
                fail_reads: true,
                ..Self::new()
            }
        }

        fn create_event_calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl KlaviyoGateway for MockKlaviyo {
        async fn create_event(
            &self,
            _submission: &EventSubmission,
        ) -> Result<Value, KlaviyoError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_sync {
                return Err(KlaviyoError::Transport("connection refused".to_string()));
            }
            Ok(json!({"data": {"type": "event", "id": "ev-1"}}))
        }

        async fn create_or_update_profile(
            &self,
            _email: &str,
            _attributes: &Attributes,
        ) -> Result<Value, KlaviyoError> {
            if self.fail_sync {
                return Err(KlaviyoError::Transport("connection refused".to_string()));
            }
            Ok(json!({"data": {"type": "profile", "id": "kp-1"}}))
        }

        async fn list_metrics(&self) -> Result<Vec<String>, KlaviyoError> {
            if self.fail_reads {
                return Err(KlaviyoError::NotConfigured);
            }
            Ok(self.metrics.clone())
        }

        async fn fetch_profile(
            &self,
            _email: &str,
        ) -> Result<Option<RemoteProfile>, KlaviyoError> {
            if self.fail_reads {
                return Err(KlaviyoError::Transport("connection refused".to_string()));
            }
            Ok(self.remote_profile.clone())
        }

        async fn list_events(
            &self,
            _profile_id: Option<&str>,
            _metric_id: Option<&str>,
        ) -> Result<Vec<Value>, KlaviyoError> {
            Ok(Vec::new())
        }

        async fn test_connection(&self) -> bool {
            !self.fail_reads
        }
    }

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect()
    }

    fn service(
        events: Arc<MockEventStore>,
        profiles: Arc<MockProfileStore>,
        klaviyo: Arc<MockKlaviyo>,
    ) -> EventIngestionService {
        EventIngestionService::new(events, profiles, klaviyo)
    }

    fn purchase(email: Option<&str>, profile_attributes: Option<Attributes>) -> NewEvent {
        NewEvent {
            event_name: "Purchase".to_string(),
            event_attributes: attrs(&[("sku", "A-1")]),
            profile_attributes,
            email: email.map(String::from),
        }
    }

    #[tokio::test]
    async fn new_email_creates_exactly_one_profile_and_one_event() {
        let events = Arc::new(MockEventStore::new());
        let profiles = Arc::new(MockProfileStore::new());
        let klaviyo = Arc::new(MockKlaviyo::new());
        let svc = service(events.clone(), profiles.clone(), klaviyo);

        let event = svc
            .create_event(purchase(Some("a@x.com"), Some(attrs(&[("firstName", "A")]))))
            .await
            .unwrap();

        let stored_profiles = profiles.stored();
        assert_eq!(stored_profiles.len(), 1);
        assert_eq!(events.stored().len(), 1);
        assert_eq!(event.profile_id, Some(stored_profiles[0].id));
        assert_eq!(
            stored_profiles[0].attributes.get("firstName"),
            Some(&json!("A"))
        );
    }

    #[tokio::test]
    async fn existing_profile_merges_attributes_with_overlay_semantics() {
        let existing = Profile::first_seen(
            "a@x.com",
            Some(&attrs(&[("firstName", "A"), ("city", "Berlin")])),
            "Signup",
            &Attributes::new(),
            Utc::now(),
        );
        let existing_id = existing.id;
        let profiles = Arc::new(MockProfileStore::new().with_profile(existing));
        let events = Arc::new(MockEventStore::new());
        let svc = service(events, profiles.clone(), Arc::new(MockKlaviyo::new()));

        let event = svc
            .create_event(purchase(Some("a@x.com"), Some(attrs(&[("firstName", "B")]))))
            .await
            .unwrap();

        let stored = profiles.stored();
        assert_eq!(stored.len(), 1, "no second profile for a known email");
        assert_eq!(event.profile_id, Some(existing_id));
        assert_eq!(stored[0].attributes.get("firstName"), Some(&json!("B")));
        assert_eq!(stored[0].attributes.get("city"), Some(&json!("Berlin")));
        assert_eq!(stored[0].last_event_name.as_deref(), Some("Purchase"));
    }

    #[tokio::test]
    async fn existing_profile_without_supplied_attributes_is_untouched() {
        let existing = Profile::first_seen(
            "a@x.com",
            Some(&attrs(&[("firstName", "A")])),
            "Signup",
            &Attributes::new(),
            Utc::now(),
        );
        let before = existing.clone();
        let profiles = Arc::new(MockProfileStore::new().with_profile(existing));
        let svc = service(
            Arc::new(MockEventStore::new()),
            profiles.clone(),
            Arc::new(MockKlaviyo::new()),
        );

        svc.create_event(purchase(Some("a@x.com"), None)).await.unwrap();

        let stored = profiles.stored();
        assert_eq!(stored[0].attributes, before.attributes);
        assert_eq!(stored[0].last_event_name, before.last_event_name);
    }

    #[tokio::test]
    async fn event_without_email_skips_profile_and_sync() {
        let events = Arc::new(MockEventStore::new());
        let profiles = Arc::new(MockProfileStore::new());
        let klaviyo = Arc::new(MockKlaviyo::new());
        let svc = service(events.clone(), profiles.clone(), klaviyo.clone());

        let event = svc.create_event(purchase(None, None)).await.unwrap();

        assert!(profiles.stored().is_empty());
        assert_eq!(klaviyo.create_event_calls(), 0);
        assert!(!event.sent_to_klaviyo);
        assert!(event.klaviyo_response.is_none());
        assert!(events.stored()[0].klaviyo_response.is_none());
    }

    #[tokio::test]
    async fn sync_failure_is_recorded_without_failing_the_call() {
        let events = Arc::new(MockEventStore::new());
        let svc = service(
            events.clone(),
            Arc::new(MockProfileStore::new()),
            Arc::new(MockKlaviyo::failing()),
        );

        let event = svc
            .create_event(purchase(Some("a@x.com"), None))
            .await
            .unwrap();

        assert!(!event.sent_to_klaviyo);
        let response = event.klaviyo_response.unwrap();
        assert!(response.contains("connection refused"), "got: {}", response);

        // The locally persisted row carries the same outcome.
        let stored = events.stored();
        assert!(!stored[0].sent_to_klaviyo);
        assert!(stored[0].klaviyo_response.is_some());
    }

    #[tokio::test]
    async fn successful_sync_records_remote_event_id() {
        let svc = service(
            Arc::new(MockEventStore::new()),
            Arc::new(MockProfileStore::new()),
            Arc::new(MockKlaviyo::new()),
        );

        let event = svc
            .create_event(purchase(Some("a@x.com"), None))
            .await
            .unwrap();

        assert!(event.sent_to_klaviyo);
        assert_eq!(event.klaviyo_response.as_deref(), Some("accepted: ev-1"));
    }

    #[tokio::test]
    async fn empty_event_name_is_rejected() {
        let svc = service(
            Arc::new(MockEventStore::new()),
            Arc::new(MockProfileStore::new()),
            Arc::new(MockKlaviyo::new()),
        );

        let result = svc
            .create_event(NewEvent {
                event_name: "  ".to_string(),
                event_attributes: Attributes::new(),
                profile_attributes: None,
                email: None,
            })
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn bulk_preserves_order_and_isolates_sync_failures() {
        let events = Arc::new(MockEventStore::new());
        let svc = service(
            events.clone(),
            Arc::new(MockProfileStore::new()),
            Arc::new(MockKlaviyo::failing()),
        );

        let inputs = vec![
            NewEvent {
                event_name: "First".to_string(),
                event_attributes: Attributes::new(),
                profile_attributes: None,
                email: Some("a@x.com".to_string()),
            },
            NewEvent {
                event_name: "Second".to_string(),
                event_attributes: Attributes::new(),
                profile_attributes: None,
                email: Some("b@x.com".to_string()),
            },
        ];

        let created = svc.create_bulk_events(inputs).await.unwrap();

        assert_eq!(created.len(), 2);
        assert_eq!(created[0].event_name, "First");
        assert_eq!(created[1].event_name, "Second");
        assert!(created.iter().all(|e| !e.sent_to_klaviyo));
        assert_eq!(events.stored().len(), 2);
    }

    #[tokio::test]
    async fn metrics_fall_back_to_local_names_on_remote_failure() {
        let events = Arc::new(MockEventStore::new());
        let svc = service(
            events.clone(),
            Arc::new(MockProfileStore::new()),
            Arc::new(MockKlaviyo::failing()),
        );

        svc.create_event(purchase(Some("a@x.com"), None)).await.unwrap();

        let metrics = svc.get_all_metrics().await.unwrap();
        assert_eq!(metrics, vec!["Purchase".to_string()]);
    }

    #[tokio::test]
    async fn metrics_prefer_remote_listing_when_available() {
        let klaviyo = Arc::new(MockKlaviyo {
            metrics: vec!["Remote Metric".to_string()],
            ..MockKlaviyo::new()
        });
        let svc = service(
            Arc::new(MockEventStore::new()),
            Arc::new(MockProfileStore::new()),
            klaviyo,
        );

        let metrics = svc.get_all_metrics().await.unwrap();
        assert_eq!(metrics, vec!["Remote Metric".to_string()]);
    }

    #[tokio::test]
    async fn profile_attributes_merge_remote_over_local() {
        let existing = Profile::first_seen(
            "a@x.com",
            Some(&attrs(&[("firstName", "local"), ("city", "Berlin")])),
            "Signup",
            &Attributes::new(),
            Utc::now(),
        );
        let profiles = Arc::new(MockProfileStore::new().with_profile(existing));
        let klaviyo = Arc::new(MockKlaviyo {
            remote_profile: Some(RemoteProfile {
                id: "kp-1".to_string(),
                attributes: attrs(&[("firstName", "remote"), ("plan", "pro")]),
            }),
            ..MockKlaviyo::new()
        });
        let svc = service(Arc::new(MockEventStore::new()), profiles.clone(), klaviyo);

        let profile = svc.get_profile_attributes("a@x.com").await.unwrap().unwrap();

        assert_eq!(profile.attributes.get("firstName"), Some(&json!("remote")));
        assert_eq!(profile.attributes.get("city"), Some(&json!("Berlin")));
        assert_eq!(profile.attributes.get("plan"), Some(&json!("pro")));
        assert_eq!(profile.klaviyo_profile_id.as_deref(), Some("kp-1"));
        // And the merge is persisted locally.
        assert_eq!(
            profiles.stored()[0].attributes.get("firstName"),
            Some(&json!("remote"))
        );
    }

    #[tokio::test]
    async fn profile_attributes_create_local_record_from_remote_hit() {
        let profiles = Arc::new(MockProfileStore::new());
        let klaviyo = Arc::new(MockKlaviyo {
            remote_profile: Some(RemoteProfile {
                id: "kp-9".to_string(),
                attributes: attrs(&[("firstName", "R")]),
            }),
            ..MockKlaviyo::new()
        });
        let svc = service(Arc::new(MockEventStore::new()), profiles.clone(), klaviyo);

        let profile = svc.get_profile_attributes("new@x.com").await.unwrap().unwrap();

        assert_eq!(profiles.stored().len(), 1);
        assert_eq!(profile.email, "new@x.com");
        assert_eq!(profile.klaviyo_profile_id.as_deref(), Some("kp-9"));
    }

    #[tokio::test]
    async fn profile_attributes_fall_back_to_local_on_remote_failure() {
        let existing = Profile::first_seen(
            "a@x.com",
            Some(&attrs(&[("firstName", "A")])),
            "Signup",
            &Attributes::new(),
            Utc::now(),
        );
        let profiles = Arc::new(MockProfileStore::new().with_profile(existing));
        let svc = service(
            Arc::new(MockEventStore::new()),
            profiles,
            Arc::new(MockKlaviyo::failing()),
        );

        let profile = svc.get_profile_attributes("a@x.com").await.unwrap().unwrap();
        assert_eq!(profile.attributes.get("firstName"), Some(&json!("A")));
        assert!(profile.klaviyo_profile_id.is_none());
    }

    #[tokio::test]
    async fn profile_metrics_are_local_distinct_names() {
        let events = Arc::new(MockEventStore::new());
        let svc = service(
            events,
            Arc::new(MockProfileStore::new()),
            Arc::new(MockKlaviyo::new()),
        );

        svc.create_event(purchase(Some("a@x.com"), None)).await.unwrap();
        svc.create_event(purchase(Some("a@x.com"), None)).await.unwrap();
        svc.create_event(NewEvent {
            event_name: "Signup".to_string(),
            event_attributes: Attributes::new(),
            profile_attributes: None,
            email: Some("b@x.com".to_string()),
        })
        .await
        .unwrap();

        let metrics = svc.get_profile_metrics("a@x.com").await.unwrap();
        assert_eq!(metrics, vec!["Purchase".to_string()]);
    }

    #[test]
    fn sync_marker_extracts_remote_id_when_present() {
        assert_eq!(
            sync_marker(&json!({"data": {"id": "ev-42"}})),
            "accepted: ev-42"
        );
        assert_eq!(sync_marker(&json!({})), "accepted");
    }
}
