//! Marketing event entity.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::foundation::Attributes;

/// Input for a single event ingestion call.
///
/// `profile_attributes` distinguishes "not provided" from "provided but
/// empty": an existing profile is only touched when attributes were supplied
/// alongside the event.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub event_name: String,
    pub event_attributes: Attributes,
    pub profile_attributes: Option<Attributes>,
    pub email: Option<String>,
}

/// A persisted marketing event.
///
/// Events are created once per ingestion call and mutated exactly once more,
/// to record the outcome of the Klaviyo sync attempt. Deletion happens only
/// through retention cleanup.
#[derive(Debug, Clone)]
pub struct Event {
    pub id: Uuid,
    pub event_name: String,
    pub event_attributes: Attributes,
    /// Attributes supplied alongside this specific event, distinct from the
    /// accumulated attributes on the linked profile.
    pub profile_attributes: Attributes,
    pub email: Option<String>,
    /// Back-reference to the linked profile, resolved at creation time and
    /// never updated afterwards.
    pub profile_id: Option<Uuid>,
    /// Calendar day the event was recorded. Always derived from creation
    /// time, never caller-supplied; retention and count filters operate on
    /// this column.
    pub event_date: NaiveDate,
    pub sent_to_klaviyo: bool,
    pub klaviyo_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Records a new event from an ingestion input.
    pub fn record(input: &NewEvent, profile_id: Option<Uuid>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_name: input.event_name.clone(),
            event_attributes: input.event_attributes.clone(),
            profile_attributes: input.profile_attributes.clone().unwrap_or_default(),
            email: input.email.clone(),
            profile_id,
            event_date: now.date_naive(),
            sent_to_klaviyo: false,
            klaviyo_response: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks the event as successfully delivered to Klaviyo.
    pub fn mark_synced(&mut self, marker: String, now: DateTime<Utc>) {
        self.sent_to_klaviyo = true;
        self.klaviyo_response = Some(marker);
        self.updated_at = now;
    }

    /// Records a failed sync attempt without touching local durability.
    pub fn mark_sync_failed(&mut self, reason: String, now: DateTime<Utc>) {
        self.sent_to_klaviyo = false;
        self.klaviyo_response = Some(reason);
        self.updated_at = now;
    }
}
