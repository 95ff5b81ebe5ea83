//! Customer profile entity.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::foundation::Attributes;

/// A durable record representing one person, keyed by email.
///
/// Attributes accumulate across events via shallow merge; the `last_event_*`
/// fields are a denormalized cache of the most recent event seen for this
/// profile. The linkage to events is a soft reference on the email column,
/// not an enforced foreign key.
#[derive(Debug, Clone)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    /// Remote identifier, set after the first successful Klaviyo linkage.
    pub klaviyo_profile_id: Option<String>,
    pub attributes: Attributes,
    pub last_event_attributes: Attributes,
    pub last_event_name: Option<String>,
    pub last_event_date: Option<DateTime<Utc>>,
    /// Defaults to true; no operation currently transitions it.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Creates a profile from the first event seen for an email.
    pub fn first_seen(
        email: &str,
        profile_attributes: Option<&Attributes>,
        event_name: &str,
        event_attributes: &Attributes,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.to_string(),
            klaviyo_profile_id: None,
            attributes: profile_attributes.cloned().unwrap_or_default(),
            last_event_attributes: event_attributes.clone(),
            last_event_name: Some(event_name.to_string()),
            last_event_date: Some(now),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a local profile seeded from a Klaviyo lookup when no local
    /// record exists yet.
    pub fn from_remote(
        email: &str,
        remote_id: &str,
        remote_attributes: &Attributes,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.to_string(),
            klaviyo_profile_id: Some(remote_id.to_string()),
            attributes: remote_attributes.clone(),
            last_event_attributes: Attributes::new(),
            last_event_name: None,
            last_event_date: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies an event that carried profile attributes: merges them into the
    /// stored map (incoming keys win, untouched keys survive) and refreshes
    /// the last-event cache.
    pub fn apply_event(
        &mut self,
        profile_attributes: &Attributes,
        event_name: &str,
        event_attributes: &Attributes,
        now: DateTime<Utc>,
    ) {
        self.attributes.merge(profile_attributes);
        self.last_event_attributes = event_attributes.clone();
        self.last_event_name = Some(event_name.to_string());
        self.last_event_date = Some(now);
        self.updated_at = now;
    }

    /// Overlays remote attributes onto the local map (remote wins on shared
    /// keys, local-only keys survive) and records the remote linkage.
    pub fn merge_remote(
        &mut self,
        remote_id: &str,
        remote_attributes: &Attributes,
        now: DateTime<Utc>,
    ) {
        self.attributes.merge(remote_attributes);
        self.klaviyo_profile_id = Some(remote_id.to_string());
        self.updated_at = now;
    }
}
