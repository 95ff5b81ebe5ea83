//! ProfileStore port for profile persistence operations.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::foundation::DomainError;
use crate::domain::profile::Profile;

/// Persistence for customer profiles, keyed by email.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Creates a new profile.
    async fn insert(&self, profile: &Profile) -> Result<(), DomainError>;

    /// Updates an existing profile.
    async fn update(&self, profile: &Profile) -> Result<(), DomainError>;

    /// Finds a profile by its email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, DomainError>;

    /// Total number of stored profiles.
    async fn count_all(&self) -> Result<u64, DomainError>;

    /// Profiles with no event referencing their email. The join is on email,
    /// never on the `profile_id` stored in events.
    async fn find_orphaned(&self) -> Result<Vec<Profile>, DomainError>;

    /// Number of orphaned profiles, without loading them.
    async fn count_orphaned(&self) -> Result<u64, DomainError>;

    /// Deletes the given profiles in one batch, returning the number removed.
    async fn delete_by_ids(&self, ids: &[Uuid]) -> Result<u64, DomainError>;
}
