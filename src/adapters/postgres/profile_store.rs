//! PostgreSQL adapter for the ProfileStore port.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::foundation::{Attributes, DomainError};
use crate::domain::profile::Profile;
use crate::ports::ProfileStore;

/// PostgreSQL implementation of the ProfileStore port.
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn from_row(row: &PgRow) -> Profile {
        Profile {
            id: row.get("id"),
            email: row.get("email"),
            klaviyo_profile_id: row.get("klaviyo_profile_id"),
            attributes: Attributes::from_value(row.get("attributes")),
            last_event_attributes: Attributes::from_value(row.get("last_event_attributes")),
            last_event_name: row.get("last_event_name"),
            last_event_date: row.get("last_event_date"),
            is_active: row.get("is_active"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn insert(&self, profile: &Profile) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO profiles (
                id, email, klaviyo_profile_id, attributes,
                last_event_attributes, last_event_name, last_event_date,
                is_active, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(profile.id)
        .bind(&profile.email)
        .bind(&profile.klaviyo_profile_id)
        .bind(profile.attributes.clone().into_value())
        .bind(profile.last_event_attributes.clone().into_value())
        .bind(&profile.last_event_name)
        .bind(profile.last_event_date)
        .bind(profile.is_active)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DomainError::database)?;

        Ok(())
    }

    async fn update(&self, profile: &Profile) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE profiles
            SET klaviyo_profile_id = $2,
                attributes = $3,
                last_event_attributes = $4,
                last_event_name = $5,
                last_event_date = $6,
                is_active = $7,
                updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(profile.id)
        .bind(&profile.klaviyo_profile_id)
        .bind(profile.attributes.clone().into_value())
        .bind(profile.last_event_attributes.clone().into_value())
        .bind(&profile.last_event_name)
        .bind(profile.last_event_date)
        .bind(profile.is_active)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DomainError::database)?;

        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, DomainError> {
        let row = sqlx::query("SELECT * FROM profiles WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(DomainError::database)?;

        Ok(row.as_ref().map(Self::from_row))
    }

    async fn count_all(&self) -> Result<u64, DomainError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM profiles")
            .fetch_one(&self.pool)
            .await
            .map_err(DomainError::database)?;

        Ok(count as u64)
    }

    async fn find_orphaned(&self) -> Result<Vec<Profile>, DomainError> {
        // Orphan detection joins on email, not on events.profile_id.
        let rows = sqlx::query(
            r#"
            SELECT p.* FROM profiles p
            LEFT JOIN events e ON e.email = p.email
            WHERE e.id IS NULL
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DomainError::database)?;

        Ok(rows.iter().map(Self::from_row).collect())
    }

    async fn count_orphaned(&self) -> Result<u64, DomainError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM profiles p
            LEFT JOIN events e ON e.email = p.email
            WHERE e.id IS NULL
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(DomainError::database)?;

        Ok(count as u64)
    }

    async fn delete_by_ids(&self, ids: &[Uuid]) -> Result<u64, DomainError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM profiles WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(DomainError::database)?;

        Ok(result.rows_affected())
    }
}
