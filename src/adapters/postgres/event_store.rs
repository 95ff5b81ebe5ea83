//! PostgreSQL adapter for the EventStore port.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::event::Event;
use crate::domain::foundation::DomainError;
use crate::ports::EventStore;

/// PostgreSQL implementation of the EventStore port.
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn insert(&self, event: &Event) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO events (
                id, event_name, event_attributes, profile_attributes,
                email, profile_id, event_date, sent_to_klaviyo,
                klaviyo_response, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(event.id)
        .bind(&event.event_name)
        .bind(event.event_attributes.clone().into_value())
        .bind(event.profile_attributes.clone().into_value())
        .bind(&event.email)
        .bind(event.profile_id)
        .bind(event.event_date)
        .bind(event.sent_to_klaviyo)
        .bind(&event.klaviyo_response)
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DomainError::database)?;

        Ok(())
    }

    async fn record_sync_outcome(
        &self,
        id: Uuid,
        sent_to_klaviyo: bool,
        response: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE events
            SET sent_to_klaviyo = $2, klaviyo_response = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(sent_to_klaviyo)
        .bind(response)
        .bind(updated_at)
        .execute(&self.pool)
        .await
        .map_err(DomainError::database)?;

        Ok(())
    }

    async fn distinct_event_names(&self) -> Result<Vec<String>, DomainError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT event_name FROM events ORDER BY event_name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DomainError::database)?;

        Ok(names)
    }

    async fn distinct_event_names_for_email(
        &self,
        email: &str,
    ) -> Result<Vec<String>, DomainError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT event_name FROM events WHERE email = $1 ORDER BY event_name",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .map_err(DomainError::database)?;

        Ok(names)
    }

    async fn count_by_date_and_metric(
        &self,
        date: NaiveDate,
        metric: &str,
    ) -> Result<u64, DomainError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM events WHERE event_date = $1 AND event_name = $2",
        )
        .bind(date)
        .bind(metric)
        .fetch_one(&self.pool)
        .await
        .map_err(DomainError::database)?;

        Ok(count as u64)
    }

    async fn distinct_emails_by_date(
        &self,
        date: NaiveDate,
        metric: Option<&str>,
    ) -> Result<Vec<String>, DomainError> {
        let query = match metric {
            Some(metric) => sqlx::query_scalar::<_, String>(
                r#"
                SELECT DISTINCT email FROM events
                WHERE event_date = $1 AND event_name = $2 AND email IS NOT NULL
                ORDER BY email
                "#,
            )
            .bind(date)
            .bind(metric),
            None => sqlx::query_scalar::<_, String>(
                r#"
                SELECT DISTINCT email FROM events
                WHERE event_date = $1 AND email IS NOT NULL
                ORDER BY email
                "#,
            )
            .bind(date),
        };

        query.fetch_all(&self.pool).await.map_err(DomainError::database)
    }

    async fn count_all(&self) -> Result<u64, DomainError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await
            .map_err(DomainError::database)?;

        Ok(count as u64)
    }

    async fn count_older_than(&self, cutoff: NaiveDate) -> Result<u64, DomainError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM events WHERE event_date < $1",
        )
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await
        .map_err(DomainError::database)?;

        Ok(count as u64)
    }

    async fn delete_older_than(&self, cutoff: NaiveDate) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM events WHERE event_date < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(DomainError::database)?;

        Ok(result.rows_affected())
    }
}
