use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{is_unique_violation, missing_reference, toggle_outcome};
use crate::domain::{OwnerSummary, SubscriptionKey};
use crate::error::Result;
use crate::repository::{RelationStore, SubscriptionRepository, ToggleOutcome};

/// Repository for channel subscriptions
#[derive(Clone)]
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RelationStore<SubscriptionKey> for PgSubscriptionRepository {
    async fn toggle(&self, key: &SubscriptionKey) -> Result<ToggleOutcome> {
        let result = sqlx::query_as::<_, (bool, bool)>(
            r#"
            WITH removed AS (
                DELETE FROM subscriptions
                WHERE channel_id = $1 AND subscriber_id = $2
                RETURNING id
            ),
            inserted AS (
                INSERT INTO subscriptions (id, channel_id, subscriber_id, created_at)
                SELECT $3, $1, $2, NOW()
                WHERE NOT EXISTS (SELECT 1 FROM removed)
                ON CONFLICT (channel_id, subscriber_id) DO NOTHING
                RETURNING id
            )
            SELECT EXISTS(SELECT 1 FROM removed), EXISTS(SELECT 1 FROM inserted)
            "#,
        )
        .bind(key.channel_id)
        .bind(key.subscriber_id)
        .bind(Uuid::new_v4())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok((removed, inserted)) => Ok(toggle_outcome(removed, inserted)),
            Err(e) if is_unique_violation(&e) => Ok(ToggleOutcome::Conflicted),
            Err(e) => Err(missing_reference(e, "User")),
        }
    }

    async fn exists(&self, key: &SubscriptionKey) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM subscriptions
                WHERE channel_id = $1 AND subscriber_id = $2
            )
            "#,
        )
        .bind(key.channel_id)
        .bind(key.subscriber_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn count_subscribers(&self, channel_id: Uuid) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE channel_id = $1")
                .bind(channel_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn subscribers_of(
        &self,
        channel_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<OwnerSummary>, i64)> {
        let subscribers = sqlx::query_as::<_, OwnerSummary>(
            r#"
            SELECT u.id, u.username, u.display_name
            FROM subscriptions s
            JOIN users u ON u.id = s.subscriber_id
            WHERE s.channel_id = $1
            ORDER BY s.created_at DESC, s.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(channel_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total = self.count_subscribers(channel_id).await?;

        Ok((subscribers, total))
    }

    async fn channels_of(
        &self,
        subscriber_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<OwnerSummary>, i64)> {
        let channels = sqlx::query_as::<_, OwnerSummary>(
            r#"
            SELECT u.id, u.username, u.display_name
            FROM subscriptions s
            JOIN users u ON u.id = s.channel_id
            WHERE s.subscriber_id = $1
            ORDER BY s.created_at DESC, s.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(subscriber_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE subscriber_id = $1")
                .bind(subscriber_id)
                .fetch_one(&self.pool)
                .await?;

        Ok((channels, total))
    }
}
