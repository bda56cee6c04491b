use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    is_unique_violation, missing_reference, toggle_outcome, VideoCardRow, VIDEO_CARD_COLUMNS,
};
use crate::domain::{LikeKey, TargetKind, VideoCard};
use crate::error::Result;
use crate::repository::{LikeRepository, RelationStore, ToggleOutcome};

/// Repository for Like rows
#[derive(Clone)]
pub struct PgLikeRepository {
    pool: PgPool,
}

impl PgLikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RelationStore<LikeKey> for PgLikeRepository {
    /// Delete-or-insert in one statement. The insert only runs when nothing
    /// was deleted, and the unique constraint turns a racing insert into a
    /// no-op instead of a duplicate.
    async fn toggle(&self, key: &LikeKey) -> Result<ToggleOutcome> {
        let result = sqlx::query_as::<_, (bool, bool)>(
            r#"
            WITH removed AS (
                DELETE FROM likes
                WHERE target_kind = $1 AND target_id = $2 AND liked_by = $3
                RETURNING id
            ),
            inserted AS (
                INSERT INTO likes (id, target_kind, target_id, liked_by, created_at)
                SELECT $4, $1, $2, $3, NOW()
                WHERE NOT EXISTS (SELECT 1 FROM removed)
                ON CONFLICT (target_kind, target_id, liked_by) DO NOTHING
                RETURNING id
            )
            SELECT EXISTS(SELECT 1 FROM removed), EXISTS(SELECT 1 FROM inserted)
            "#,
        )
        .bind(key.kind.as_str())
        .bind(key.target_id)
        .bind(key.liked_by)
        .bind(Uuid::new_v4())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok((removed, inserted)) => Ok(toggle_outcome(removed, inserted)),
            Err(e) if is_unique_violation(&e) => Ok(ToggleOutcome::Conflicted),
            Err(e) => Err(missing_reference(e, "User")),
        }
    }

    async fn exists(&self, key: &LikeKey) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM likes
                WHERE target_kind = $1 AND target_id = $2 AND liked_by = $3
            )
            "#,
        )
        .bind(key.kind.as_str())
        .bind(key.target_id)
        .bind(key.liked_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

#[async_trait]
impl LikeRepository for PgLikeRepository {
    async fn liked_videos(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<VideoCard>, i64)> {
        let query = format!(
            r#"
            SELECT {}
            FROM likes l
            JOIN videos v ON v.id = l.target_id
            JOIN users u ON u.id = v.owner_id
            WHERE l.liked_by = $1 AND l.target_kind = $2
            ORDER BY l.created_at DESC, l.id DESC
            LIMIT $3 OFFSET $4
            "#,
            VIDEO_CARD_COLUMNS
        );

        let rows = sqlx::query_as::<_, VideoCardRow>(&query)
            .bind(user_id)
            .bind(TargetKind::Video.as_str())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM likes l
            JOIN videos v ON v.id = l.target_id
            WHERE l.liked_by = $1 AND l.target_kind = $2
            "#,
        )
        .bind(user_id)
        .bind(TargetKind::Video.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(VideoCard::from).collect(), total))
    }

    async fn count_likes_on_owner_videos(&self, owner_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM likes l
            JOIN videos v ON v.id = l.target_id
            WHERE l.target_kind = $1 AND v.owner_id = $2
            "#,
        )
        .bind(TargetKind::Video.as_str())
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
