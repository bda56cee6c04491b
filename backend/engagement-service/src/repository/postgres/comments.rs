use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::missing_reference;
use crate::domain::{Comment, CommentView, OwnerSummary, TargetKind};
use crate::error::Result;
use crate::repository::CommentRepository;

#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    video_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
    owner_id: Uuid,
    owner_username: String,
    owner_display_name: String,
}

impl From<CommentRow> for CommentView {
    fn from(row: CommentRow) -> Self {
        CommentView {
            id: row.id,
            video_id: row.video_id,
            content: row.content,
            created_at: row.created_at,
            owner: OwnerSummary {
                id: row.owner_id,
                username: row.owner_username,
                display_name: row.owner_display_name,
            },
        }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn comment_exists(&self, comment_id: Uuid) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM comments WHERE id = $1)")
                .bind(comment_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn find_comment(&self, comment_id: Uuid) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, video_id, owner_id, content, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn create_comment(&self, comment: &Comment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, video_id, owner_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(comment.id)
        .bind(comment.video_id)
        .bind(comment.owner_id)
        .bind(&comment.content)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| missing_reference(e, "Video"))?;

        Ok(())
    }

    async fn update_comment(&self, comment_id: Uuid, content: &str) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET content = $2
            WHERE id = $1
            RETURNING id, video_id, owner_id, content, created_at
            "#,
        )
        .bind(comment_id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn delete_comment(&self, comment_id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM likes WHERE target_kind = $1 AND target_id = $2")
            .bind(TargetKind::Comment.as_str())
            .bind(comment_id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
    }

    async fn comments_for_video(
        &self,
        video_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<CommentView>, i64)> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT c.id, c.video_id, c.content, c.created_at,
                   u.id AS owner_id, u.username AS owner_username,
                   u.display_name AS owner_display_name
            FROM comments c
            JOIN users u ON u.id = c.owner_id
            WHERE c.video_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(video_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE video_id = $1")
            .bind(video_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((rows.into_iter().map(CommentView::from).collect(), total))
    }
}
