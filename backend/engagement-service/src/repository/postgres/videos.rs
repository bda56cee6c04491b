use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{VideoCardRow, VIDEO_CARD_COLUMNS};
use crate::domain::{VideoCard, VideoQuery, VideoTotals};
use crate::error::Result;
use crate::repository::VideoRepository;

#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Owner and text filters shared by the count and page statements
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &VideoQuery) {
    qb.push(" WHERE TRUE");

    if let Some(owner_id) = query.owner_id {
        qb.push(" AND v.owner_id = ").push_bind(owner_id);
    }

    if let Some(pattern) = query.search_pattern() {
        qb.push(" AND (v.title ILIKE ")
            .push_bind(pattern.clone())
            .push(r" ESCAPE '\' OR v.description ILIKE ")
            .push_bind(pattern)
            .push(r" ESCAPE '\')");
    }
}

#[async_trait]
impl VideoRepository for PgVideoRepository {
    async fn video_exists(&self, video_id: Uuid) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM videos WHERE id = $1)")
                .bind(video_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn find_video(&self, video_id: Uuid) -> Result<Option<VideoCard>> {
        let query = format!(
            r#"
            SELECT {}
            FROM videos v
            JOIN users u ON u.id = v.owner_id
            WHERE v.id = $1
            "#,
            VIDEO_CARD_COLUMNS
        );

        let row = sqlx::query_as::<_, VideoCardRow>(&query)
            .bind(video_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(VideoCard::from))
    }

    async fn toggle_published(&self, video_id: Uuid) -> Result<Option<bool>> {
        let published: Option<bool> = sqlx::query_scalar(
            r#"
            UPDATE videos
            SET is_published = NOT is_published
            WHERE id = $1
            RETURNING is_published
            "#,
        )
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(published)
    }

    async fn search_videos(&self, query: &VideoQuery) -> Result<(Vec<VideoCard>, i64)> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM videos v");
        push_filters(&mut count_qb, query);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut page_qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM videos v JOIN users u ON u.id = v.owner_id",
            VIDEO_CARD_COLUMNS
        ));
        push_filters(&mut page_qb, query);

        // Sort keys and direction come from closed enums, never from raw input
        let direction = query.direction.sql();
        page_qb.push(" ORDER BY ");
        for key in query.sort.sort_keys() {
            page_qb.push(format!("{} {}, ", key, direction));
        }
        page_qb.push(format!("v.id {} LIMIT ", direction));
        page_qb
            .push_bind(query.limit)
            .push(" OFFSET ")
            .push_bind(query.offset);

        let rows: Vec<VideoCardRow> = page_qb.build_query_as().fetch_all(&self.pool).await?;

        Ok((rows.into_iter().map(VideoCard::from).collect(), total))
    }

    async fn videos_by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<VideoCard>, i64)> {
        let query = format!(
            r#"
            SELECT {}
            FROM videos v
            JOIN users u ON u.id = v.owner_id
            WHERE v.owner_id = $1
            ORDER BY v.created_at DESC, v.id DESC
            LIMIT $2 OFFSET $3
            "#,
            VIDEO_CARD_COLUMNS
        );

        let rows = sqlx::query_as::<_, VideoCardRow>(&query)
            .bind(owner_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM videos WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((rows.into_iter().map(VideoCard::from).collect(), total))
    }

    async fn owner_totals(&self, owner_id: Uuid) -> Result<VideoTotals> {
        let (count, views): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(view_count), 0)::BIGINT
            FROM videos
            WHERE owner_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(VideoTotals { count, views })
    }
}
