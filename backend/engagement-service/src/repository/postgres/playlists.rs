use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::missing_reference;
use crate::domain::{OwnerSummary, Playlist, PlaylistDetail, PlaylistSummary, PlaylistVideo};
use crate::error::{AppError, Result};
use crate::repository::PlaylistRepository;

#[derive(Clone)]
pub struct PgPlaylistRepository {
    pool: PgPool,
}

impl PgPlaylistRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PlaylistHeaderRow {
    id: Uuid,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
    owner_id: Uuid,
    owner_username: String,
    owner_display_name: String,
}

#[async_trait]
impl PlaylistRepository for PgPlaylistRepository {
    async fn playlists_by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PlaylistSummary>, i64)> {
        let playlists = sqlx::query_as::<_, PlaylistSummary>(
            r#"
            SELECT p.id, p.name, p.description, p.created_at,
                   COALESCE(
                       array_agg(pv.video_id ORDER BY pv.position)
                           FILTER (WHERE pv.video_id IS NOT NULL),
                       '{}'::uuid[]
                   ) AS video_ids
            FROM playlists p
            LEFT JOIN playlist_videos pv ON pv.playlist_id = p.id
            WHERE p.owner_id = $1
            GROUP BY p.id
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM playlists WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((playlists, total))
    }

    async fn find_playlist_detail(&self, playlist_id: Uuid) -> Result<Option<PlaylistDetail>> {
        let header = sqlx::query_as::<_, PlaylistHeaderRow>(
            r#"
            SELECT p.id, p.name, p.description, p.created_at,
                   u.id AS owner_id, u.username AS owner_username,
                   u.display_name AS owner_display_name
            FROM playlists p
            JOIN users u ON u.id = p.owner_id
            WHERE p.id = $1
            "#,
        )
        .bind(playlist_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let videos = sqlx::query_as::<_, PlaylistVideo>(
            r#"
            SELECT v.id, v.title, v.description, v.thumbnail_url
            FROM playlist_videos pv
            JOIN videos v ON v.id = pv.video_id
            WHERE pv.playlist_id = $1
            ORDER BY pv.position
            "#,
        )
        .bind(playlist_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(PlaylistDetail {
            id: header.id,
            name: header.name,
            description: header.description,
            created_at: header.created_at,
            owner: OwnerSummary {
                id: header.owner_id,
                username: header.owner_username,
                display_name: header.owner_display_name,
            },
            videos,
        }))
    }

    async fn find_playlist(&self, playlist_id: Uuid) -> Result<Option<Playlist>> {
        let playlist = sqlx::query_as::<_, Playlist>(
            r#"
            SELECT p.id, p.owner_id, p.name, p.description, p.created_at,
                   COALESCE(
                       array_agg(pv.video_id ORDER BY pv.position)
                           FILTER (WHERE pv.video_id IS NOT NULL),
                       '{}'::uuid[]
                   ) AS video_ids
            FROM playlists p
            LEFT JOIN playlist_videos pv ON pv.playlist_id = p.id
            WHERE p.id = $1
            GROUP BY p.id
            "#,
        )
        .bind(playlist_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(playlist)
    }

    async fn create_playlist(&self, playlist: &Playlist) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO playlists (id, owner_id, name, description, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(playlist.id)
        .bind(playlist.owner_id)
        .bind(&playlist.name)
        .bind(&playlist.description)
        .bind(playlist.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| missing_reference(e, "User"))?;

        Ok(())
    }

    async fn update_playlist(
        &self,
        playlist_id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE playlists
            SET name = COALESCE($2, name),
                description = COALESCE($3, description)
            WHERE id = $1
            "#,
        )
        .bind(playlist_id)
        .bind(name)
        .bind(description)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn delete_playlist(&self, playlist_id: Uuid) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM playlists WHERE id = $1")
            .bind(playlist_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn add_playlist_video(&self, playlist_id: Uuid, video_id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        // Row lock serialises appends to one playlist, so MAX(position) is stable
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM playlists WHERE id = $1 FOR UPDATE")
                .bind(playlist_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(AppError::not_found("Playlist not found"));
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO playlist_videos (playlist_id, video_id, position)
            SELECT $1, $2, COALESCE(MAX(position), 0) + 1
            FROM playlist_videos
            WHERE playlist_id = $1
            ON CONFLICT (playlist_id, video_id) DO NOTHING
            "#,
        )
        .bind(playlist_id)
        .bind(video_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| missing_reference(e, "Video"))?
        .rows_affected();

        tx.commit().await?;
        Ok(inserted == 1)
    }

    async fn remove_playlist_video(&self, playlist_id: Uuid, video_id: Uuid) -> Result<bool> {
        let removed =
            sqlx::query("DELETE FROM playlist_videos WHERE playlist_id = $1 AND video_id = $2")
                .bind(playlist_id)
                .bind(video_id)
                .execute(&self.pool)
                .await?
                .rows_affected();

        Ok(removed > 0)
    }
}
