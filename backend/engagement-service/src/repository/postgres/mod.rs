//! sqlx/PostgreSQL implementations of the repository traits

mod comments;
mod likes;
mod playlists;
mod subscriptions;
mod tweets;
mod users;
mod videos;

pub use comments::PgCommentRepository;
pub use likes::PgLikeRepository;
pub use playlists::PgPlaylistRepository;
pub use subscriptions::PgSubscriptionRepository;
pub use tweets::PgTweetRepository;
pub use users::{PgHealth, PgUserRepository};
pub use videos::PgVideoRepository;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{OwnerSummary, VideoCard};
use crate::error::AppError;
use crate::repository::ToggleOutcome;

/// SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE for foreign_key_violation
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Columns read into [`VideoCardRow`]; expects `videos v` joined with `users u`.
pub(crate) const VIDEO_CARD_COLUMNS: &str = r#"
    v.id, v.title, v.description, v.video_url, v.thumbnail_url,
    v.duration_seconds, v.view_count, v.is_published, v.created_at,
    u.id AS owner_id, u.username AS owner_username, u.display_name AS owner_display_name
"#;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct VideoCardRow {
    id: Uuid,
    title: String,
    description: String,
    video_url: String,
    thumbnail_url: String,
    duration_seconds: f64,
    view_count: i64,
    is_published: bool,
    created_at: DateTime<Utc>,
    owner_id: Uuid,
    owner_username: String,
    owner_display_name: String,
}

impl From<VideoCardRow> for VideoCard {
    fn from(row: VideoCardRow) -> Self {
        VideoCard {
            id: row.id,
            title: row.title,
            description: row.description,
            video_url: row.video_url,
            thumbnail_url: row.thumbnail_url,
            duration_seconds: row.duration_seconds,
            view_count: row.view_count,
            is_published: row.is_published,
            created_at: row.created_at,
            owner: OwnerSummary {
                id: row.owner_id,
                username: row.owner_username,
                display_name: row.owner_display_name,
            },
        }
    }
}

/// `(removed, inserted)` flags returned by the toggle statements
pub(crate) fn toggle_outcome(removed: bool, inserted: bool) -> ToggleOutcome {
    match (removed, inserted) {
        (true, _) => ToggleOutcome::Deleted,
        (false, true) => ToggleOutcome::Inserted,
        (false, false) => ToggleOutcome::Conflicted,
    }
}

fn has_sqlstate(err: &sqlx::Error, state: &str) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(state),
        _ => false,
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    has_sqlstate(err, UNIQUE_VIOLATION)
}

/// A row referenced by the write (actor, channel, video, playlist) was
/// removed between the existence check and the statement; reported as
/// `NotFound` instead of a server error.
pub(crate) fn missing_reference(err: sqlx::Error, what: &str) -> AppError {
    if has_sqlstate(&err, FOREIGN_KEY_VIOLATION) {
        AppError::not_found(format!("{} not found", what))
    } else {
        AppError::Database(err)
    }
}
