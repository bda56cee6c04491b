//! Content engine: owner-checked writes for comments, tweets, playlists and
//! video publish state, plus single-video lookup.
//!
//! Request bodies are validated before the store is touched. Mutations of an
//! existing row are only applied for its owner; anyone else gets `Forbidden`.

use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::domain::{
    parse_id, Comment, CommentView, OwnerSummary, Playlist, PublishState, Tweet, VideoCard,
};
use crate::error::{AppError, Result};
use crate::metrics;
use crate::repository::Repositories;

/// Longest accepted playlist name; matches the column width
pub const MAX_PLAYLIST_NAME_CHARS: usize = 255;

/// `{content}` body of comment and tweet writes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentBody {
    pub content: Option<String>,
}

/// `{name, description}` body of playlist writes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistBody {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Trimmed text, or `None` when absent or blank
fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn required(value: Option<&str>, message: &str) -> Result<String> {
    non_blank(value).ok_or_else(|| AppError::invalid(message))
}

fn playlist_name(name: String) -> Result<String> {
    if name.chars().count() > MAX_PLAYLIST_NAME_CHARS {
        return Err(AppError::invalid(format!(
            "Playlist name must be at most {} characters",
            MAX_PLAYLIST_NAME_CHARS
        )));
    }
    Ok(name)
}

fn ensure_owner(owner_id: Uuid, actor_id: Uuid, action: &str) -> Result<()> {
    if owner_id == actor_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "You are not authorized to {}",
            action
        )))
    }
}

#[derive(Clone)]
pub struct ContentEngine {
    repos: Repositories,
}

impl ContentEngine {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn video_by_id(&self, video_id: &str) -> Result<VideoCard> {
        let video_id = parse_id("video", video_id)?;
        self.repos
            .videos
            .find_video(video_id)
            .await?
            .ok_or_else(|| AppError::not_found("Video not found"))
    }

    pub async fn toggle_publish(&self, video_id: &str, actor_id: Uuid) -> Result<PublishState> {
        let video = self.video_by_id(video_id).await?;
        ensure_owner(video.owner.id, actor_id, "change this video")?;

        let is_published = self
            .repos
            .videos
            .toggle_published(video.id)
            .await?
            .ok_or_else(|| AppError::not_found("Video not found"))?;

        metrics::record_write("video", "publish");
        info!(video_id = %video.id, is_published, "Video publish status toggled");
        Ok(PublishState {
            video_id: video.id,
            is_published,
        })
    }

    pub async fn add_comment(
        &self,
        video_id: &str,
        actor_id: Uuid,
        body: &ContentBody,
    ) -> Result<CommentView> {
        let video_id = parse_id("video", video_id)?;
        let content = required(body.content.as_deref(), "Comment content cannot be empty")?;
        let owner = self.author(actor_id).await?;
        if !self.repos.videos.video_exists(video_id).await? {
            return Err(AppError::not_found("Video not found"));
        }

        let comment = Comment {
            id: Uuid::new_v4(),
            video_id,
            owner_id: actor_id,
            content,
            created_at: Utc::now(),
        };
        self.repos.comments.create_comment(&comment).await?;

        metrics::record_write("comment", "create");
        info!(comment_id = %comment.id, video_id = %video_id, owner_id = %actor_id, "Comment added");
        Ok(comment_view(comment, owner))
    }

    pub async fn update_comment(
        &self,
        comment_id: &str,
        actor_id: Uuid,
        body: &ContentBody,
    ) -> Result<CommentView> {
        let comment_id = parse_id("comment", comment_id)?;
        let content = required(body.content.as_deref(), "Comment content cannot be empty")?;
        let existing = self.comment(comment_id).await?;
        ensure_owner(existing.owner_id, actor_id, "update this comment")?;
        let owner = self.author(actor_id).await?;

        let updated = self
            .repos
            .comments
            .update_comment(comment_id, &content)
            .await?
            .ok_or_else(|| AppError::not_found("Comment not found"))?;

        metrics::record_write("comment", "update");
        info!(comment_id = %comment_id, "Comment updated");
        Ok(comment_view(updated, owner))
    }

    pub async fn delete_comment(&self, comment_id: &str, actor_id: Uuid) -> Result<()> {
        let comment_id = parse_id("comment", comment_id)?;
        let existing = self.comment(comment_id).await?;
        ensure_owner(existing.owner_id, actor_id, "delete this comment")?;

        if !self.repos.comments.delete_comment(comment_id).await? {
            return Err(AppError::not_found("Comment not found"));
        }

        metrics::record_write("comment", "delete");
        info!(comment_id = %comment_id, "Comment deleted");
        Ok(())
    }

    pub async fn create_tweet(&self, actor_id: Uuid, body: &ContentBody) -> Result<Tweet> {
        let content = required(body.content.as_deref(), "Tweet content cannot be empty")?;
        self.author(actor_id).await?;

        let tweet = Tweet {
            id: Uuid::new_v4(),
            owner_id: actor_id,
            content,
            created_at: Utc::now(),
        };
        self.repos.tweets.create_tweet(&tweet).await?;

        metrics::record_write("tweet", "create");
        info!(tweet_id = %tweet.id, owner_id = %actor_id, "Tweet created");
        Ok(tweet)
    }

    pub async fn update_tweet(
        &self,
        tweet_id: &str,
        actor_id: Uuid,
        body: &ContentBody,
    ) -> Result<Tweet> {
        let tweet_id = parse_id("tweet", tweet_id)?;
        let content = required(body.content.as_deref(), "Tweet content cannot be empty")?;
        let existing = self.tweet(tweet_id).await?;
        ensure_owner(existing.owner_id, actor_id, "update this tweet")?;

        let updated = self
            .repos
            .tweets
            .update_tweet(tweet_id, &content)
            .await?
            .ok_or_else(|| AppError::not_found("Tweet not found"))?;

        metrics::record_write("tweet", "update");
        info!(tweet_id = %tweet_id, "Tweet updated");
        Ok(updated)
    }

    pub async fn delete_tweet(&self, tweet_id: &str, actor_id: Uuid) -> Result<()> {
        let tweet_id = parse_id("tweet", tweet_id)?;
        let existing = self.tweet(tweet_id).await?;
        ensure_owner(existing.owner_id, actor_id, "delete this tweet")?;

        if !self.repos.tweets.delete_tweet(tweet_id).await? {
            return Err(AppError::not_found("Tweet not found"));
        }

        metrics::record_write("tweet", "delete");
        info!(tweet_id = %tweet_id, "Tweet deleted");
        Ok(())
    }

    /// Name is required; a missing description is stored empty.
    pub async fn create_playlist(&self, actor_id: Uuid, body: &PlaylistBody) -> Result<Playlist> {
        let name = playlist_name(required(
            body.name.as_deref(),
            "Playlist name is required",
        )?)?;
        let description = non_blank(body.description.as_deref()).unwrap_or_default();
        self.author(actor_id).await?;

        let playlist = Playlist {
            id: Uuid::new_v4(),
            owner_id: actor_id,
            name,
            description,
            video_ids: Vec::new(),
            created_at: Utc::now(),
        };
        self.repos.playlists.create_playlist(&playlist).await?;

        metrics::record_write("playlist", "create");
        info!(playlist_id = %playlist.id, owner_id = %actor_id, "Playlist created");
        Ok(playlist)
    }

    /// At least one of name and description must be given.
    pub async fn update_playlist(
        &self,
        playlist_id: &str,
        actor_id: Uuid,
        body: &PlaylistBody,
    ) -> Result<Playlist> {
        let playlist_id = parse_id("playlist", playlist_id)?;
        let name = non_blank(body.name.as_deref()).map(playlist_name).transpose()?;
        let description = non_blank(body.description.as_deref());
        if name.is_none() && description.is_none() {
            return Err(AppError::invalid(
                "At least one of name or description is required",
            ));
        }

        let existing = self.playlist(playlist_id).await?;
        ensure_owner(existing.owner_id, actor_id, "update this playlist")?;

        let updated = self
            .repos
            .playlists
            .update_playlist(playlist_id, name.as_deref(), description.as_deref())
            .await?;
        if !updated {
            return Err(AppError::not_found("Playlist not found"));
        }

        metrics::record_write("playlist", "update");
        info!(playlist_id = %playlist_id, "Playlist updated");
        self.playlist(playlist_id).await
    }

    pub async fn delete_playlist(&self, playlist_id: &str, actor_id: Uuid) -> Result<()> {
        let playlist_id = parse_id("playlist", playlist_id)?;
        let existing = self.playlist(playlist_id).await?;
        ensure_owner(existing.owner_id, actor_id, "delete this playlist")?;

        if !self.repos.playlists.delete_playlist(playlist_id).await? {
            return Err(AppError::not_found("Playlist not found"));
        }

        metrics::record_write("playlist", "delete");
        info!(playlist_id = %playlist_id, "Playlist deleted");
        Ok(())
    }

    /// Appends at the end; a video already in the playlist is rejected.
    pub async fn add_video_to_playlist(
        &self,
        playlist_id: &str,
        video_id: &str,
        actor_id: Uuid,
    ) -> Result<Playlist> {
        let playlist_id = parse_id("playlist", playlist_id)?;
        let video_id = parse_id("video", video_id)?;
        let existing = self.playlist(playlist_id).await?;
        ensure_owner(existing.owner_id, actor_id, "modify this playlist")?;
        if !self.repos.videos.video_exists(video_id).await? {
            return Err(AppError::not_found("Video not found"));
        }

        let added = self
            .repos
            .playlists
            .add_playlist_video(playlist_id, video_id)
            .await?;
        if !added {
            return Err(AppError::invalid("Video already exists in the playlist"));
        }

        metrics::record_write("playlist", "add_video");
        info!(playlist_id = %playlist_id, video_id = %video_id, "Video added to playlist");
        self.playlist(playlist_id).await
    }

    pub async fn remove_video_from_playlist(
        &self,
        playlist_id: &str,
        video_id: &str,
        actor_id: Uuid,
    ) -> Result<Playlist> {
        let playlist_id = parse_id("playlist", playlist_id)?;
        let video_id = parse_id("video", video_id)?;
        let existing = self.playlist(playlist_id).await?;
        ensure_owner(existing.owner_id, actor_id, "modify this playlist")?;

        let removed = self
            .repos
            .playlists
            .remove_playlist_video(playlist_id, video_id)
            .await?;
        if !removed {
            return Err(AppError::not_found("Video not found in the playlist"));
        }

        metrics::record_write("playlist", "remove_video");
        info!(playlist_id = %playlist_id, video_id = %video_id, "Video removed from playlist");
        self.playlist(playlist_id).await
    }

    /// The writing account, which must still exist
    async fn author(&self, actor_id: Uuid) -> Result<OwnerSummary> {
        self.repos
            .users
            .find_owner_summary(actor_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User account not found".to_string()))
    }

    async fn comment(&self, comment_id: Uuid) -> Result<Comment> {
        self.repos
            .comments
            .find_comment(comment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Comment not found"))
    }

    async fn tweet(&self, tweet_id: Uuid) -> Result<Tweet> {
        self.repos
            .tweets
            .find_tweet(tweet_id)
            .await?
            .ok_or_else(|| AppError::not_found("Tweet not found"))
    }

    async fn playlist(&self, playlist_id: Uuid) -> Result<Playlist> {
        self.repos
            .playlists
            .find_playlist(playlist_id)
            .await?
            .ok_or_else(|| AppError::not_found("Playlist not found"))
    }
}

fn comment_view(comment: Comment, owner: OwnerSummary) -> CommentView {
    CommentView {
        id: comment.id,
        video_id: comment.video_id,
        content: comment.content,
        created_at: comment.created_at,
        owner,
    }
}
