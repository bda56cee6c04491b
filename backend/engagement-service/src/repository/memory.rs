//! Process-local store with the same uniqueness rules as the PostgreSQL schema.
//!
//! Backs the test suites and `STORE_BACKEND=memory`. Listings keep the
//! ordering guarantees of the SQL implementation: newest first with the id as
//! tie-break, relations ordered by when they were created. Writes check the
//! same references and CHECK constraints the schema enforces.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    compare_titles, Comment, CommentView, Like, LikeKey, OwnerSummary, Playlist, PlaylistDetail, PlaylistSummary,
    PlaylistVideo, SortDirection, Subscription, SubscriptionKey, TargetKind, Tweet, TweetView,
    User, Video, VideoCard, VideoQuery, VideoSortField, VideoTotals,
};
use crate::error::{AppError, Result};
use crate::repository::{
    CommentRepository, LikeRepository, PlaylistRepository, RelationStore, StoreHealth,
    SubscriptionRepository, ToggleOutcome, TweetRepository, UserRepository, VideoRepository,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    videos: HashMap<Uuid, Video>,
    comments: HashMap<Uuid, Comment>,
    tweets: HashMap<Uuid, Tweet>,
    playlists: HashMap<Uuid, Playlist>,
    /// Creation order; later entries are newer
    likes: Vec<Like>,
    subscriptions: Vec<Subscription>,
}

impl Tables {
    fn owner_summary(&self, user_id: Uuid) -> Option<OwnerSummary> {
        self.users.get(&user_id).map(OwnerSummary::from)
    }

    fn video_card(&self, video: &Video) -> Option<VideoCard> {
        self.owner_summary(video.owner_id)
            .map(|owner| VideoCard::from_parts(video, owner))
    }
}

fn page<T>(items: Vec<T>, limit: i64, offset: i64) -> (Vec<T>, i64) {
    let total = items.len() as i64;
    let page = items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect();
    (page, total)
}

fn compare_videos(a: &Video, b: &Video, field: VideoSortField) -> Ordering {
    let primary = match field {
        VideoSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        VideoSortField::Title => compare_titles(&a.title, &b.title),
        VideoSortField::Views => a.view_count.cmp(&b.view_count),
        VideoSortField::Duration => a.duration_seconds.total_cmp(&b.duration_seconds),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

fn newest_first<T>(rows: &mut [T], created: impl Fn(&T) -> (chrono::DateTime<Utc>, Uuid)) {
    rows.sort_by(|a, b| created(b).cmp(&created(a)));
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: User) -> Result<()> {
        let mut tables = self.tables.write().await;
        let taken = tables.users.values().any(|u| {
            u.username.eq_ignore_ascii_case(&user.username)
                || u.email.eq_ignore_ascii_case(&user.email)
        });
        if taken {
            return Err(AppError::Conflict(format!(
                "User {} already exists",
                user.username
            )));
        }
        tables.users.insert(user.id, user);
        Ok(())
    }

    pub async fn insert_video(&self, video: Video) -> Result<()> {
        if video.view_count < 0 {
            return Err(AppError::invalid("viewCount must not be negative"));
        }
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&video.owner_id) {
            return Err(AppError::not_found("Owner not found"));
        }
        tables.videos.insert(video.id, video);
        Ok(())
    }

    /// Number of stored like rows for `key`; never more than one.
    pub async fn like_rows(&self, key: &LikeKey) -> usize {
        let tables = self.tables.read().await;
        tables
            .likes
            .iter()
            .filter(|l| {
                l.target_kind == key.kind
                    && l.target_id == key.target_id
                    && l.liked_by == key.liked_by
            })
            .count()
    }

    pub async fn subscription_rows(&self, key: &SubscriptionKey) -> usize {
        let tables = self.tables.read().await;
        tables
            .subscriptions
            .iter()
            .filter(|s| s.channel_id == key.channel_id && s.subscriber_id == key.subscriber_id)
            .count()
    }
}

fn require_text(content: &str, what: &str) -> Result<()> {
    if content.trim().is_empty() {
        Err(AppError::invalid(format!("{} content is required", what)))
    } else {
        Ok(())
    }
}

fn like_matches(like: &Like, key: &LikeKey) -> bool {
    like.target_kind == key.kind && like.target_id == key.target_id && like.liked_by == key.liked_by
}

fn subscription_matches(sub: &Subscription, key: &SubscriptionKey) -> bool {
    sub.channel_id == key.channel_id && sub.subscriber_id == key.subscriber_id
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn user_exists(&self, user_id: Uuid) -> Result<bool> {
        Ok(self.tables.read().await.users.contains_key(&user_id))
    }

    async fn find_owner_summary(&self, user_id: Uuid) -> Result<Option<OwnerSummary>> {
        Ok(self.tables.read().await.owner_summary(user_id))
    }
}

#[async_trait]
impl VideoRepository for InMemoryStore {
    async fn video_exists(&self, video_id: Uuid) -> Result<bool> {
        Ok(self.tables.read().await.videos.contains_key(&video_id))
    }

    async fn find_video(&self, video_id: Uuid) -> Result<Option<VideoCard>> {
        let tables = self.tables.read().await;
        Ok(tables
            .videos
            .get(&video_id)
            .and_then(|v| tables.video_card(v)))
    }

    async fn toggle_published(&self, video_id: Uuid) -> Result<Option<bool>> {
        let mut tables = self.tables.write().await;
        Ok(tables.videos.get_mut(&video_id).map(|v| {
            v.is_published = !v.is_published;
            v.is_published
        }))
    }

    async fn search_videos(&self, query: &VideoQuery) -> Result<(Vec<VideoCard>, i64)> {
        let tables = self.tables.read().await;
        let mut matches: Vec<&Video> = tables
            .videos
            .values()
            .filter(|v| query.owner_id.map_or(true, |owner| v.owner_id == owner))
            .filter(|v| query.matches_text(&v.title, &v.description))
            .collect();

        matches.sort_by(|a, b| {
            let ord = compare_videos(a, b, query.sort);
            match query.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });

        let cards = matches
            .into_iter()
            .filter_map(|v| tables.video_card(v))
            .collect();
        Ok(page(cards, query.limit, query.offset))
    }

    async fn videos_by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<VideoCard>, i64)> {
        let tables = self.tables.read().await;
        let mut videos: Vec<&Video> = tables
            .videos
            .values()
            .filter(|v| v.owner_id == owner_id)
            .collect();
        newest_first(&mut videos, |v| (v.created_at, v.id));

        let cards = videos
            .into_iter()
            .filter_map(|v| tables.video_card(v))
            .collect();
        Ok(page(cards, limit, offset))
    }

    async fn owner_totals(&self, owner_id: Uuid) -> Result<VideoTotals> {
        let tables = self.tables.read().await;
        let totals = tables
            .videos
            .values()
            .filter(|v| v.owner_id == owner_id)
            .fold(VideoTotals::default(), |acc, v| VideoTotals {
                count: acc.count + 1,
                views: acc.views + v.view_count,
            });
        Ok(totals)
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn comment_exists(&self, comment_id: Uuid) -> Result<bool> {
        Ok(self.tables.read().await.comments.contains_key(&comment_id))
    }

    async fn find_comment(&self, comment_id: Uuid) -> Result<Option<Comment>> {
        Ok(self.tables.read().await.comments.get(&comment_id).cloned())
    }

    async fn create_comment(&self, comment: &Comment) -> Result<()> {
        require_text(&comment.content, "Comment")?;
        let mut tables = self.tables.write().await;
        if !tables.videos.contains_key(&comment.video_id) {
            return Err(AppError::not_found("Video not found"));
        }
        if !tables.users.contains_key(&comment.owner_id) {
            return Err(AppError::not_found("User not found"));
        }
        tables.comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn update_comment(&self, comment_id: Uuid, content: &str) -> Result<Option<Comment>> {
        require_text(content, "Comment")?;
        let mut tables = self.tables.write().await;
        Ok(tables.comments.get_mut(&comment_id).map(|c| {
            c.content = content.to_string();
            c.clone()
        }))
    }

    async fn delete_comment(&self, comment_id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        tables
            .likes
            .retain(|l| !(l.target_kind == TargetKind::Comment && l.target_id == comment_id));
        Ok(tables.comments.remove(&comment_id).is_some())
    }

    async fn comments_for_video(
        &self,
        video_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<CommentView>, i64)> {
        let tables = self.tables.read().await;
        let mut comments: Vec<&Comment> = tables
            .comments
            .values()
            .filter(|c| c.video_id == video_id)
            .collect();
        newest_first(&mut comments, |c| (c.created_at, c.id));

        let views = comments
            .into_iter()
            .filter_map(|c| {
                tables.owner_summary(c.owner_id).map(|owner| CommentView {
                    id: c.id,
                    video_id: c.video_id,
                    content: c.content.clone(),
                    created_at: c.created_at,
                    owner,
                })
            })
            .collect();
        Ok(page(views, limit, offset))
    }
}

#[async_trait]
impl TweetRepository for InMemoryStore {
    async fn tweet_exists(&self, tweet_id: Uuid) -> Result<bool> {
        Ok(self.tables.read().await.tweets.contains_key(&tweet_id))
    }

    async fn find_tweet(&self, tweet_id: Uuid) -> Result<Option<Tweet>> {
        Ok(self.tables.read().await.tweets.get(&tweet_id).cloned())
    }

    async fn create_tweet(&self, tweet: &Tweet) -> Result<()> {
        require_text(&tweet.content, "Tweet")?;
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&tweet.owner_id) {
            return Err(AppError::not_found("User not found"));
        }
        tables.tweets.insert(tweet.id, tweet.clone());
        Ok(())
    }

    async fn update_tweet(&self, tweet_id: Uuid, content: &str) -> Result<Option<Tweet>> {
        require_text(content, "Tweet")?;
        let mut tables = self.tables.write().await;
        Ok(tables.tweets.get_mut(&tweet_id).map(|t| {
            t.content = content.to_string();
            t.clone()
        }))
    }

    async fn delete_tweet(&self, tweet_id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        tables
            .likes
            .retain(|l| !(l.target_kind == TargetKind::Tweet && l.target_id == tweet_id));
        Ok(tables.tweets.remove(&tweet_id).is_some())
    }

    async fn tweets_by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<TweetView>, i64)> {
        let tables = self.tables.read().await;
        let mut tweets: Vec<&Tweet> = tables
            .tweets
            .values()
            .filter(|t| t.owner_id == owner_id)
            .collect();
        newest_first(&mut tweets, |t| (t.created_at, t.id));

        let views = tweets
            .into_iter()
            .map(|t| TweetView {
                id: t.id,
                content: t.content.clone(),
                created_at: t.created_at,
            })
            .collect();
        Ok(page(views, limit, offset))
    }
}

#[async_trait]
impl PlaylistRepository for InMemoryStore {
    async fn playlists_by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PlaylistSummary>, i64)> {
        let tables = self.tables.read().await;
        let mut playlists: Vec<&Playlist> = tables
            .playlists
            .values()
            .filter(|p| p.owner_id == owner_id)
            .collect();
        newest_first(&mut playlists, |p| (p.created_at, p.id));

        let summaries = playlists
            .into_iter()
            .map(|p| PlaylistSummary {
                id: p.id,
                name: p.name.clone(),
                description: p.description.clone(),
                video_ids: p.video_ids.clone(),
                created_at: p.created_at,
            })
            .collect();
        Ok(page(summaries, limit, offset))
    }

    async fn find_playlist_detail(&self, playlist_id: Uuid) -> Result<Option<PlaylistDetail>> {
        let tables = self.tables.read().await;
        let Some(playlist) = tables.playlists.get(&playlist_id) else {
            return Ok(None);
        };
        let Some(owner) = tables.owner_summary(playlist.owner_id) else {
            return Ok(None);
        };

        let videos = playlist
            .video_ids
            .iter()
            .filter_map(|id| tables.videos.get(id))
            .map(|v| PlaylistVideo {
                id: v.id,
                title: v.title.clone(),
                description: v.description.clone(),
                thumbnail_url: v.thumbnail_url.clone(),
            })
            .collect();

        Ok(Some(PlaylistDetail {
            id: playlist.id,
            name: playlist.name.clone(),
            description: playlist.description.clone(),
            created_at: playlist.created_at,
            owner,
            videos,
        }))
    }

    async fn find_playlist(&self, playlist_id: Uuid) -> Result<Option<Playlist>> {
        Ok(self.tables.read().await.playlists.get(&playlist_id).cloned())
    }

    async fn create_playlist(&self, playlist: &Playlist) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&playlist.owner_id) {
            return Err(AppError::not_found("User not found"));
        }
        tables.playlists.insert(
            playlist.id,
            Playlist {
                video_ids: Vec::new(),
                ..playlist.clone()
            },
        );
        Ok(())
    }

    async fn update_playlist(
        &self,
        playlist_id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let Some(playlist) = tables.playlists.get_mut(&playlist_id) else {
            return Ok(false);
        };
        if let Some(name) = name {
            playlist.name = name.to_string();
        }
        if let Some(description) = description {
            playlist.description = description.to_string();
        }
        Ok(true)
    }

    async fn delete_playlist(&self, playlist_id: Uuid) -> Result<bool> {
        Ok(self
            .tables
            .write()
            .await
            .playlists
            .remove(&playlist_id)
            .is_some())
    }

    async fn add_playlist_video(&self, playlist_id: Uuid, video_id: Uuid) -> Result<bool> {
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;
        let playlist = tables
            .playlists
            .get_mut(&playlist_id)
            .ok_or_else(|| AppError::not_found("Playlist not found"))?;
        if !tables.videos.contains_key(&video_id) {
            return Err(AppError::not_found("Video not found"));
        }
        if playlist.video_ids.contains(&video_id) {
            return Ok(false);
        }
        playlist.video_ids.push(video_id);
        Ok(true)
    }

    async fn remove_playlist_video(&self, playlist_id: Uuid, video_id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let Some(playlist) = tables.playlists.get_mut(&playlist_id) else {
            return Ok(false);
        };
        let before = playlist.video_ids.len();
        playlist.video_ids.retain(|id| *id != video_id);
        Ok(playlist.video_ids.len() < before)
    }
}

#[async_trait]
impl RelationStore<LikeKey> for InMemoryStore {
    async fn toggle(&self, key: &LikeKey) -> Result<ToggleOutcome> {
        let mut tables = self.tables.write().await;
        if let Some(pos) = tables.likes.iter().position(|l| like_matches(l, key)) {
            tables.likes.remove(pos);
            return Ok(ToggleOutcome::Deleted);
        }

        tables.likes.push(Like {
            id: Uuid::new_v4(),
            target_kind: key.kind,
            target_id: key.target_id,
            liked_by: key.liked_by,
            created_at: Utc::now(),
        });
        Ok(ToggleOutcome::Inserted)
    }

    async fn exists(&self, key: &LikeKey) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables.likes.iter().any(|l| like_matches(l, key)))
    }
}

#[async_trait]
impl LikeRepository for InMemoryStore {
    async fn liked_videos(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<VideoCard>, i64)> {
        let tables = self.tables.read().await;
        let cards = tables
            .likes
            .iter()
            .rev()
            .filter(|l| l.liked_by == user_id && l.target_kind == TargetKind::Video)
            .filter_map(|l| tables.videos.get(&l.target_id))
            .filter_map(|v| tables.video_card(v))
            .collect();
        Ok(page(cards, limit, offset))
    }

    async fn count_likes_on_owner_videos(&self, owner_id: Uuid) -> Result<i64> {
        let tables = self.tables.read().await;
        let count = tables
            .likes
            .iter()
            .filter(|l| l.target_kind == TargetKind::Video)
            .filter(|l| {
                tables
                    .videos
                    .get(&l.target_id)
                    .is_some_and(|v| v.owner_id == owner_id)
            })
            .count();
        Ok(count as i64)
    }
}

#[async_trait]
impl RelationStore<SubscriptionKey> for InMemoryStore {
    async fn toggle(&self, key: &SubscriptionKey) -> Result<ToggleOutcome> {
        let mut tables = self.tables.write().await;
        if let Some(pos) = tables
            .subscriptions
            .iter()
            .position(|s| subscription_matches(s, key))
        {
            tables.subscriptions.remove(pos);
            return Ok(ToggleOutcome::Deleted);
        }

        tables.subscriptions.push(Subscription {
            id: Uuid::new_v4(),
            channel_id: key.channel_id,
            subscriber_id: key.subscriber_id,
            created_at: Utc::now(),
        });
        Ok(ToggleOutcome::Inserted)
    }

    async fn exists(&self, key: &SubscriptionKey) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .subscriptions
            .iter()
            .any(|s| subscription_matches(s, key)))
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryStore {
    async fn count_subscribers(&self, channel_id: Uuid) -> Result<i64> {
        let tables = self.tables.read().await;
        let count = tables
            .subscriptions
            .iter()
            .filter(|s| s.channel_id == channel_id)
            .count();
        Ok(count as i64)
    }

    async fn subscribers_of(
        &self,
        channel_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<OwnerSummary>, i64)> {
        let tables = self.tables.read().await;
        let subscribers = tables
            .subscriptions
            .iter()
            .rev()
            .filter(|s| s.channel_id == channel_id)
            .filter_map(|s| tables.owner_summary(s.subscriber_id))
            .collect();
        Ok(page(subscribers, limit, offset))
    }

    async fn channels_of(
        &self,
        subscriber_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<OwnerSummary>, i64)> {
        let tables = self.tables.read().await;
        let channels = tables
            .subscriptions
            .iter()
            .rev()
            .filter(|s| s.subscriber_id == subscriber_id)
            .filter_map(|s| tables.owner_summary(s.channel_id))
            .collect();
        Ok(page(channels, limit, offset))
    }
}

#[async_trait]
impl StoreHealth for InMemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
