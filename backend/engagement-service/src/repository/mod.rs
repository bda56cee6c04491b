//! Store access behind one trait per concern.
//!
//! Engines only see these traits; `postgres` backs them with `sqlx`, `memory`
//! with a process-local store that enforces the same uniqueness rules.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    Comment, CommentView, LikeKey, OwnerSummary, Playlist, PlaylistDetail, PlaylistSummary,
    SubscriptionKey, Tweet, TweetView, VideoCard, VideoQuery, VideoTotals,
};
use crate::error::Result;

pub use memory::InMemoryStore;

/// Result of one atomic toggle write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// No row existed; one was inserted
    Inserted,
    /// A row existed and was removed
    Deleted,
    /// Nothing was removed and the insert lost a uniqueness race
    Conflicted,
}

/// A set of (key) rows guarded by a uniqueness constraint that only ever
/// gains or loses whole rows.
#[async_trait]
pub trait RelationStore<K: Sync>: Send + Sync {
    /// Delete the row for `key` if present, otherwise insert it, as a single
    /// conditional write.
    async fn toggle(&self, key: &K) -> Result<ToggleOutcome>;

    async fn exists(&self, key: &K) -> Result<bool>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn user_exists(&self, user_id: Uuid) -> Result<bool>;

    /// Author block embedded in freshly written comments
    async fn find_owner_summary(&self, user_id: Uuid) -> Result<Option<OwnerSummary>>;
}

#[async_trait]
pub trait VideoRepository: Send + Sync {
    async fn video_exists(&self, video_id: Uuid) -> Result<bool>;

    async fn find_video(&self, video_id: Uuid) -> Result<Option<VideoCard>>;

    /// Flip `is_published` in place; `None` when the video is gone.
    async fn toggle_published(&self, video_id: Uuid) -> Result<Option<bool>>;

    /// Filtered, sorted page plus the total number of matches
    async fn search_videos(&self, query: &VideoQuery) -> Result<(Vec<VideoCard>, i64)>;

    /// Newest first
    async fn videos_by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<VideoCard>, i64)>;

    async fn owner_totals(&self, owner_id: Uuid) -> Result<VideoTotals>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn comment_exists(&self, comment_id: Uuid) -> Result<bool>;

    async fn find_comment(&self, comment_id: Uuid) -> Result<Option<Comment>>;

    async fn create_comment(&self, comment: &Comment) -> Result<()>;

    async fn update_comment(&self, comment_id: Uuid, content: &str) -> Result<Option<Comment>>;

    /// Removes the comment together with the likes on it
    async fn delete_comment(&self, comment_id: Uuid) -> Result<bool>;

    /// Newest first
    async fn comments_for_video(
        &self,
        video_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<CommentView>, i64)>;
}

#[async_trait]
pub trait TweetRepository: Send + Sync {
    async fn tweet_exists(&self, tweet_id: Uuid) -> Result<bool>;

    async fn find_tweet(&self, tweet_id: Uuid) -> Result<Option<Tweet>>;

    async fn create_tweet(&self, tweet: &Tweet) -> Result<()>;

    async fn update_tweet(&self, tweet_id: Uuid, content: &str) -> Result<Option<Tweet>>;

    /// Removes the tweet together with the likes on it
    async fn delete_tweet(&self, tweet_id: Uuid) -> Result<bool>;

    /// Newest first
    async fn tweets_by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<TweetView>, i64)>;
}

#[async_trait]
pub trait PlaylistRepository: Send + Sync {
    /// Newest first
    async fn playlists_by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PlaylistSummary>, i64)>;

    async fn find_playlist_detail(&self, playlist_id: Uuid) -> Result<Option<PlaylistDetail>>;

    /// Playlist row with its video ids in position order
    async fn find_playlist(&self, playlist_id: Uuid) -> Result<Option<Playlist>>;

    /// Stores the header only; `video_ids` is ignored
    async fn create_playlist(&self, playlist: &Playlist) -> Result<()>;

    /// `None` fields keep their stored value
    async fn update_playlist(
        &self,
        playlist_id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<bool>;

    async fn delete_playlist(&self, playlist_id: Uuid) -> Result<bool>;

    /// Append `video_id` after the current last position. `false` when the
    /// video is already in the playlist.
    async fn add_playlist_video(&self, playlist_id: Uuid, video_id: Uuid) -> Result<bool>;

    async fn remove_playlist_video(&self, playlist_id: Uuid, video_id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait LikeRepository: RelationStore<LikeKey> {
    /// Videos liked by `user_id`, most recent like first
    async fn liked_videos(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<VideoCard>, i64)>;

    /// Likes whose target is a video owned by `owner_id`
    async fn count_likes_on_owner_videos(&self, owner_id: Uuid) -> Result<i64>;
}

#[async_trait]
pub trait SubscriptionRepository: RelationStore<SubscriptionKey> {
    async fn count_subscribers(&self, channel_id: Uuid) -> Result<i64>;

    /// Subscribers of a channel, most recent first
    async fn subscribers_of(
        &self,
        channel_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<OwnerSummary>, i64)>;

    /// Channels a user subscribes to, most recent first
    async fn channels_of(
        &self,
        subscriber_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<OwnerSummary>, i64)>;
}

#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> Result<()>;
}

/// Every repository the engines need, behind shared trait objects
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub videos: Arc<dyn VideoRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub tweets: Arc<dyn TweetRepository>,
    pub playlists: Arc<dyn PlaylistRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub health: Arc<dyn StoreHealth>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(postgres::PgUserRepository::new(pool.clone())),
            videos: Arc::new(postgres::PgVideoRepository::new(pool.clone())),
            comments: Arc::new(postgres::PgCommentRepository::new(pool.clone())),
            tweets: Arc::new(postgres::PgTweetRepository::new(pool.clone())),
            playlists: Arc::new(postgres::PgPlaylistRepository::new(pool.clone())),
            likes: Arc::new(postgres::PgLikeRepository::new(pool.clone())),
            subscriptions: Arc::new(postgres::PgSubscriptionRepository::new(pool.clone())),
            health: Arc::new(postgres::PgHealth::new(pool)),
        }
    }

    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            users: store.clone(),
            videos: store.clone(),
            comments: store.clone(),
            tweets: store.clone(),
            playlists: store.clone(),
            likes: store.clone(),
            subscriptions: store.clone(),
            health: store,
        }
    }
}
