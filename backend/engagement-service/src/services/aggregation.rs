//! Aggregation query engine: paginated listings and channel statistics.
//! Read-only; every operation validates identifiers before touching the store.

use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{
    parse_id, ChannelStats, PlaylistDetail, SortDirection, VideoQuery, VideoSortField,
};
use crate::error::{AppError, Result};
use crate::metrics;
use crate::repository::Repositories;
use crate::services::listings::{
    ChannelVideosPage, CommentsPage, PlaylistsPage, SubscribedChannelsPage, SubscribersPage,
    TweetsPage, VideoListing,
};
use crate::services::pagination::PageRequest;

/// `?page&limit` of the plain listings
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn request(&self) -> Result<PageRequest> {
        PageRequest::new(self.page, self.limit)
    }
}

/// Raw `listVideos` query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListRequest {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub query: Option<String>,
    pub sort_by: Option<String>,
    pub sort_type: Option<String>,
    pub user_id: Option<String>,
}

impl VideoListRequest {
    fn validate(&self) -> Result<(VideoQuery, PageRequest)> {
        let page = PageRequest::new(self.page, self.limit)?;

        let owner_id = self
            .user_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|raw| parse_id("user", raw))
            .transpose()?;

        let sort = match self.sort_by.as_deref().map(str::trim) {
            None | Some("") => VideoSortField::default(),
            Some(field) => field.parse()?,
        };

        let search = self
            .query
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let query = VideoQuery {
            owner_id,
            search,
            sort,
            direction: SortDirection::from_param(self.sort_type.as_deref()),
            offset: page.offset(),
            limit: page.limit,
        };
        Ok((query, page))
    }
}

#[derive(Clone)]
pub struct AggregationQueryEngine {
    repos: Repositories,
}

impl AggregationQueryEngine {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn list_videos(&self, request: &VideoListRequest) -> Result<VideoListing> {
        let (query, page) = request.validate()?;
        let _timer = metrics::query_timer("list_videos");

        debug!(
            owner_id = ?query.owner_id,
            search = ?query.search,
            sort = ?query.sort,
            direction = ?query.direction,
            page = page.page,
            limit = page.limit,
            "Listing videos"
        );

        let result = self.repos.videos.search_videos(&query).await?;
        Ok(page.paged(result).into())
    }

    /// Video count, summed views, likes on the channel's videos and
    /// subscriber count. The three reads are independent and may observe
    /// writes that land between them.
    pub async fn channel_stats(&self, channel_id: &str) -> Result<ChannelStats> {
        let channel_id = parse_id("channel", channel_id)?;
        self.require_user(channel_id, "Channel not found").await?;
        let _timer = metrics::query_timer("channel_stats");

        let (videos, total_likes, total_subscribers) = tokio::try_join!(
            self.repos.videos.owner_totals(channel_id),
            self.repos.likes.count_likes_on_owner_videos(channel_id),
            self.repos.subscriptions.count_subscribers(channel_id),
        )?;

        Ok(ChannelStats {
            total_videos: videos.count,
            total_views: videos.views,
            total_likes,
            total_subscribers,
        })
    }

    pub async fn channel_videos(
        &self,
        channel_id: &str,
        params: PageParams,
    ) -> Result<ChannelVideosPage> {
        let channel_id = parse_id("channel", channel_id)?;
        let page = params.request()?;
        self.require_user(channel_id, "Channel not found").await?;
        let _timer = metrics::query_timer("channel_videos");

        let result = self
            .repos
            .videos
            .videos_by_owner(channel_id, page.limit, page.offset())
            .await?;
        Ok(page.paged(result).into())
    }

    pub async fn video_comments(&self, video_id: &str, params: PageParams) -> Result<CommentsPage> {
        let video_id = parse_id("video", video_id)?;
        let page = params.request()?;
        if !self.repos.videos.video_exists(video_id).await? {
            return Err(AppError::not_found("Video not found"));
        }
        let _timer = metrics::query_timer("video_comments");

        let result = self
            .repos
            .comments
            .comments_for_video(video_id, page.limit, page.offset())
            .await?;
        Ok(page.paged(result).into())
    }

    /// An unknown user simply has no tweets.
    pub async fn user_tweets(&self, user_id: &str, params: PageParams) -> Result<TweetsPage> {
        let user_id = parse_id("user", user_id)?;
        let page = params.request()?;
        let _timer = metrics::query_timer("user_tweets");

        let result = self
            .repos
            .tweets
            .tweets_by_owner(user_id, page.limit, page.offset())
            .await?;
        Ok(page.paged(result).into())
    }

    pub async fn user_playlists(&self, user_id: &str, params: PageParams) -> Result<PlaylistsPage> {
        let user_id = parse_id("user", user_id)?;
        let page = params.request()?;
        let _timer = metrics::query_timer("user_playlists");

        let result = self
            .repos
            .playlists
            .playlists_by_owner(user_id, page.limit, page.offset())
            .await?;
        Ok(page.paged(result).into())
    }

    pub async fn channel_subscribers(
        &self,
        channel_id: &str,
        params: PageParams,
    ) -> Result<SubscribersPage> {
        let channel_id = parse_id("channel", channel_id)?;
        let page = params.request()?;
        self.require_user(channel_id, "Channel not found").await?;
        let _timer = metrics::query_timer("channel_subscribers");

        let result = self
            .repos
            .subscriptions
            .subscribers_of(channel_id, page.limit, page.offset())
            .await?;
        Ok(page.paged(result).into())
    }

    pub async fn subscribed_channels(
        &self,
        subscriber_id: &str,
        params: PageParams,
    ) -> Result<SubscribedChannelsPage> {
        let subscriber_id = parse_id("subscriber", subscriber_id)?;
        let page = params.request()?;
        self.require_user(subscriber_id, "User not found").await?;
        let _timer = metrics::query_timer("subscribed_channels");

        let result = self
            .repos
            .subscriptions
            .channels_of(subscriber_id, page.limit, page.offset())
            .await?;
        Ok(page.paged(result).into())
    }

    pub async fn playlist_detail(&self, playlist_id: &str) -> Result<PlaylistDetail> {
        let playlist_id = parse_id("playlist", playlist_id)?;
        let _timer = metrics::query_timer("playlist_detail");

        self.repos
            .playlists
            .find_playlist_detail(playlist_id)
            .await?
            .ok_or_else(|| AppError::not_found("Playlist not found"))
    }

    async fn require_user(&self, user_id: Uuid, missing: &str) -> Result<()> {
        if self.repos.users.user_exists(user_id).await? {
            Ok(())
        } else {
            Err(AppError::not_found(missing))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_filters_are_ignored() {
        let request = VideoListRequest {
            query: Some("   ".into()),
            user_id: Some(String::new()),
            sort_by: Some(String::new()),
            ..Default::default()
        };
        let (query, page) = request.validate().unwrap();
        assert!(query.search.is_none());
        assert!(query.owner_id.is_none());
        assert_eq!(query.sort, VideoSortField::CreatedAt);
        assert_eq!(query.direction, SortDirection::Desc);
        assert_eq!(page, PageRequest::default());
    }

    #[test]
    fn sort_and_direction_are_parsed() {
        let request = VideoListRequest {
            sort_by: Some("views".into()),
            sort_type: Some("asc".into()),
            page: Some(2),
            limit: Some(5),
            ..Default::default()
        };
        let (query, _) = request.validate().unwrap();
        assert_eq!(query.sort, VideoSortField::Views);
        assert_eq!(query.direction, SortDirection::Asc);
        assert_eq!(query.offset, 5);
        assert_eq!(query.limit, 5);
    }

    #[test]
    fn bad_owner_filter_is_invalid_argument() {
        let request = VideoListRequest {
            user_id: Some("nope".into()),
            ..Default::default()
        };
        assert!(matches!(
            request.validate().unwrap_err(),
            AppError::InvalidArgument(_)
        ));
    }
}
