//! Wire shapes of the paged listings

use serde::Serialize;

use super::pagination::Paged;
use crate::domain::{CommentView, OwnerSummary, PlaylistSummary, TweetView, VideoCard};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListing {
    pub total_count: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
    pub videos: Vec<VideoCard>,
}

impl From<Paged<VideoCard>> for VideoListing {
    fn from(p: Paged<VideoCard>) -> Self {
        Self {
            total_count: p.total,
            page: p.page,
            limit: p.limit,
            total_pages: p.total_pages,
            videos: p.items,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedVideosPage {
    pub total_liked_videos: i64,
    pub current_page: i64,
    pub total_pages: i64,
    pub liked_videos: Vec<VideoCard>,
}

impl From<Paged<VideoCard>> for LikedVideosPage {
    fn from(p: Paged<VideoCard>) -> Self {
        Self {
            total_liked_videos: p.total,
            current_page: p.page,
            total_pages: p.total_pages,
            liked_videos: p.items,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelVideosPage {
    pub total_videos: i64,
    pub current_page: i64,
    pub total_pages: i64,
    pub videos: Vec<VideoCard>,
}

impl From<Paged<VideoCard>> for ChannelVideosPage {
    fn from(p: Paged<VideoCard>) -> Self {
        Self {
            total_videos: p.total,
            current_page: p.page,
            total_pages: p.total_pages,
            videos: p.items,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentsPage {
    pub total_comments: i64,
    pub current_page: i64,
    pub total_pages: i64,
    pub comments: Vec<CommentView>,
}

impl From<Paged<CommentView>> for CommentsPage {
    fn from(p: Paged<CommentView>) -> Self {
        Self {
            total_comments: p.total,
            current_page: p.page,
            total_pages: p.total_pages,
            comments: p.items,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetsPage {
    pub total_tweets: i64,
    pub current_page: i64,
    pub total_pages: i64,
    pub tweets: Vec<TweetView>,
}

impl From<Paged<TweetView>> for TweetsPage {
    fn from(p: Paged<TweetView>) -> Self {
        Self {
            total_tweets: p.total,
            current_page: p.page,
            total_pages: p.total_pages,
            tweets: p.items,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistsPage {
    pub total_playlists: i64,
    pub current_page: i64,
    pub total_pages: i64,
    pub playlists: Vec<PlaylistSummary>,
}

impl From<Paged<PlaylistSummary>> for PlaylistsPage {
    fn from(p: Paged<PlaylistSummary>) -> Self {
        Self {
            total_playlists: p.total,
            current_page: p.page,
            total_pages: p.total_pages,
            playlists: p.items,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribersPage {
    pub total_subscribers: i64,
    pub current_page: i64,
    pub total_pages: i64,
    pub subscribers: Vec<OwnerSummary>,
}

impl From<Paged<OwnerSummary>> for SubscribersPage {
    fn from(p: Paged<OwnerSummary>) -> Self {
        Self {
            total_subscribers: p.total,
            current_page: p.page,
            total_pages: p.total_pages,
            subscribers: p.items,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribedChannelsPage {
    pub total_channels: i64,
    pub current_page: i64,
    pub total_pages: i64,
    pub channels: Vec<OwnerSummary>,
}

impl From<Paged<OwnerSummary>> for SubscribedChannelsPage {
    fn from(p: Paged<OwnerSummary>) -> Self {
        Self {
            total_channels: p.total,
            current_page: p.page,
            total_pages: p.total_pages,
            channels: p.items,
        }
    }
}
