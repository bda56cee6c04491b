#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use engagement_service::domain::{Comment, Playlist, Tweet, User, Video};
use engagement_service::repository::{
    CommentRepository, InMemoryStore, PlaylistRepository, Repositories, TweetRepository,
};
use engagement_service::services::{AggregationQueryEngine, ContentEngine, RelationToggleEngine};
use engagement_service::AppState;
use uuid::Uuid;

/// In-memory store plus seeding helpers
pub struct Fixture {
    pub store: Arc<InMemoryStore>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
        }
    }

    pub fn repos(&self) -> Repositories {
        Repositories::in_memory(self.store.clone())
    }

    pub fn toggles(&self) -> RelationToggleEngine {
        RelationToggleEngine::new(self.repos(), false)
    }

    pub fn queries(&self) -> AggregationQueryEngine {
        AggregationQueryEngine::new(self.repos())
    }

    pub fn content(&self) -> ContentEngine {
        ContentEngine::new(self.repos())
    }

    pub fn state(&self) -> AppState {
        AppState::new(self.repos(), false)
    }

    pub async fn user(&self, username: &str) -> Uuid {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: format!("{}@example.com", username),
            display_name: format!("{} display", username),
            created_at: Utc::now(),
        };
        let id = user.id;
        self.store.insert_user(user).await.unwrap();
        id
    }

    /// Video created `minutes_ago` minutes in the past
    pub async fn video(&self, owner: Uuid, title: &str, views: i64, minutes_ago: i64) -> Uuid {
        self.video_with(owner, title, "", views, 60.0, minutes_ago)
            .await
    }

    pub async fn video_with(
        &self,
        owner: Uuid,
        title: &str,
        description: &str,
        views: i64,
        duration_seconds: f64,
        minutes_ago: i64,
    ) -> Uuid {
        let video = Video {
            id: Uuid::new_v4(),
            owner_id: owner,
            title: title.to_string(),
            description: description.to_string(),
            video_url: format!("https://cdn.example.com/{}.mp4", title.replace(' ', "-")),
            thumbnail_url: "https://cdn.example.com/thumb.jpg".to_string(),
            duration_seconds,
            view_count: views,
            is_published: true,
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        };
        let id = video.id;
        self.store.insert_video(video).await.unwrap();
        id
    }

    pub async fn comment(&self, video: Uuid, owner: Uuid, content: &str, minutes_ago: i64) -> Uuid {
        let comment = Comment {
            id: Uuid::new_v4(),
            video_id: video,
            owner_id: owner,
            content: content.to_string(),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        };
        let id = comment.id;
        self.store.create_comment(&comment).await.unwrap();
        id
    }

    pub async fn tweet(&self, owner: Uuid, content: &str, minutes_ago: i64) -> Uuid {
        let tweet = Tweet {
            id: Uuid::new_v4(),
            owner_id: owner,
            content: content.to_string(),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        };
        let id = tweet.id;
        self.store.create_tweet(&tweet).await.unwrap();
        id
    }

    pub async fn playlist(&self, owner: Uuid, name: &str, videos: Vec<Uuid>, minutes_ago: i64) -> Uuid {
        let playlist = Playlist {
            id: Uuid::new_v4(),
            owner_id: owner,
            name: name.to_string(),
            description: format!("{} description", name),
            video_ids: Vec::new(),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        };
        let id = playlist.id;
        self.store.create_playlist(&playlist).await.unwrap();
        for video in videos {
            self.store.add_playlist_video(id, video).await.unwrap();
        }
        id
    }
}
