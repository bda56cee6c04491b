//! Relation toggle engine: likes and subscriptions.
//!
//! Every toggle is a single conditional write in the store. When that write
//! loses a uniqueness race the engine re-reads the row: a present row means
//! the relation is on, an absent one means a peer removed it again and the
//! toggle is retried.

use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{
    parse_id, LikeKey, LikeState, SubscriptionKey, SubscriptionState, TargetKind, VideoCard,
};
use crate::error::{AppError, Result};
use crate::metrics;
use crate::repository::{RelationStore, Repositories, ToggleOutcome};
use crate::services::listings::LikedVideosPage;
use crate::services::pagination::PageRequest;

/// Upper bound on write attempts for one toggle call
pub const MAX_TOGGLE_ATTEMPTS: u32 = 3;

#[derive(Clone)]
pub struct RelationToggleEngine {
    repos: Repositories,
    allow_self_subscription: bool,
}

impl RelationToggleEngine {
    pub fn new(repos: Repositories, allow_self_subscription: bool) -> Self {
        Self {
            repos,
            allow_self_subscription,
        }
    }

    /// Flip the like of `actor_id` on a video, comment or tweet.
    pub async fn toggle_like(
        &self,
        kind: TargetKind,
        target_id: &str,
        actor_id: Uuid,
    ) -> Result<LikeState> {
        let target_id = parse_id(kind.as_str(), target_id)?;
        self.require_actor(actor_id).await?;

        let exists = match kind {
            TargetKind::Video => self.repos.videos.video_exists(target_id).await?,
            TargetKind::Comment => self.repos.comments.comment_exists(target_id).await?,
            TargetKind::Tweet => self.repos.tweets.tweet_exists(target_id).await?,
        };
        if !exists {
            return Err(AppError::not_found(format!("{} not found", kind.label())));
        }

        let key = LikeKey {
            kind,
            target_id,
            liked_by: actor_id,
        };
        let relation = like_relation(kind);
        let liked = settle(relation, self.repos.likes.as_ref(), &key).await?;

        metrics::record_toggle(relation, liked);
        info!(
            target_kind = kind.as_str(),
            target_id = %target_id,
            actor_id = %actor_id,
            liked,
            "Like toggled"
        );

        Ok(LikeState { liked })
    }

    /// Flip the subscription of `actor_id` to a channel.
    pub async fn toggle_subscription(
        &self,
        channel_id: &str,
        actor_id: Uuid,
    ) -> Result<SubscriptionState> {
        let channel_id = parse_id("channel", channel_id)?;

        if channel_id == actor_id && !self.allow_self_subscription {
            return Err(AppError::invalid("Cannot subscribe to your own channel"));
        }
        self.require_actor(actor_id).await?;
        if !self.repos.users.user_exists(channel_id).await? {
            return Err(AppError::not_found("Channel not found"));
        }

        let key = SubscriptionKey {
            channel_id,
            subscriber_id: actor_id,
        };
        let subscribed = settle("subscription", self.repos.subscriptions.as_ref(), &key).await?;

        metrics::record_toggle("subscription", subscribed);
        info!(
            channel_id = %channel_id,
            subscriber_id = %actor_id,
            subscribed,
            "Subscription toggled"
        );

        Ok(SubscriptionState { subscribed })
    }

    /// Videos the actor has liked, most recent like first.
    pub async fn list_liked_videos(
        &self,
        actor_id: Uuid,
        page: PageRequest,
    ) -> Result<LikedVideosPage> {
        let _timer = metrics::query_timer("liked_videos");
        let result: (Vec<VideoCard>, i64) = self
            .repos
            .likes
            .liked_videos(actor_id, page.limit, page.offset())
            .await?;
        Ok(page.paged(result).into())
    }

    /// A verified token can still name an account that has since been removed.
    async fn require_actor(&self, actor_id: Uuid) -> Result<()> {
        if self.repos.users.user_exists(actor_id).await? {
            Ok(())
        } else {
            Err(AppError::Unauthorized("User account not found".to_string()))
        }
    }
}

fn like_relation(kind: TargetKind) -> &'static str {
    match kind {
        TargetKind::Video => "like_video",
        TargetKind::Comment => "like_comment",
        TargetKind::Tweet => "like_tweet",
    }
}

/// Run the conditional write until it settles; returns whether the relation
/// is on afterwards.
async fn settle<K, R>(relation: &'static str, store: &R, key: &K) -> Result<bool>
where
    K: Sync,
    R: RelationStore<K> + ?Sized,
{
    for attempt in 1..=MAX_TOGGLE_ATTEMPTS {
        match store.toggle(key).await? {
            ToggleOutcome::Inserted => return Ok(true),
            ToggleOutcome::Deleted => return Ok(false),
            ToggleOutcome::Conflicted => {
                metrics::record_conflict(relation);
                if store.exists(key).await? {
                    return Ok(true);
                }
                warn!(relation, attempt, "Toggle conflicted and row is gone, retrying");
            }
        }
    }

    Err(AppError::Conflict(format!(
        "Could not settle {} after {} attempts",
        relation, MAX_TOGGLE_ATTEMPTS
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays a fixed sequence of write outcomes and existence answers
    struct ScriptedStore {
        toggles: Mutex<VecDeque<ToggleOutcome>>,
        exists: Mutex<VecDeque<bool>>,
        calls: Mutex<u32>,
    }

    impl ScriptedStore {
        fn new(toggles: &[ToggleOutcome], exists: &[bool]) -> Self {
            Self {
                toggles: Mutex::new(toggles.iter().copied().collect()),
                exists: Mutex::new(exists.iter().copied().collect()),
                calls: Mutex::new(0),
            }
        }

        fn toggle_calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl RelationStore<u8> for ScriptedStore {
        async fn toggle(&self, _key: &u8) -> Result<ToggleOutcome> {
            *self.calls.lock().unwrap() += 1;
            Ok(self.toggles.lock().unwrap().pop_front().unwrap())
        }

        async fn exists(&self, _key: &u8) -> Result<bool> {
            Ok(self.exists.lock().unwrap().pop_front().unwrap())
        }
    }

    #[tokio::test]
    async fn plain_outcomes_map_to_state() {
        let store = ScriptedStore::new(&[ToggleOutcome::Inserted], &[]);
        assert!(settle("test", &store, &0u8).await.unwrap());

        let store = ScriptedStore::new(&[ToggleOutcome::Deleted], &[]);
        assert!(!settle("test", &store, &0u8).await.unwrap());
    }

    #[tokio::test]
    async fn conflict_with_present_row_settles_on() {
        let store = ScriptedStore::new(&[ToggleOutcome::Conflicted], &[true]);
        assert!(settle("test", &store, &0u8).await.unwrap());
        assert_eq!(store.toggle_calls(), 1);
    }

    #[tokio::test]
    async fn conflict_with_vanished_row_retries() {
        let store = ScriptedStore::new(
            &[ToggleOutcome::Conflicted, ToggleOutcome::Inserted],
            &[false],
        );
        assert!(settle("test", &store, &0u8).await.unwrap());
        assert_eq!(store.toggle_calls(), 2);
    }

    #[tokio::test]
    async fn exhausted_attempts_surface_conflict() {
        let store = ScriptedStore::new(
            &[ToggleOutcome::Conflicted; MAX_TOGGLE_ATTEMPTS as usize],
            &[false; MAX_TOGGLE_ATTEMPTS as usize],
        );
        let err = settle("test", &store, &0u8).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.toggle_calls(), MAX_TOGGLE_ATTEMPTS);
    }
}
