use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::missing_reference;
use crate::domain::{TargetKind, Tweet, TweetView};
use crate::error::Result;
use crate::repository::TweetRepository;

#[derive(Clone)]
pub struct PgTweetRepository {
    pool: PgPool,
}

impl PgTweetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TweetRepository for PgTweetRepository {
    async fn tweet_exists(&self, tweet_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tweets WHERE id = $1)")
            .bind(tweet_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn find_tweet(&self, tweet_id: Uuid) -> Result<Option<Tweet>> {
        let tweet = sqlx::query_as::<_, Tweet>(
            "SELECT id, owner_id, content, created_at FROM tweets WHERE id = $1",
        )
        .bind(tweet_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tweet)
    }

    async fn create_tweet(&self, tweet: &Tweet) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tweets (id, owner_id, content, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(tweet.id)
        .bind(tweet.owner_id)
        .bind(&tweet.content)
        .bind(tweet.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| missing_reference(e, "User"))?;

        Ok(())
    }

    async fn update_tweet(&self, tweet_id: Uuid, content: &str) -> Result<Option<Tweet>> {
        let tweet = sqlx::query_as::<_, Tweet>(
            r#"
            UPDATE tweets
            SET content = $2
            WHERE id = $1
            RETURNING id, owner_id, content, created_at
            "#,
        )
        .bind(tweet_id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tweet)
    }

    async fn delete_tweet(&self, tweet_id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM likes WHERE target_kind = $1 AND target_id = $2")
            .bind(TargetKind::Tweet.as_str())
            .bind(tweet_id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM tweets WHERE id = $1")
            .bind(tweet_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
    }

    async fn tweets_by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<TweetView>, i64)> {
        let tweets = sqlx::query_as::<_, TweetView>(
            r#"
            SELECT id, content, created_at
            FROM tweets
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tweets WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((tweets, total))
    }
}
