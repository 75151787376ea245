use super::{NewPost, PostStore, StoreError, StoredSentiment};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use engagement_metrics::{MetricsError, Post, Sentiment, SentimentLabel};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    user_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
    likes: i64,
    comments: i64,
    shares: i64,
    sentiment_positive: f64,
    sentiment_negative: f64,
    sentiment_neutral: f64,
    sentiment_overall: String,
}

impl PostRow {
    fn into_post(self) -> Result<Post, MetricsError> {
        let id = self.id;
        let counter = |name: &str, value: i64| {
            u64::try_from(value)
                .map_err(|_| MetricsError::invalid_post(id, format!("{name} is negative ({value})")))
        };

        let overall: SentimentLabel = self
            .sentiment_overall
            .parse()
            .map_err(|e: MetricsError| MetricsError::invalid_post(id, e.to_string()))?;

        let post = Post {
            id,
            user_id: self.user_id,
            content: self.content,
            created_at: self.created_at,
            likes: counter("likes", self.likes)?,
            comments: counter("comments", self.comments)?,
            shares: counter("shares", self.shares)?,
            sentiment: Sentiment {
                positive: self.sentiment_positive,
                negative: self.sentiment_negative,
                neutral: self.sentiment_neutral,
                overall,
            },
        };
        post.validate()?;
        Ok(post)
    }
}

fn rows_into_posts(rows: Vec<PostRow>) -> Result<Vec<Post>, StoreError> {
    rows.into_iter()
        .map(|row| row.into_post().map_err(StoreError::from))
        .collect()
}

/// PostgreSQL counters are BIGINT
fn to_db_count(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// PostgreSQL-backed post store
#[derive(Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn fetch_posts_for_user(&self, user_id: Uuid) -> Result<Vec<Post>, StoreError> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, user_id, content, created_at, likes, comments, shares,
                   sentiment_positive, sentiment_negative, sentiment_neutral, sentiment_overall
            FROM posts
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows_into_posts(rows)
    }

    async fn list_posts_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>, StoreError> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, user_id, content, created_at, likes, comments, shares,
                   sentiment_positive, sentiment_negative, sentiment_neutral, sentiment_overall
            FROM posts
            WHERE user_id = $1
            ORDER BY created_at DESC, id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows_into_posts(rows)
    }

    async fn stored_sentiments(
        &self,
        user_id: Uuid,
    ) -> Result<HashMap<String, StoredSentiment>, StoreError> {
        let rows = sqlx::query_as::<_, (String, String, f64, f64, f64, String)>(
            r#"
            SELECT external_id, content,
                   sentiment_positive, sentiment_negative, sentiment_neutral, sentiment_overall
            FROM posts
            WHERE user_id = $1 AND NOT sentiment_degraded
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut stored = HashMap::with_capacity(rows.len());
        for (external_id, content, positive, negative, neutral, overall) in rows {
            // rows with an unreadable label are simply reclassified
            let Ok(overall) = overall.parse::<SentimentLabel>() else {
                continue;
            };
            stored.insert(
                external_id,
                StoredSentiment {
                    content,
                    sentiment: Sentiment {
                        positive,
                        negative,
                        neutral,
                        overall,
                    },
                },
            );
        }

        Ok(stored)
    }

    async fn upsert_posts(&self, user_id: Uuid, posts: &[NewPost]) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut written = 0;

        for post in posts {
            let result = sqlx::query(
                r#"
                INSERT INTO posts (
                    user_id, external_id, content, created_at,
                    likes, comments, shares, impressions,
                    sentiment_positive, sentiment_negative, sentiment_neutral, sentiment_overall,
                    sentiment_degraded, synced_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, NOW())
                ON CONFLICT (user_id, external_id) DO UPDATE SET
                    content = EXCLUDED.content,
                    likes = EXCLUDED.likes,
                    comments = EXCLUDED.comments,
                    shares = EXCLUDED.shares,
                    impressions = EXCLUDED.impressions,
                    sentiment_positive = EXCLUDED.sentiment_positive,
                    sentiment_negative = EXCLUDED.sentiment_negative,
                    sentiment_neutral = EXCLUDED.sentiment_neutral,
                    sentiment_overall = EXCLUDED.sentiment_overall,
                    sentiment_degraded = EXCLUDED.sentiment_degraded,
                    synced_at = NOW()
                "#,
            )
            .bind(user_id)
            .bind(&post.external_id)
            .bind(&post.content)
            .bind(post.created_at)
            .bind(to_db_count(post.likes))
            .bind(to_db_count(post.comments))
            .bind(to_db_count(post.shares))
            .bind(to_db_count(post.impressions))
            .bind(post.sentiment.positive)
            .bind(post.sentiment.negative)
            .bind(post.sentiment.neutral)
            .bind(post.sentiment.overall.as_str())
            .bind(post.sentiment_degraded)
            .execute(&mut *tx)
            .await?;

            written += result.rows_affected();
        }

        tx.commit().await?;
        Ok(written)
    }
}
