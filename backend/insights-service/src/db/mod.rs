/// Database access layer
///
/// This module provides:
/// - PostgreSQL pool creation and embedded migrations
/// - `PostStore`: per-user post snapshots read by analytics and written by sync
/// - `ConnectionStore`: stored LinkedIn authorizations
/// - In-memory implementations of both for tests and local runs
pub mod connection_repo;
pub mod memory;
pub mod post_repo;

pub use connection_repo::{LinkedInConnection, PgConnectionStore};
pub use memory::{InMemoryConnectionStore, InMemoryPostStore};
pub use post_repo::PgPostStore;

use crate::config::DatabaseConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use engagement_metrics::{MetricsError, Post, Sentiment};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Unavailable(String),

    #[error(transparent)]
    InvalidRow(#[from] MetricsError),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// A post pulled from LinkedIn, ready to be written to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    /// LinkedIn post URN
    pub external_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub impressions: u64,
    pub sentiment: Sentiment,
    /// Neutral fallback stored because classification failed
    pub sentiment_degraded: bool,
}

/// Content and sentiment already stored for a LinkedIn post.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSentiment {
    pub content: String,
    pub sentiment: Sentiment,
}

#[async_trait]
pub trait PostStore: Send + Sync {
    /// Every post owned by `user_id`, in no particular order.
    async fn fetch_posts_for_user(&self, user_id: Uuid) -> Result<Vec<Post>, StoreError>;

    /// One page of posts owned by `user_id`, newest first.
    async fn list_posts_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>, StoreError>;

    /// Stored sentiment keyed by LinkedIn post URN. Degraded fallbacks are left
    /// out so those posts go back through the classifier.
    async fn stored_sentiments(
        &self,
        user_id: Uuid,
    ) -> Result<HashMap<String, StoredSentiment>, StoreError>;

    /// Insert or refresh posts by `(user_id, external_id)`. Returns rows written.
    async fn upsert_posts(&self, user_id: Uuid, posts: &[NewPost]) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait ConnectionStore: Send + Sync {
    async fn find_connection(&self, user_id: Uuid)
        -> Result<Option<LinkedInConnection>, StoreError>;

    async fn save_connection(&self, connection: &LinkedInConnection) -> Result<(), StoreError>;
}

/// Create the PostgreSQL pool used by the service.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect(&config.url)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        "PostgreSQL pool created"
    );
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
