use super::{ConnectionStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::fmt;
use uuid::Uuid;

/// A dashboard user's LinkedIn authorization
#[derive(Clone, PartialEq, sqlx::FromRow)]
pub struct LinkedInConnection {
    pub user_id: Uuid,
    /// LinkedIn member id (`sub` from userinfo)
    pub member_id: String,
    pub access_token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub connected_at: DateTime<Utc>,
}

impl LinkedInConnection {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }

    pub fn member_urn(&self) -> String {
        format!("urn:li:person:{}", self.member_id)
    }
}

impl fmt::Debug for LinkedInConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkedInConnection")
            .field("user_id", &self.user_id)
            .field("member_id", &self.member_id)
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("connected_at", &self.connected_at)
            .finish()
    }
}

#[derive(Clone)]
pub struct PgConnectionStore {
    pool: PgPool,
}

impl PgConnectionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConnectionStore for PgConnectionStore {
    async fn find_connection(
        &self,
        user_id: Uuid,
    ) -> Result<Option<LinkedInConnection>, StoreError> {
        let connection = sqlx::query_as::<_, LinkedInConnection>(
            r#"
            SELECT user_id, member_id, access_token, expires_at, connected_at
            FROM linkedin_connections
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(connection)
    }

    async fn save_connection(&self, connection: &LinkedInConnection) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO linkedin_connections (user_id, member_id, access_token, expires_at, connected_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE SET
                member_id = EXCLUDED.member_id,
                access_token = EXCLUDED.access_token,
                expires_at = EXCLUDED.expires_at,
                connected_at = EXCLUDED.connected_at,
                updated_at = NOW()
            "#,
        )
        .bind(connection.user_id)
        .bind(&connection.member_id)
        .bind(&connection.access_token)
        .bind(connection.expires_at)
        .bind(connection.connected_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
