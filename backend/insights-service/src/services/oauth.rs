use crate::db::{ConnectionStore, LinkedInConnection};
use crate::error::{AppError, Result};
use crate::providers::LinkedInClient;
use chrono::Utc;
use redis::aio::ConnectionManager;
use std::sync::Arc;
use uuid::Uuid;

const OAUTH_STATE_TTL_SECONDS: usize = 600;

fn state_key(state: &str) -> String {
    format!("insights:linkedin:oauth_state:{state}")
}

/// LinkedIn account linking (authorization code flow).
#[derive(Clone)]
pub struct LinkedInOAuthService {
    linkedin: LinkedInClient,
    redis: ConnectionManager,
    connections: Arc<dyn ConnectionStore>,
}

impl LinkedInOAuthService {
    pub fn new(
        linkedin: LinkedInClient,
        redis: ConnectionManager,
        connections: Arc<dyn ConnectionStore>,
    ) -> Self {
        Self {
            linkedin,
            redis,
            connections,
        }
    }

    /// Start linking for `user_id`; returns the LinkedIn consent URL.
    pub async fn start_flow(&self, user_id: Uuid) -> Result<String> {
        let state = Uuid::new_v4().to_string();
        self.store_state(&state, user_id).await?;

        let url = self.linkedin.authorization_url(&state)?;
        tracing::info!(user_id = %user_id, "LinkedIn authorization started");
        Ok(url)
    }

    /// Finish linking from the OAuth callback; returns the linked user.
    pub async fn complete_flow(&self, code: &str, state: &str) -> Result<Uuid> {
        let user_id = self.consume_state(state).await?;

        let token = self.linkedin.exchange_code(code).await?;
        let member_id = self.linkedin.fetch_member_id(&token.access_token).await?;

        let now = Utc::now();
        let connection = LinkedInConnection {
            user_id,
            member_id,
            access_token: token.access_token.clone(),
            expires_at: token.expires_at(now),
            connected_at: now,
        };
        self.connections.save_connection(&connection).await?;

        tracing::info!(
            user_id = %user_id,
            member_id = %connection.member_id,
            "LinkedIn account connected"
        );
        Ok(user_id)
    }

    async fn store_state(&self, state: &str, user_id: Uuid) -> Result<()> {
        let mut conn = self.redis.clone();
        redis::cmd("SETEX")
            .arg(state_key(state))
            .arg(OAUTH_STATE_TTL_SECONDS)
            .arg(user_id.to_string())
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    /// Read and delete the state in one step (GETDEL, Redis 6.2+).
    async fn consume_state(&self, state: &str) -> Result<Uuid> {
        let mut conn = self.redis.clone();

        let data: Option<String> = redis::cmd("GETDEL")
            .arg(state_key(state))
            .query_async(&mut conn)
            .await?;

        data.as_deref()
            .and_then(|user_id| Uuid::parse_str(user_id).ok())
            .ok_or_else(|| AppError::BadRequest("Invalid or expired OAuth state".into()))
    }
}

/// Where the browser lands after the OAuth callback.
pub fn callback_redirect(frontend_url: &str, outcome: &Result<Uuid>) -> String {
    let base = frontend_url.trim_end_matches('/');
    match outcome {
        Ok(_) => format!("{}/dashboard?linkedin=connected", base),
        Err(_) => format!("{}/dashboard?error=linkedin_connection_failed", base),
    }
}
