use crate::config::LinkedInConfig;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Posts whose statistics are fetched at the same time.
const STATS_CONCURRENCY: usize = 4;

#[derive(Debug, Error)]
pub enum LinkedInError {
    #[error("LinkedIn request failed: {0}")]
    Transport(String),

    #[error("LinkedIn returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode LinkedIn response: {0}")]
    Decode(String),

    #[error("LinkedIn access token expired or revoked")]
    TokenExpired,

    #[error("Invalid LinkedIn URL: {0}")]
    InvalidUrl(String),
}

#[derive(Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    /// Lifetime in seconds
    pub expires_in: Option<i64>,
}

impl AccessToken {
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.expires_in.map(|secs| now + ChronoDuration::seconds(secs))
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostStats {
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub impressions: u64,
}

/// A member post with its lifetime statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedInPost {
    /// Post URN (`urn:li:share:*` or `urn:li:ugcPost:*`)
    pub id: String,
    pub content: String,
    pub published_at: DateTime<Utc>,
    pub stats: PostStats,
}

#[derive(Deserialize)]
struct UserInfo {
    sub: String,
}

#[derive(Deserialize)]
struct Elements<T> {
    #[serde(default = "Vec::new")]
    elements: Vec<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostElement {
    id: String,
    #[serde(default)]
    commentary: Option<String>,
    #[serde(default)]
    published_at: Option<i64>,
    #[serde(default)]
    created_at: Option<i64>,
}

#[derive(Deserialize)]
struct AnalyticsElement {
    #[serde(default)]
    count: u64,
}

#[derive(Debug, Clone, Copy)]
enum StatKind {
    Reactions,
    Comments,
    Reshares,
    Impressions,
}

impl StatKind {
    fn query_type(self) -> &'static str {
        match self {
            StatKind::Reactions => "REACTION",
            StatKind::Comments => "COMMENT",
            StatKind::Reshares => "RESHARE",
            StatKind::Impressions => "IMPRESSION",
        }
    }
}

/// LinkedIn OAuth and REST client
#[derive(Clone)]
pub struct LinkedInClient {
    http: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scope: String,
    auth_base_url: String,
    api_base_url: String,
    api_version: String,
}

impl LinkedInClient {
    pub fn new(config: &LinkedInConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            http,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            scope: config.scope.clone(),
            auth_base_url: config.auth_base_url.trim_end_matches('/').to_string(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
        })
    }

    /// URL the member's browser is sent to for consent.
    pub fn authorization_url(&self, state: &str) -> Result<String, LinkedInError> {
        let mut url =
            reqwest::Url::parse(&format!("{}/oauth/v2/authorization", self.auth_base_url))
                .map_err(|e| LinkedInError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("scope", &self.scope)
            .append_pair("state", state);
        Ok(url.to_string())
    }

    pub async fn exchange_code(&self, code: &str) -> Result<AccessToken, LinkedInError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let response = self
            .http
            .post(format!("{}/oauth/v2/accessToken", self.auth_base_url))
            .form(&params)
            .send()
            .await
            .map_err(|e| LinkedInError::Transport(e.to_string()))?;

        read_json(response).await
    }

    /// Member id (`sub`) of the token's owner.
    pub async fn fetch_member_id(&self, access_token: &str) -> Result<String, LinkedInError> {
        let response = self
            .http
            .get(format!("{}/v2/userinfo", self.api_base_url))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| LinkedInError::Transport(e.to_string()))?;

        let info: UserInfo = read_json(response).await?;
        Ok(info.sub)
    }

    /// Up to `count` posts authored by `author_urn`, with statistics, in the order LinkedIn returns them.
    pub async fn fetch_posts(
        &self,
        access_token: &str,
        author_urn: &str,
        count: u32,
    ) -> Result<Vec<LinkedInPost>, LinkedInError> {
        let url = format!(
            "{}/rest/posts?q=author&author={}&count={}",
            self.api_base_url,
            urlencoding::encode(author_urn),
            count
        );
        let page: Elements<PostElement> = self.rest_get(&url, access_token).await?;

        let elements: Vec<(String, String, DateTime<Utc>)> = page
            .elements
            .into_iter()
            .filter_map(|element| {
                let millis = element.published_at.or(element.created_at)?;
                let published_at = DateTime::from_timestamp_millis(millis)?;
                Some((
                    element.id,
                    element.commentary.unwrap_or_default(),
                    published_at,
                ))
            })
            .collect();

        stream::iter(elements)
            .map(|(id, content, published_at)| async move {
                let stats = self.fetch_post_stats(access_token, &id).await?;
                Ok::<_, LinkedInError>(LinkedInPost {
                    id,
                    content,
                    published_at,
                    stats,
                })
            })
            .buffered(STATS_CONCURRENCY)
            .try_collect()
            .await
    }

    /// Lifetime reactions, comments, reshares and impressions of one post.
    pub async fn fetch_post_stats(
        &self,
        access_token: &str,
        post_urn: &str,
    ) -> Result<PostStats, LinkedInError> {
        let (likes, comments, shares, impressions) = futures::try_join!(
            self.fetch_stat(access_token, post_urn, StatKind::Reactions),
            self.fetch_stat(access_token, post_urn, StatKind::Comments),
            self.fetch_stat(access_token, post_urn, StatKind::Reshares),
            self.fetch_stat(access_token, post_urn, StatKind::Impressions),
        )?;

        Ok(PostStats {
            likes,
            comments,
            shares,
            impressions,
        })
    }

    async fn fetch_stat(
        &self,
        access_token: &str,
        post_urn: &str,
        kind: StatKind,
    ) -> Result<u64, LinkedInError> {
        let url = format!(
            "{}/rest/memberCreatorPostAnalytics?q=entity&entity={}&queryType={}&aggregation=TOTAL",
            self.api_base_url,
            analytics_entity(post_urn),
            kind.query_type()
        );
        let page: Elements<AnalyticsElement> = self.rest_get(&url, access_token).await?;
        Ok(page.elements.iter().map(|e| e.count).sum())
    }

    async fn rest_get<T: DeserializeOwned>(
        &self,
        url: &str,
        access_token: &str,
    ) -> Result<T, LinkedInError> {
        let response = self
            .rest_request(self.http.get(url))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| LinkedInError::Transport(e.to_string()))?;

        read_json(response).await
    }

    fn rest_request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("LinkedIn-Version", &self.api_version)
            .header("X-Restli-Protocol-Version", "2.0.0")
    }
}

/// Rest.li entity key for a post URN, e.g. `(share:urn%3Ali%3Ashare%3A123)`.
fn analytics_entity(post_urn: &str) -> String {
    let kind = if post_urn.starts_with("urn:li:ugcPost:") {
        "ugc"
    } else {
        "share"
    };
    format!("({}:{})", kind, urlencoding::encode(post_urn))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, LinkedInError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(LinkedInError::TokenExpired);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(LinkedInError::Status {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| LinkedInError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LinkedInConfig {
        LinkedInConfig {
            client_id: "client-123".into(),
            client_secret: "secret".into(),
            redirect_uri: "http://localhost:8090/api/v1/linkedin/callback".into(),
            scope: "openid profile r_member_social".into(),
            auth_base_url: "https://www.linkedin.com/".into(),
            api_base_url: "https://api.linkedin.com".into(),
            api_version: "202405".into(),
            max_posts: 100,
            sync_concurrency: 4,
            timeout_ms: 1_000,
        }
    }

    #[test]
    fn authorization_url_carries_oauth_parameters() {
        let client = LinkedInClient::new(&config()).unwrap();
        let url = reqwest::Url::parse(&client.authorization_url("state-abc").unwrap()).unwrap();

        assert_eq!(url.path(), "/oauth/v2/authorization");
        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(pairs["client_id"], "client-123");
        assert_eq!(pairs["state"], "state-abc");
        assert_eq!(pairs["scope"], "openid profile r_member_social");
        assert_eq!(
            pairs["redirect_uri"],
            "http://localhost:8090/api/v1/linkedin/callback"
        );
    }

    #[test]
    fn analytics_entity_depends_on_urn_kind() {
        assert_eq!(
            analytics_entity("urn:li:share:42"),
            "(share:urn%3Ali%3Ashare%3A42)"
        );
        assert_eq!(
            analytics_entity("urn:li:ugcPost:7"),
            "(ugc:urn%3Ali%3AugcPost%3A7)"
        );
    }

    #[test]
    fn token_expiry_is_relative_to_now() {
        let now = Utc::now();
        let token = AccessToken {
            access_token: "AQV-token".into(),
            expires_in: Some(3600),
        };
        assert_eq!(token.expires_at(now), Some(now + ChronoDuration::hours(1)));
        assert!(!format!("{:?}", token).contains("AQV-token"));
    }
}
