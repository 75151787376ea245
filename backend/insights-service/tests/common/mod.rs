#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use engagement_metrics::{Post, Sentiment};
use insights_service::config::{LinkedInConfig, OpenAiConfig, StripeConfig};
use insights_service::providers::{ClassifierError, SentimentClassifier};
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

type Classify = dyn Fn(&str) -> Result<Sentiment, ClassifierError> + Send + Sync;

/// Classifier whose answer is decided by a closure; counts calls.
pub struct StubClassifier {
    classify: Box<Classify>,
    calls: AtomicUsize,
}

impl StubClassifier {
    pub fn new(
        classify: impl Fn(&str) -> Result<Sentiment, ClassifierError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            classify: Box::new(classify),
            calls: AtomicUsize::new(0),
        }
    }

    /// Positive for any non-empty text.
    pub fn positive() -> Self {
        Self::new(|text| {
            if text.trim().is_empty() {
                Err(ClassifierError::InvalidInput)
            } else {
                Ok(Sentiment::from_scores(0.7, 0.1, 0.2))
            }
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SentimentClassifier for StubClassifier {
    async fn classify(&self, text: &str) -> Result<Sentiment, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.classify)(text)
    }

    fn name(&self) -> &str {
        "stub"
    }
}

pub fn post(
    user_id: Uuid,
    created_at: DateTime<Utc>,
    (likes, comments, shares): (u64, u64, u64),
    sentiment: Sentiment,
) -> Post {
    Post {
        id: Uuid::new_v4(),
        user_id,
        content: "Excited to share our latest release".to_string(),
        created_at,
        likes,
        comments,
        shares,
        sentiment,
    }
}

pub fn openai_config(base_url: &str) -> OpenAiConfig {
    OpenAiConfig {
        api_key: "sk-test".to_string(),
        model: "gpt-4".to_string(),
        base_url: base_url.to_string(),
        timeout_ms: 2_000,
    }
}

pub fn linkedin_config(base_url: &str) -> LinkedInConfig {
    LinkedInConfig {
        client_id: "client-123".to_string(),
        client_secret: "li-secret".to_string(),
        redirect_uri: "http://localhost:8090/api/v1/linkedin/callback".to_string(),
        scope: "openid profile r_member_social".to_string(),
        auth_base_url: base_url.to_string(),
        api_base_url: base_url.to_string(),
        api_version: "202405".to_string(),
        max_posts: 50,
        sync_concurrency: 2,
        timeout_ms: 2_000,
    }
}

pub fn stripe_config(base_url: &str) -> StripeConfig {
    StripeConfig {
        secret_key: "sk_test_123".to_string(),
        base_url: base_url.to_string(),
        premium_price_id: "price_premium".to_string(),
        allowed_price_ids: vec!["price_annual".to_string()],
        success_url: "http://localhost:3000/dashboard?checkout=success".to_string(),
        cancel_url: "http://localhost:3000/dashboard?checkout=cancelled".to_string(),
        timeout_ms: 2_000,
    }
}
