use crate::db::{ConnectionStore, NewPost, PostStore, StoredSentiment};
use crate::error::{AppError, Result};
use crate::metrics::LINKEDIN_SYNC_POSTS_TOTAL;
use crate::providers::{
    ClassifierError, LinkedInClient, LinkedInError, LinkedInPost, SentimentClassifier,
};
use chrono::Utc;
use engagement_metrics::Sentiment;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Counters returned by `POST /linkedin/sync`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub fetched: usize,
    pub stored: u64,
    /// Posts sent to the classifier successfully
    pub classified: usize,
    /// Posts whose stored sentiment was still valid
    pub reused: usize,
    pub classifier_failures: usize,
}

/// Where a synced post's sentiment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SentimentSource {
    Classified,
    Reused,
    /// No text to classify
    Empty,
    /// Classifier failed; stored as neutral
    Degraded,
}

impl SentimentSource {
    fn as_str(self) -> &'static str {
        match self {
            SentimentSource::Classified => "classified",
            SentimentSource::Reused => "reused",
            SentimentSource::Empty => "empty",
            SentimentSource::Degraded => "degraded",
        }
    }
}

/// Pulls a member's posts from LinkedIn, classifies them and refreshes the store.
#[derive(Clone)]
pub struct LinkedInSyncService {
    linkedin: LinkedInClient,
    store: Arc<dyn PostStore>,
    connections: Arc<dyn ConnectionStore>,
    classifier: Arc<dyn SentimentClassifier>,
    max_posts: u32,
    concurrency: usize,
}

impl LinkedInSyncService {
    pub fn new(
        linkedin: LinkedInClient,
        store: Arc<dyn PostStore>,
        connections: Arc<dyn ConnectionStore>,
        classifier: Arc<dyn SentimentClassifier>,
        max_posts: u32,
        concurrency: usize,
    ) -> Self {
        Self {
            linkedin,
            store,
            connections,
            classifier,
            max_posts,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn sync(&self, user_id: Uuid) -> Result<SyncSummary> {
        let connection = self
            .connections
            .find_connection(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("LinkedIn account not connected".into()))?;

        if connection.is_expired(Utc::now()) {
            return Err(LinkedInError::TokenExpired.into());
        }

        let posts = self
            .linkedin
            .fetch_posts(
                &connection.access_token,
                &connection.member_urn(),
                self.max_posts,
            )
            .await?;
        let stored = self.store.stored_sentiments(user_id).await?;

        let resolved: Vec<(NewPost, SentimentSource)> = stream::iter(posts)
            .map(|post| self.resolve(post, &stored))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut summary = SyncSummary {
            fetched: resolved.len(),
            ..SyncSummary::default()
        };
        for (_, source) in &resolved {
            LINKEDIN_SYNC_POSTS_TOTAL
                .with_label_values(&[source.as_str()])
                .inc();
            match source {
                SentimentSource::Classified => summary.classified += 1,
                SentimentSource::Reused => summary.reused += 1,
                SentimentSource::Degraded => summary.classifier_failures += 1,
                SentimentSource::Empty => {}
            }
        }

        let new_posts: Vec<NewPost> = resolved.into_iter().map(|(post, _)| post).collect();
        summary.stored = self.store.upsert_posts(user_id, &new_posts).await?;

        tracing::info!(
            user_id = %user_id,
            fetched = summary.fetched,
            stored = summary.stored,
            reused = summary.reused,
            classifier_failures = summary.classifier_failures,
            "LinkedIn sync completed"
        );
        Ok(summary)
    }

    async fn resolve(
        &self,
        post: LinkedInPost,
        stored: &HashMap<String, StoredSentiment>,
    ) -> (NewPost, SentimentSource) {
        let (sentiment, source) = match stored.get(&post.id) {
            Some(previous) if previous.content == post.content => {
                (previous.sentiment, SentimentSource::Reused)
            }
            _ => match self.classifier.classify(&post.content).await {
                Ok(sentiment) => (sentiment, SentimentSource::Classified),
                Err(ClassifierError::InvalidInput) => {
                    (Sentiment::neutral(), SentimentSource::Empty)
                }
                Err(e) => {
                    tracing::warn!(
                        post_id = %post.id,
                        classifier = self.classifier.name(),
                        error = %e,
                        "Classification failed, storing neutral sentiment"
                    );
                    (Sentiment::neutral(), SentimentSource::Degraded)
                }
            },
        };

        let new_post = NewPost {
            external_id: post.id,
            content: post.content,
            created_at: post.published_at,
            likes: post.stats.likes,
            comments: post.stats.comments,
            shares: post.stats.shares,
            impressions: post.stats.impressions,
            sentiment,
            sentiment_degraded: source == SentimentSource::Degraded,
        };
        (new_post, source)
    }
}
