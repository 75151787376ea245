use crate::db::PostStore;
use crate::error::{AppError, Result};
use crate::metrics::ANALYTICS_COMPUTE_DURATION_SECONDS;
use chrono::{DateTime, FixedOffset, Utc};
use engagement_metrics::{AnalyticsSnapshot, Post};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Analytics view returned to the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    #[serde(flatten)]
    pub snapshot: AnalyticsSnapshot,
    pub window_days: u32,
    /// Reference instant in the display time zone
    pub as_of: DateTime<FixedOffset>,
}

/// Reads a user's posts and computes the analytics view over one snapshot.
#[derive(Clone)]
pub struct AnalyticsService {
    store: Arc<dyn PostStore>,
    default_offset_minutes: i32,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn PostStore>, default_offset_minutes: i32) -> Self {
        Self {
            store,
            default_offset_minutes,
        }
    }

    pub async fn report(
        &self,
        user_id: Uuid,
        window_days: u32,
        tz_offset_minutes: Option<i32>,
    ) -> Result<AnalyticsReport> {
        self.report_at(user_id, window_days, tz_offset_minutes, Utc::now())
            .await
    }

    /// Same as `report`, with an explicit reference instant.
    pub async fn report_at(
        &self,
        user_id: Uuid,
        window_days: u32,
        tz_offset_minutes: Option<i32>,
        now: DateTime<Utc>,
    ) -> Result<AnalyticsReport> {
        let minutes = tz_offset_minutes.unwrap_or(self.default_offset_minutes);
        let offset = FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
            AppError::Validation(format!("tz_offset_minutes out of range: {}", minutes))
        })?;

        let posts = self.store.fetch_posts_for_user(user_id).await?;
        let as_of = now.with_timezone(&offset);

        let timer = ANALYTICS_COMPUTE_DURATION_SECONDS.start_timer();
        let snapshot = AnalyticsSnapshot::compute(&posts, window_days, &as_of);
        timer.observe_duration();

        tracing::debug!(
            user_id = %user_id,
            posts = posts.len(),
            window_days,
            "Analytics computed"
        );

        Ok(AnalyticsReport {
            snapshot,
            window_days,
            as_of,
        })
    }

    /// One page of the user's posts, newest first.
    pub async fn list_posts(&self, user_id: Uuid, limit: i64, offset: i64) -> Result<Vec<Post>> {
        Ok(self
            .store
            .list_posts_for_user(user_id, limit, offset)
            .await?)
    }
}
