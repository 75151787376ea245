//! Engagement aggregation for LinkedIn post snapshots
//!
//! Pure functions that turn a user's posts (fetched wholesale from the store)
//! into the three views the dashboard renders:
//!
//! - [`compute_metrics`]: totals and average engagement per post
//! - [`compute_daily_series`]: likes/comments/shares per calendar day over a trailing window
//! - [`compute_sentiment_histogram`]: number of posts per sentiment label
//!
//! [`AnalyticsSnapshot::compute`] produces all three in a single call so each
//! data load aggregates exactly once. Nothing here performs I/O or caches results.

mod aggregate;
mod error;
mod post;
mod series;

pub use aggregate::{
    compute_metrics, compute_sentiment_histogram, AnalyticsSnapshot, EngagementMetrics,
    SentimentHistogram,
};
pub use error::MetricsError;
pub use post::{Post, Sentiment, SentimentLabel, SCORE_SUM_TOLERANCE};
pub use series::{compute_daily_series, window_dates, DailyEngagement, DEFAULT_WINDOW_DAYS};
