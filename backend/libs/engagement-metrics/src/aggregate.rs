use crate::post::{Post, SentimentLabel};
use crate::series::{compute_daily_series, DailyEngagement};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Summary totals over a set of posts. Recomputed on every view, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EngagementMetrics {
    pub total_posts: u64,
    pub total_likes: u64,
    pub total_comments: u64,
    pub total_shares: u64,
    /// (likes + comments + shares) / posts, 0 when there are no posts
    pub average_engagement: f64,
}

/// Post counts per sentiment label. Every label is always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SentimentHistogram {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
}

impl SentimentHistogram {
    pub fn count(&self, label: SentimentLabel) -> u64 {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Neutral => self.neutral,
            SentimentLabel::Negative => self.negative,
        }
    }

    pub fn total(&self) -> u64 {
        self.positive + self.neutral + self.negative
    }

    fn record(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Negative => self.negative += 1,
        }
    }
}

pub fn compute_metrics(posts: &[Post]) -> EngagementMetrics {
    let mut metrics = posts
        .iter()
        .fold(EngagementMetrics::default(), |mut acc, post| {
            acc.total_posts += 1;
            acc.total_likes = acc.total_likes.saturating_add(post.likes);
            acc.total_comments = acc.total_comments.saturating_add(post.comments);
            acc.total_shares = acc.total_shares.saturating_add(post.shares);
            acc
        });

    if metrics.total_posts > 0 {
        let engagement = metrics
            .total_likes
            .saturating_add(metrics.total_comments)
            .saturating_add(metrics.total_shares);
        metrics.average_engagement = engagement as f64 / metrics.total_posts as f64;
    }

    metrics
}

pub fn compute_sentiment_histogram(posts: &[Post]) -> SentimentHistogram {
    let mut histogram = SentimentHistogram::default();
    for post in posts {
        histogram.record(post.sentiment.overall);
    }
    histogram
}

/// Everything the analytics view needs from one data load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub metrics: EngagementMetrics,
    pub daily_series: Vec<DailyEngagement>,
    pub sentiment_histogram: SentimentHistogram,
}

impl AnalyticsSnapshot {
    pub fn compute<Tz: TimeZone>(posts: &[Post], window_days: u32, as_of: &DateTime<Tz>) -> Self {
        Self {
            metrics: compute_metrics(posts),
            daily_series: compute_daily_series(posts, window_days, as_of),
            sentiment_histogram: compute_sentiment_histogram(posts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::Sentiment;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn post(likes: u64, comments: u64, shares: u64, sentiment: Sentiment) -> Post {
        Post {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            content: "update".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 4, 2, 9, 0, 0).unwrap(),
            likes,
            comments,
            shares,
            sentiment,
        }
    }

    fn positive() -> Sentiment {
        Sentiment::from_scores(0.8, 0.1, 0.1)
    }

    fn negative() -> Sentiment {
        Sentiment::from_scores(0.1, 0.8, 0.1)
    }

    #[test]
    fn empty_input_is_all_zero() {
        let metrics = compute_metrics(&[]);
        assert_eq!(metrics, EngagementMetrics::default());
        assert_eq!(metrics.average_engagement, 0.0);
        assert!(!metrics.average_engagement.is_nan());
    }

    #[test]
    fn two_posts_same_day_example() {
        let posts = vec![post(2, 1, 0, positive()), post(4, 0, 1, positive())];
        let metrics = compute_metrics(&posts);

        assert_eq!(metrics.total_posts, 2);
        assert_eq!(metrics.total_likes, 6);
        assert_eq!(metrics.total_comments, 1);
        assert_eq!(metrics.total_shares, 1);
        assert_eq!(metrics.average_engagement, 4.0);
    }

    #[test]
    fn totals_do_not_depend_on_order() {
        let posts = vec![
            post(3, 0, 1, positive()),
            post(10, 4, 2, negative()),
            post(0, 0, 0, Sentiment::neutral()),
            post(7, 7, 7, positive()),
        ];
        let expected = compute_metrics(&posts);

        let mut rotated = posts.clone();
        for _ in 0..posts.len() {
            rotated.rotate_left(1);
            assert_eq!(compute_metrics(&rotated), expected);
        }

        let mut reversed = posts.clone();
        reversed.reverse();
        assert_eq!(compute_metrics(&reversed), expected);
        assert_eq!(
            compute_sentiment_histogram(&reversed),
            compute_sentiment_histogram(&posts)
        );
    }

    #[test]
    fn histogram_of_empty_input_keeps_every_label() {
        let histogram = compute_sentiment_histogram(&[]);
        assert_eq!(
            histogram,
            SentimentHistogram {
                positive: 0,
                neutral: 0,
                negative: 0
            }
        );

        let json = serde_json::to_value(histogram).unwrap();
        for label in SentimentLabel::ALL {
            assert_eq!(json[label.as_str()], 0);
        }
    }

    #[test]
    fn histogram_counts_sum_to_post_count() {
        let posts = vec![
            post(1, 0, 0, positive()),
            post(1, 0, 0, positive()),
            post(1, 0, 0, negative()),
            post(1, 0, 0, Sentiment::neutral()),
            post(1, 0, 0, Sentiment::from_scores(0.5, 0.0, 0.5)),
        ];
        let histogram = compute_sentiment_histogram(&posts);

        assert_eq!(histogram.positive, 3);
        assert_eq!(histogram.neutral, 1);
        assert_eq!(histogram.negative, 1);
        assert_eq!(histogram.total(), posts.len() as u64);
    }

    #[test]
    fn snapshot_counts_old_posts_in_totals_only() {
        let as_of = Utc.with_ymd_and_hms(2024, 4, 30, 12, 0, 0).unwrap();
        let mut old = post(5, 5, 5, positive());
        old.created_at = as_of - Duration::days(90);
        let mut recent = post(1, 2, 3, negative());
        recent.created_at = as_of - Duration::days(1);

        let snapshot = AnalyticsSnapshot::compute(&[old, recent], 30, &as_of);

        assert_eq!(snapshot.metrics.total_posts, 2);
        assert_eq!(snapshot.metrics.total_likes, 6);
        assert_eq!(snapshot.daily_series.len(), 30);
        assert_eq!(snapshot.daily_series.iter().map(|d| d.likes).sum::<u64>(), 1);
        assert_eq!(snapshot.sentiment_histogram.total(), 2);
    }
}
