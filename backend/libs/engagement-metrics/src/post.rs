use crate::error::MetricsError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Allowed drift of `positive + negative + neutral` away from 1.0.
pub const SCORE_SUM_TOLERANCE: f64 = 1e-3;

/// Dominant sentiment class of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// All labels in tie-break priority order.
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Neutral,
        SentimentLabel::Negative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(SentimentLabel::Positive),
            "neutral" => Ok(SentimentLabel::Neutral),
            "negative" => Ok(SentimentLabel::Negative),
            other => Err(MetricsError::UnknownLabel(other.to_string())),
        }
    }
}

/// Three-way sentiment distribution plus its dominant label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
    pub overall: SentimentLabel,
}

impl Sentiment {
    /// Build a sentiment from raw scores, deriving `overall` as the argmax.
    ///
    /// Exact ties resolve as `positive > neutral > negative`.
    pub fn from_scores(positive: f64, negative: f64, neutral: f64) -> Self {
        Self {
            positive,
            negative,
            neutral,
            overall: dominant_label(positive, negative, neutral),
        }
    }

    /// Value stored when no classification is available.
    pub fn neutral() -> Self {
        Self::from_scores(0.0, 0.0, 1.0)
    }

    pub fn score(&self, label: SentimentLabel) -> f64 {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Neutral => self.neutral,
            SentimentLabel::Negative => self.negative,
        }
    }

    fn check(&self) -> Result<(), String> {
        for label in SentimentLabel::ALL {
            let score = self.score(label);
            if !score.is_finite() || score < 0.0 {
                return Err(format!("{} score must be a finite non-negative number", label));
            }
        }

        let sum = self.positive + self.negative + self.neutral;
        if (sum - 1.0).abs() > SCORE_SUM_TOLERANCE {
            return Err(format!("sentiment scores sum to {sum}, expected 1.0"));
        }

        let expected = dominant_label(self.positive, self.negative, self.neutral);
        if self.overall != expected {
            return Err(format!(
                "overall label {} does not match dominant score {}",
                self.overall, expected
            ));
        }

        Ok(())
    }
}

fn dominant_label(positive: f64, negative: f64, neutral: f64) -> SentimentLabel {
    let scored = [
        (SentimentLabel::Positive, positive),
        (SentimentLabel::Neutral, neutral),
        (SentimentLabel::Negative, negative),
    ];

    let mut best = scored[0];
    for candidate in &scored[1..] {
        // strict comparison keeps the earlier label on ties
        if candidate.1 > best.1 {
            best = *candidate;
        }
    }
    best.0
}

/// One user-authored post as read from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub sentiment: Sentiment,
}

impl Post {
    /// likes + comments + shares
    pub fn engagement(&self) -> u64 {
        self.likes
            .saturating_add(self.comments)
            .saturating_add(self.shares)
    }

    /// Reject posts whose sentiment is not a valid distribution.
    pub fn validate(&self) -> Result<(), MetricsError> {
        self.sentiment
            .check()
            .map_err(|reason| MetricsError::invalid_post(self.id, reason))
    }
}
