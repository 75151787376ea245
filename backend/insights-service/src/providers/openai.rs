// ============================================
// Sentiment classification (OpenAI Chat Completions)
// ============================================

use crate::config::OpenAiConfig;
use crate::metrics::CLASSIFIER_REQUESTS_TOTAL;
use async_trait::async_trait;
use engagement_metrics::Sentiment;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

const SYSTEM_PROMPT: &str = "Analyze the sentiment of the following text and return a JSON object \
with scores for positive, negative, and neutral sentiment, with values between 0 and 1 that sum to 1.";

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("text to classify is empty")]
    InvalidInput,

    #[error("{0}")]
    Unavailable(String),

    #[error("malformed classifier response: {0}")]
    MalformedResponse(String),
}

impl ClassifierError {
    fn outcome(&self) -> &'static str {
        match self {
            ClassifierError::InvalidInput => "invalid_input",
            ClassifierError::Unavailable(_) => "unavailable",
            ClassifierError::MalformedResponse(_) => "malformed",
        }
    }
}

#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Classify `text` into a normalised three-way sentiment.
    async fn classify(&self, text: &str) -> Result<Sentiment, ClassifierError>;

    /// Provider name used in logs
    fn name(&self) -> &str;
}

pub struct OpenAiSentimentClassifier {
    client: HttpClient,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiSentimentClassifier {
    pub fn new(config: &OpenAiConfig) -> Result<Self, reqwest::Error> {
        let client = HttpClient::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            endpoint: format!(
                "{}/v1/chat/completions",
                config.base_url.trim_end_matches('/')
            ),
        })
    }

    async fn request_scores(&self, text: &str) -> Result<Sentiment, ClassifierError> {
        let request = CompletionRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: text,
                },
            ],
            temperature: 0.0,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClassifierError::Unavailable(format!("OpenAI request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Unavailable(format!(
                "OpenAI returned {}: {}",
                status, body
            )));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::MalformedResponse(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ClassifierError::MalformedResponse("no completion choices".into()))?;

        parse_scores(&content)
    }
}

#[async_trait]
impl SentimentClassifier for OpenAiSentimentClassifier {
    async fn classify(&self, text: &str) -> Result<Sentiment, ClassifierError> {
        let result = if text.trim().is_empty() {
            Err(ClassifierError::InvalidInput)
        } else {
            self.request_scores(text).await
        };

        match &result {
            Ok(sentiment) => {
                CLASSIFIER_REQUESTS_TOTAL
                    .with_label_values(&["success"])
                    .inc();
                debug!(overall = %sentiment.overall, "Text classified");
            }
            Err(e) => {
                CLASSIFIER_REQUESTS_TOTAL
                    .with_label_values(&[e.outcome()])
                    .inc();
                if !matches!(e, ClassifierError::InvalidInput) {
                    warn!(provider = self.name(), error = %e, "Sentiment classification failed");
                }
            }
        }

        result
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct RawScores {
    positive: f64,
    negative: f64,
    neutral: f64,
}

/// Parse the model's JSON reply and normalise the scores to sum to 1.
fn parse_scores(content: &str) -> Result<Sentiment, ClassifierError> {
    let body = strip_code_fence(content);
    let raw: RawScores = serde_json::from_str(body)
        .map_err(|e| ClassifierError::MalformedResponse(format!("{}: {}", e, content)))?;

    for (name, value) in [
        ("positive", raw.positive),
        ("negative", raw.negative),
        ("neutral", raw.neutral),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(ClassifierError::MalformedResponse(format!(
                "{} score is not a non-negative number",
                name
            )));
        }
    }

    let sum = raw.positive + raw.negative + raw.neutral;
    if sum <= 0.0 {
        return Err(ClassifierError::MalformedResponse(
            "all sentiment scores are zero".into(),
        ));
    }

    Ok(Sentiment::from_scores(
        raw.positive / sum,
        raw.negative / sum,
        raw.neutral / sum,
    ))
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use engagement_metrics::SentimentLabel;

    #[test]
    fn scores_are_normalised() {
        let sentiment =
            parse_scores(r#"{"positive": 0.6, "negative": 0.2, "neutral": 0.4}"#).unwrap();
        let sum = sentiment.positive + sentiment.negative + sentiment.neutral;
        assert!((sum - 1.0).abs() < 1e-9);
        assert!((sentiment.positive - 0.5).abs() < 1e-9);
        assert_eq!(sentiment.overall, SentimentLabel::Positive);
    }

    #[test]
    fn fenced_reply_is_accepted() {
        let sentiment =
            parse_scores("```json\n{\"positive\": 0.1, \"negative\": 0.7, \"neutral\": 0.2}\n```")
                .unwrap();
        assert_eq!(sentiment.overall, SentimentLabel::Negative);
    }

    #[test]
    fn ties_resolve_towards_positive_then_neutral() {
        let sentiment =
            parse_scores(r#"{"positive": 0.2, "negative": 0.4, "neutral": 0.4}"#).unwrap();
        assert_eq!(sentiment.overall, SentimentLabel::Neutral);
    }

    #[test]
    fn malformed_replies_are_rejected() {
        for reply in [
            "I think this is positive",
            r#"{"positive": 0.5, "negative": 0.5}"#,
            r#"{"positive": -0.1, "negative": 0.6, "neutral": 0.5}"#,
            r#"{"positive": 0, "negative": 0, "neutral": 0}"#,
            r#"{"positive": "high", "negative": 0.1, "neutral": 0.1}"#,
        ] {
            assert!(
                matches!(parse_scores(reply), Err(ClassifierError::MalformedResponse(_))),
                "accepted {reply}"
            );
        }
    }
}
