use crate::error::Result;
use crate::middleware::Session;
use crate::providers::SentimentClassifier;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct SentimentRequest {
    pub text: String,
}

/// Classify arbitrary text
pub async fn classify_text(
    classifier: web::Data<Arc<dyn SentimentClassifier>>,
    session: Session,
    req: web::Json<SentimentRequest>,
) -> Result<HttpResponse> {
    let sentiment = classifier.classify(&req.text).await?;

    tracing::debug!(
        user_id = %session.user_id,
        overall = %sentiment.overall,
        "Ad-hoc sentiment classified"
    );
    Ok(HttpResponse::Ok().json(sentiment))
}
