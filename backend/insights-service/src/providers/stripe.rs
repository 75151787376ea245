use crate::config::StripeConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("price {0} is not offered")]
    UnknownPrice(String),

    #[error("premium price is not configured")]
    NotConfigured,

    #[error("payment provider error: {0}")]
    Provider(String),
}

/// Hosted checkout page created for a subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSession {
    #[serde(alias = "id")]
    pub session_id: String,
    pub url: Option<String>,
}

#[derive(Clone)]
pub struct StripeClient {
    http: Client,
    secret_key: String,
    base_url: String,
    success_url: String,
    cancel_url: String,
}

impl StripeClient {
    pub fn new(config: &StripeConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            http,
            secret_key: config.secret_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            success_url: config.success_url.clone(),
            cancel_url: config.cancel_url.clone(),
        })
    }

    /// Create a subscription-mode Checkout Session for one unit of `price_id`.
    pub async fn create_checkout_session(
        &self,
        user_id: Uuid,
        price_id: &str,
    ) -> Result<CheckoutSession, BillingError> {
        let user = user_id.to_string();
        let params = [
            ("mode", "subscription"),
            ("line_items[0][price]", price_id),
            ("line_items[0][quantity]", "1"),
            ("success_url", self.success_url.as_str()),
            ("cancel_url", self.cancel_url.as_str()),
            ("client_reference_id", user.as_str()),
        ];

        let response = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| BillingError::Provider(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BillingError::Provider(format!("Stripe returned {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| BillingError::Provider(format!("invalid checkout session: {}", e)))
    }
}
