use crate::config::StripeConfig;
use crate::error::Result;
use crate::providers::{BillingError, CheckoutSession, StripeClient};
use uuid::Uuid;

/// Premium plan checkout.
#[derive(Clone)]
pub struct BillingService {
    stripe: StripeClient,
    premium_price_id: String,
    allowed_price_ids: Vec<String>,
}

impl BillingService {
    pub fn new(stripe: StripeClient, config: &StripeConfig) -> Self {
        Self {
            stripe,
            premium_price_id: config.premium_price_id.clone(),
            allowed_price_ids: config.allowed_price_ids.clone(),
        }
    }

    /// Price to charge: the premium price by default, otherwise an allowed one.
    pub fn resolve_price(
        &self,
        requested: Option<&str>,
    ) -> std::result::Result<String, BillingError> {
        match requested.map(str::trim).filter(|p| !p.is_empty()) {
            None if self.premium_price_id.is_empty() => Err(BillingError::NotConfigured),
            None => Ok(self.premium_price_id.clone()),
            Some(price) if price == self.premium_price_id => Ok(price.to_string()),
            Some(price) if self.allowed_price_ids.iter().any(|p| p == price) => {
                Ok(price.to_string())
            }
            Some(price) => Err(BillingError::UnknownPrice(price.to_string())),
        }
    }

    pub async fn checkout(&self, user_id: Uuid, price_id: Option<&str>) -> Result<CheckoutSession> {
        let price = self.resolve_price(price_id)?;
        let session = self.stripe.create_checkout_session(user_id, &price).await?;

        tracing::info!(
            user_id = %user_id,
            price_id = %price,
            session_id = %session.session_id,
            "Checkout session created"
        );
        Ok(session)
    }
}
