use crate::error::Result;
use crate::middleware::Session;
use crate::services::BillingService;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct CheckoutRequest {
    pub price_id: Option<String>,
}

/// Create a premium subscription checkout for the caller
pub async fn create_checkout(
    billing: web::Data<BillingService>,
    session: Session,
    req: Option<web::Json<CheckoutRequest>>,
) -> Result<HttpResponse> {
    let req = req.map(web::Json::into_inner).unwrap_or_default();
    let checkout = billing
        .checkout(session.user_id, req.price_id.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(checkout))
}
