use crate::error::Result;
use crate::middleware::Session;
use crate::services::AnalyticsService;
use actix_web::{web, HttpResponse};
use engagement_metrics::DEFAULT_WINDOW_DAYS;
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct AnalyticsQuery {
    #[validate(range(min = 1, max = 365))]
    pub window_days: Option<u32>,
    /// Display time zone as minutes east of UTC
    #[validate(range(min = -840, max = 840))]
    pub tz_offset_minutes: Option<i32>,
}

/// Engagement totals, daily series and sentiment histogram for the caller
pub async fn get_analytics(
    service: web::Data<AnalyticsService>,
    session: Session,
    query: web::Query<AnalyticsQuery>,
) -> Result<HttpResponse> {
    query.validate()?;
    let window_days = query.window_days.unwrap_or(DEFAULT_WINDOW_DAYS);

    let report = service
        .report(session.user_id, window_days, query.tz_offset_minutes)
        .await?;

    Ok(HttpResponse::Ok().json(report))
}
