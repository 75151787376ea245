//! Prometheus metrics for insights-service.
//!
//! Collectors are registered on the default registry and rendered by the
//! `/metrics` endpoint.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter_vec, Encoder, Histogram,
    HistogramVec, IntCounterVec, TextEncoder,
};

lazy_static! {
    /// Time spent turning a post snapshot into the analytics view.
    pub static ref ANALYTICS_COMPUTE_DURATION_SECONDS: Histogram = register_histogram!(
        "insights_analytics_compute_duration_seconds",
        "Duration of analytics snapshot computation",
        vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]
    )
    .expect("failed to register insights_analytics_compute_duration_seconds");

    /// Sentiment classifier calls by outcome (success, invalid_input, unavailable, malformed).
    pub static ref CLASSIFIER_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "insights_classifier_requests_total",
        "Sentiment classifier calls segmented by outcome",
        &["outcome"]
    )
    .expect("failed to register insights_classifier_requests_total");

    /// Posts handled by LinkedIn sync (classified, reused, degraded).
    pub static ref LINKEDIN_SYNC_POSTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "insights_linkedin_sync_posts_total",
        "Posts processed by LinkedIn sync segmented by sentiment source",
        &["result"]
    )
    .expect("failed to register insights_linkedin_sync_posts_total");

    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "insights_http_requests_total",
        "HTTP requests segmented by method, route and status",
        &["method", "route", "status"]
    )
    .expect("failed to register insights_http_requests_total");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "insights_http_request_duration_seconds",
        "HTTP request duration segmented by method and route",
        &["method", "route"]
    )
    .expect("failed to register insights_http_request_duration_seconds");
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_rt::test]
    async fn exposition_includes_registered_collectors() {
        CLASSIFIER_REQUESTS_TOTAL
            .with_label_values(&["success"])
            .inc();

        let response = serve_metrics().await;
        assert!(response.status().is_success());

        let body = to_bytes(response.into_body()).await.unwrap();
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("insights_classifier_requests_total"));
    }
}
