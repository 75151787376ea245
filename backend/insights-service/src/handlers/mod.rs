/// HTTP handlers
///
/// `configure_api` registers the routes that sit behind `JwtAuthMiddleware`
/// under `/api/v1`. Health checks, `/metrics` and the LinkedIn OAuth
/// callback are public and registered by the binary.
pub mod analytics;
pub mod billing;
pub mod health;
pub mod linkedin;
pub mod posts;
pub mod sentiment;

pub use analytics::get_analytics;
pub use billing::create_checkout;
pub use health::{health_summary, liveness_check, readiness_summary, HealthState};
pub use linkedin::{callback as linkedin_callback, connect as linkedin_connect, sync_posts};
pub use posts::list_posts;
pub use sentiment::classify_text;

use actix_web::web;

pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.route("/posts", web::get().to(list_posts))
        .route("/analytics", web::get().to(get_analytics))
        .route("/sentiment", web::post().to(classify_text))
        .route("/billing/checkout", web::post().to(create_checkout))
        .service(
            web::scope("/linkedin")
                .route("/connect", web::get().to(linkedin_connect))
                .route("/sync", web::post().to(sync_posts)),
        );
}
