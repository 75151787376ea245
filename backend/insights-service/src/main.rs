use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use insights_service::db::{self, ConnectionStore, PgConnectionStore, PgPostStore, PostStore};
use insights_service::handlers::{self, HealthState};
use insights_service::middleware::{JwtAuthMiddleware, JwtValidator, MetricsMiddleware};
use insights_service::providers::{
    LinkedInClient, OpenAiSentimentClassifier, SentimentClassifier, StripeClient,
};
use insights_service::services::{
    AnalyticsService, BillingService, LinkedInOAuthService, LinkedInSyncService,
};
use insights_service::Config;
use redis::aio::ConnectionManager;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run_healthcheck() -> anyhow::Result<()> {
    let port = std::env::var("INSIGHTS_SERVICE_PORT").unwrap_or_else(|_| "8090".to_string());
    let url = format!("http://127.0.0.1:{}/api/v1/health/live", port);

    let resp = reqwest::get(&url)
        .await
        .with_context(|| format!("healthcheck request to {} failed", url))?;
    anyhow::ensure!(
        resp.status().is_success(),
        "healthcheck HTTP status: {}",
        resp.status()
    );
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable, waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Insights Service
///
/// Backend for the LinkedIn insights dashboard.
///
/// # Routes
///
/// - `/api/v1/health`, `/api/v1/health/ready`, `/api/v1/health/live`
/// - `/metrics` - Prometheus exposition
/// - `/api/v1/linkedin/callback` - OAuth redirect target (public)
/// - `/api/v1/{posts,analytics,sentiment,billing/checkout,linkedin/*}` - JWT protected
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Container probes: `insights-service healthcheck`
    if std::env::args().nth(1).as_deref() == Some("healthcheck") {
        return run_healthcheck().await;
    }

    let _ = dotenvy::dotenv();
    init_tracing();

    let config = Config::from_env()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to load configuration")?;
    tracing::info!(env = %config.app.env, port = config.app.port, "Starting insights-service");

    let db_pool = db::create_pool(&config.database)
        .await
        .context("Failed to connect to PostgreSQL")?;
    db::run_migrations(&db_pool)
        .await
        .context("Failed to run database migrations")?;

    let redis_client =
        redis::Client::open(config.cache.url.as_str()).context("Invalid Redis URL")?;
    let redis = ConnectionManager::new(redis_client)
        .await
        .context("Failed to connect to Redis")?;

    let jwt_validator = match &config.auth.jwt_public_key_pem {
        Some(pem) => Some(Arc::new(
            JwtValidator::from_rsa_pem(pem).context("Invalid JWT_PUBLIC_KEY_PEM")?,
        )),
        None => {
            tracing::warn!("JWT_PUBLIC_KEY_PEM not set, authenticated routes will reject all requests");
            None
        }
    };

    let post_store: Arc<dyn PostStore> = Arc::new(PgPostStore::new(db_pool.clone()));
    let connections: Arc<dyn ConnectionStore> =
        Arc::new(PgConnectionStore::new(db_pool.clone()));
    let classifier: Arc<dyn SentimentClassifier> = Arc::new(
        OpenAiSentimentClassifier::new(&config.openai)
            .context("Failed to build OpenAI client")?,
    );
    let linkedin =
        LinkedInClient::new(&config.linkedin).context("Failed to build LinkedIn client")?;
    let stripe = StripeClient::new(&config.stripe).context("Failed to build Stripe client")?;

    let analytics = web::Data::new(AnalyticsService::new(
        post_store.clone(),
        config.app.display_utc_offset_minutes,
    ));
    let oauth = web::Data::new(LinkedInOAuthService::new(
        linkedin.clone(),
        redis.clone(),
        connections.clone(),
    ));
    let sync = web::Data::new(LinkedInSyncService::new(
        linkedin,
        post_store,
        connections,
        classifier.clone(),
        config.linkedin.max_posts,
        config.linkedin.sync_concurrency,
    ));
    let billing = web::Data::new(BillingService::new(stripe, &config.stripe));
    let classifier = web::Data::new(classifier);
    let health_state = web::Data::new(HealthState::new(db_pool.clone(), redis));
    let config_data = web::Data::new(config.clone());

    let bind_address = (config.app.host.clone(), config.app.port);
    let allowed_origins = config.cors.allowed_origins.clone();

    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(analytics.clone())
            .app_data(oauth.clone())
            .app_data(sync.clone())
            .app_data(billing.clone())
            .app_data(classifier.clone())
            .app_data(health_state.clone())
            .app_data(config_data.clone())
            .wrap(MetricsMiddleware)
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/metrics", web::get().to(insights_service::metrics::serve_metrics))
            .route("/api/v1/health", web::get().to(handlers::health_summary))
            .route("/api/v1/health/ready", web::get().to(handlers::readiness_summary))
            .route("/api/v1/health/live", web::get().to(handlers::liveness_check))
            .route(
                "/api/v1/linkedin/callback",
                web::get().to(handlers::linkedin_callback),
            )
            .service(
                web::scope("/api/v1")
                    .wrap(JwtAuthMiddleware::new(jwt_validator.clone()))
                    .configure(handlers::configure_api),
            )
    })
    .bind(bind_address)?
    .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    tokio::select! {
        result = server_task => {
            result.context("HTTP server task panicked")??;
        }
        _ = &mut shutdown => {
            tracing::info!("Shutdown signal received");
            server_handle.stop(true).await;
        }
    }

    tracing::info!("insights-service shut down");
    Ok(())
}
