/// LinkedIn account linking and post sync
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::middleware::Session;
use crate::services::{callback_redirect, LinkedInOAuthService, LinkedInSyncService};
use actix_web::{http::header, web, HttpResponse};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    pub authorization_url: String,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Start the LinkedIn OAuth flow for the caller
pub async fn connect(
    oauth: web::Data<LinkedInOAuthService>,
    session: Session,
) -> Result<HttpResponse> {
    let authorization_url = oauth.start_flow(session.user_id).await?;
    Ok(HttpResponse::Ok().json(ConnectResponse { authorization_url }))
}

/// OAuth redirect target; sends the browser back to the dashboard
pub async fn callback(
    oauth: web::Data<LinkedInOAuthService>,
    config: web::Data<Config>,
    query: web::Query<CallbackQuery>,
) -> HttpResponse {
    let Some(code) = query.code.as_deref().filter(|c| !c.is_empty()) else {
        if let Some(error) = &query.error {
            tracing::warn!(error = %error, "LinkedIn authorization denied");
        }
        return HttpResponse::BadRequest()
            .json(serde_json::json!({ "error": "Authorization code is required" }));
    };

    let outcome = match query.state.as_deref() {
        Some(state) => oauth.complete_flow(code, state).await,
        None => Err(AppError::BadRequest("Missing OAuth state".into())),
    };
    if let Err(e) = &outcome {
        tracing::error!(error = %e, "LinkedIn connection failed");
    }

    HttpResponse::Found()
        .insert_header((
            header::LOCATION,
            callback_redirect(&config.app.frontend_url, &outcome),
        ))
        .finish()
}

/// Pull the caller's LinkedIn posts into the store
pub async fn sync_posts(
    sync: web::Data<LinkedInSyncService>,
    session: Session,
) -> Result<HttpResponse> {
    let summary = sync.sync(session.user_id).await?;
    Ok(HttpResponse::Ok().json(summary))
}
