/// Post handlers - the caller's synced LinkedIn posts
use crate::error::Result;
use crate::middleware::Session;
use crate::services::AnalyticsService;
use actix_web::{web, HttpResponse};
use engagement_metrics::Post;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_PAGE_SIZE: i64 = 20;

#[derive(Debug, Deserialize, Validate)]
pub struct ListPostsQuery {
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
    #[validate(range(min = 0))]
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PostsResponse {
    pub posts: Vec<Post>,
    pub limit: i64,
    pub offset: i64,
}

/// List the caller's posts, newest first
pub async fn list_posts(
    service: web::Data<AnalyticsService>,
    session: Session,
    query: web::Query<ListPostsQuery>,
) -> Result<HttpResponse> {
    query.validate()?;
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0);

    let posts = service.list_posts(session.user_id, limit, offset).await?;

    Ok(HttpResponse::Ok().json(PostsResponse {
        posts,
        limit,
        offset,
    }))
}
