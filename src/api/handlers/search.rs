use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    error::{AppError, Result},
    repository::{AnnouncementHit, ResponseHit},
    service::CombinedHit,
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    10
}

fn validate(params: &SearchQuery) -> Result<(i64, i64)> {
    if params.q.trim().is_empty() {
        return Err(AppError::BadRequest("Missing search query".to_string()));
    }
    Ok((params.limit.clamp(1, 100), params.skip.max(0)))
}

pub async fn announcements(
    State(state): State<AppState>,
    Extension(_current): Extension<CurrentUser>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<AnnouncementHit>>> {
    let (limit, skip) = validate(&params)?;

    let hits = state
        .service_context
        .search_service
        .search_announcements(&params.q, limit, skip)
        .await?;

    Ok(Json(hits))
}

pub async fn responses(
    State(state): State<AppState>,
    Extension(_current): Extension<CurrentUser>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<ResponseHit>>> {
    let (limit, skip) = validate(&params)?;

    let hits = state
        .service_context
        .search_service
        .search_responses(&params.q, limit, skip)
        .await?;

    Ok(Json(hits))
}

#[derive(Debug, Serialize)]
pub struct SearchAllResponse {
    pub query: String,
    pub total_count: usize,
    pub results: Vec<CombinedHit>,
}

#[derive(Debug, Deserialize)]
pub struct SearchAllQuery {
    pub q: String,
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_all_limit")]
    pub limit: i64,
}

fn default_all_limit() -> i64 {
    5
}

pub async fn all(
    State(state): State<AppState>,
    Extension(_current): Extension<CurrentUser>,
    Query(params): Query<SearchAllQuery>,
) -> Result<Json<SearchAllResponse>> {
    if params.q.trim().is_empty() {
        return Err(AppError::BadRequest("Missing search query".to_string()));
    }
    let limit = params.limit.clamp(1, 50);
    let skip = params.skip.max(0);

    let results = state
        .service_context
        .search_service
        .search_all(&params.q, limit, skip)
        .await?;

    Ok(Json(SearchAllResponse {
        query: params.q,
        total_count: results.len(),
        results,
    }))
}
