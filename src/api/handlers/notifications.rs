use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::Notification,
    error::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub unread_only: bool,
}

fn default_limit() -> i64 {
    20
}

pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<Notification>>> {
    let notifications = state
        .service_context
        .notification_service
        .get_notifications(
            current.user.id,
            params.unread_only,
            params.limit.clamp(1, 100),
            params.skip.max(0),
        )
        .await?;

    Ok(Json(notifications))
}

pub async fn unread_count(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<serde_json::Value>> {
    let count = state
        .service_context
        .notification_service
        .get_unread_count(current.user.id)
        .await?;

    Ok(Json(json!({ "unread_count": count })))
}

/// Looks the notification up first so a missing id is a 404 and someone
/// else's notification is a 403.
async fn load_owned(
    state: &AppState,
    current: &CurrentUser,
    id: i64,
) -> Result<Notification> {
    let notification = state
        .service_context
        .notification_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

    if notification.user_id != current.user.id {
        return Err(AppError::Forbidden("No access to this notification".to_string()));
    }

    Ok(notification)
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    load_owned(&state, &current, id).await?;

    let marked = state
        .service_context
        .notification_service
        .mark_as_read(id)
        .await?;

    if !marked {
        return Err(AppError::NotFound("Notification not found".to_string()));
    }

    Ok(Json(json!({ "message": "Marked as read" })))
}

pub async fn read_all(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<serde_json::Value>> {
    let count = state
        .service_context
        .notification_service
        .mark_all_as_read(current.user.id)
        .await?;

    Ok(Json(json!({
        "message": format!("Marked {} notifications as read", count),
        "count": count,
    })))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    load_owned(&state, &current, id).await?;

    let deleted = state
        .service_context
        .notification_service
        .delete_notification(id)
        .await?;

    if !deleted {
        return Err(AppError::NotFound("Notification not found".to_string()));
    }

    Ok(Json(json!({ "message": "Notification deleted" })))
}
