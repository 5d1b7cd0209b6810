use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    api::{handlers::auth::UserInfo, middleware::auth::CurrentUser, state::AppState},
    domain::{UpdateUserRequest, User, UserRole},
    error::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    pub total: i64,
    pub skip: i64,
    pub limit: i64,
    pub users: Vec<UserInfo>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(_admin): Extension<CurrentUser>,
    Query(params): Query<ListUsersQuery>,
) -> Result<Json<ListUsersResponse>> {
    let skip = params.skip.max(0);
    let limit = params.limit.clamp(1, 100);

    let total = state.service_context.user_repo.count().await?;
    let users = state.service_context.user_repo.list(limit, skip).await?;

    Ok(Json(ListUsersResponse {
        total,
        skip,
        limit,
        users: users.into_iter().map(Into::into).collect(),
    }))
}

async fn load_target(state: &AppState, id: i64) -> Result<User> {
    state
        .service_context
        .user_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub role: UserRole,
}

pub async fn update_role(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Query(params): Query<RoleQuery>,
) -> Result<Json<serde_json::Value>> {
    let target = load_target(&state, id).await?;

    if target.id == admin.user.id {
        return Err(AppError::BadRequest("Cannot change your own role".to_string()));
    }

    state
        .service_context
        .user_repo
        .update(
            id,
            UpdateUserRequest {
                role: Some(params.role),
                ..Default::default()
            },
        )
        .await?;

    Ok(Json(json!({ "message": "Role updated" })))
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub is_active: bool,
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Query(params): Query<StatusQuery>,
) -> Result<Json<serde_json::Value>> {
    let target = load_target(&state, id).await?;

    if target.id == admin.user.id {
        return Err(AppError::BadRequest("Cannot change your own status".to_string()));
    }

    state
        .service_context
        .user_repo
        .set_active(id, params.is_active)
        .await?;

    Ok(Json(json!({ "message": "Status updated" })))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<serde_json::Value>> {
    let target = load_target(&state, id).await?;

    if target.id == admin.user.id {
        if let Some(role) = request.role {
            if role != target.role {
                return Err(AppError::BadRequest("Cannot change your own role".to_string()));
            }
        }
    }

    let user_repo = &state.service_context.user_repo;

    if let Some(username) = &request.username {
        if username != &target.username {
            if let Some(existing) = user_repo.find_by_username(username).await? {
                if existing.id != id {
                    return Err(AppError::BadRequest("Username already exists".to_string()));
                }
            }
        }
    }

    if let Some(email) = &request.email {
        if email != &target.email {
            if let Some(existing) = user_repo.find_by_email(email).await? {
                if existing.id != id {
                    return Err(AppError::BadRequest(
                        "Email already used by another user".to_string(),
                    ));
                }
            }
        }
    }

    user_repo.update(id, request).await?;

    Ok(Json(json!({ "message": "User updated" })))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let target = load_target(&state, id).await?;

    if target.id == admin.user.id {
        return Err(AppError::BadRequest("Cannot delete your own account".to_string()));
    }

    state.service_context.user_repo.delete(id).await?;

    Ok(Json(json!({ "message": "User deleted" })))
}
