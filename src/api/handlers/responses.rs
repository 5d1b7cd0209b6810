use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    api::{handlers::FileUpload, middleware::auth::CurrentUser, state::AppState},
    domain::{NewResponse, Response, ResponseWithAnnouncement},
    error::{AppError, Result},
};

// Responses are deliberately open: no authentication, authored by a
// free-text colleague name.
pub async fn create(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Response>)> {
    let mut announcement_id: Option<i64> = None;
    let mut colleague_name = String::new();
    let mut content = String::new();
    let mut upload: Option<FileUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart form: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "announcement_id" => {
                let text = field.text().await.unwrap_or_default();
                announcement_id = Some(text.parse().map_err(|_| {
                    AppError::BadRequest(format!("Invalid announcement_id: {}", text))
                })?);
            }
            "colleague_name" => colleague_name = field.text().await.unwrap_or_default(),
            "content" => content = field.text().await.unwrap_or_default(),
            "file" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                if !file_name.is_empty() {
                    if let Ok(data) = field.bytes().await {
                        if !data.is_empty() {
                            upload = Some(FileUpload {
                                file_name,
                                content_type,
                                data: data.to_vec(),
                            });
                        }
                    }
                }
            }
            _ => {
                let _ = field.bytes().await;
            }
        }
    }

    let announcement_id = announcement_id
        .ok_or_else(|| AppError::BadRequest("announcement_id is required".to_string()))?;
    if colleague_name.is_empty() {
        return Err(AppError::BadRequest("colleague_name is required".to_string()));
    }
    if content.is_empty() {
        return Err(AppError::BadRequest("content is required".to_string()));
    }

    // The parent must exist; there is no database-level constraint.
    state
        .service_context
        .announcement_repo
        .find_by_id(announcement_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Announcement not found".to_string()))?;

    // Upload failures never block the response itself.
    let (file_key, file_name) = match upload {
        Some(upload) => match state
            .service_context
            .storage
            .put(&upload.file_name, &upload.data, &upload.content_type)
            .await
        {
            Ok(key) => (Some(key), Some(upload.file_name)),
            Err(e) => {
                tracing::warn!("File upload failed, continuing without attachment: {}", e);
                (None, None)
            }
        },
        None => (None, None),
    };

    let created = state
        .service_context
        .response_repo
        .create(NewResponse {
            announcement_id,
            colleague_name,
            content,
            file_key,
            file_name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

pub async fn list_by_announcement(
    State(state): State<AppState>,
    Path(announcement_id): Path<i64>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<Response>>> {
    let responses = state
        .service_context
        .response_repo
        .list_by_announcement(announcement_id, params.limit.clamp(1, 100), params.skip.max(0))
        .await?;

    Ok(Json(responses))
}

pub async fn list_by_colleague(
    State(state): State<AppState>,
    Path(colleague_name): Path<String>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<ResponseWithAnnouncement>>> {
    let responses = state
        .service_context
        .response_repo
        .list_by_colleague(&colleague_name, params.limit.clamp(1, 100), params.skip.max(0))
        .await?;

    Ok(Json(responses))
}

#[derive(Debug, Deserialize)]
pub struct AdminListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub announcement_id: Option<i64>,
    pub colleague_name: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(_admin): Extension<CurrentUser>,
    Query(params): Query<AdminListQuery>,
) -> Result<Json<Vec<Response>>> {
    let responses = state
        .service_context
        .response_repo
        .list_filtered(
            params.announcement_id,
            params.colleague_name.as_deref(),
            params.limit.clamp(1, 100),
            params.skip.max(0),
        )
        .await?;

    Ok(Json(responses))
}
