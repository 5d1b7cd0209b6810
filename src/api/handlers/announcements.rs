use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    api::{handlers::FileUpload, middleware::auth::CurrentUser, state::AppState},
    domain::{Announcement, AnnouncementKind, NewAnnouncement, NotificationKind, Response},
    error::{AppError, Result},
};

fn parse_kind(s: &str) -> Result<AnnouncementKind> {
    match s {
        "announcement" => Ok(AnnouncementKind::Announcement),
        "inquiry" => Ok(AnnouncementKind::Inquiry),
        _ => Err(AppError::BadRequest(format!("Invalid announcement type: {}", s))),
    }
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Announcement>)> {
    let mut title = String::new();
    let mut content = String::new();
    let mut kind = AnnouncementKind::Announcement;
    let mut upload: Option<FileUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart form: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "title" => title = field.text().await.unwrap_or_default(),
            "content" => content = field.text().await.unwrap_or_default(),
            "type" => kind = parse_kind(&field.text().await.unwrap_or_default())?,
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

    if title.is_empty() {
        return Err(AppError::BadRequest("title is required".to_string()));
    }
    if content.is_empty() {
        return Err(AppError::BadRequest("content is required".to_string()));
    }

    // Upload failures never block the announcement itself.
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
        .announcement_repo
        .create(NewAnnouncement {
            title,
            content,
            kind,
            file_key,
            file_name,
        })
        .await?;

    // The announcement is committed before the fan-out; a broadcast
    // failure surfaces as a 500 but leaves the announcement in place.
    let notification_kind = match kind {
        AnnouncementKind::Announcement => NotificationKind::NewAnnouncement,
        AnnouncementKind::Inquiry => NotificationKind::NewResponse,
    };
    let label = kind.label();

    state
        .service_context
        .notification_service
        .broadcast(
            notification_kind,
            &format!("New {}: {}", label, created.title),
            &format!("{} posted a new {}", current.user.full_name, label),
            Some(created.id),
            Some(current.user.id),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(rename = "type")]
    pub kind: Option<AnnouncementKind>,
}

fn default_limit() -> i64 {
    10
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<Announcement>>> {
    let skip = params.skip.max(0);
    let limit = params.limit.clamp(1, 100);

    let announcements = state
        .service_context
        .announcement_repo
        .list(params.kind, limit, skip)
        .await?;

    Ok(Json(announcements))
}

#[derive(Debug, Serialize)]
pub struct AnnouncementWithResponses {
    #[serde(flatten)]
    pub announcement: Announcement,
    pub responses: Vec<Response>,
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AnnouncementWithResponses>> {
    let announcement = state
        .service_context
        .announcement_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Announcement not found".to_string()))?;

    // LIMIT -1 disables the cap; the detail view carries every response.
    let responses = state
        .service_context
        .response_repo
        .list_by_announcement(id, -1, 0)
        .await?;

    Ok(Json(AnnouncementWithResponses {
        announcement,
        responses,
    }))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(_admin): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    state
        .service_context
        .announcement_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Announcement not found".to_string()))?;

    state.service_context.announcement_repo.delete(id).await?;

    Ok(Json(json!({ "message": "Announcement deleted" })))
}
