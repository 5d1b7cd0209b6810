use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    api::state::AppState,
    error::{AppError, Result},
};

const DOWNLOAD_URL_EXPIRY_SECS: u32 = 86_400;
const PREVIEW_URL_EXPIRY_SECS: u32 = 3_600;

#[derive(Debug, Deserialize)]
pub struct KeyQuery {
    #[serde(default)]
    pub key: String,
}

pub async fn download(
    State(state): State<AppState>,
    Query(params): Query<KeyQuery>,
) -> Result<Json<serde_json::Value>> {
    if params.key.is_empty() {
        return Err(AppError::BadRequest("Missing file key".to_string()));
    }

    let url = state
        .service_context
        .storage
        .presign_download(&params.key, DOWNLOAD_URL_EXPIRY_SECS)
        .await?;

    Ok(Json(json!({
        "success": true,
        "url": url,
    })))
}

pub async fn preview(
    State(state): State<AppState>,
    Query(params): Query<KeyQuery>,
) -> Result<Json<serde_json::Value>> {
    if params.key.is_empty() {
        return Err(AppError::BadRequest("Missing file key".to_string()));
    }

    let url = state
        .service_context
        .storage
        .presign_download(&params.key, PREVIEW_URL_EXPIRY_SECS)
        .await?;

    Ok(Json(json!({
        "success": true,
        "url": url,
        "preview_type": preview_type(&params.key),
    })))
}

#[derive(Debug, Deserialize)]
pub struct LocalFileQuery {
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

fn default_file_name() -> String {
    "download".to_string()
}

pub async fn download_local(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(params): Query<LocalFileQuery>,
) -> Result<impl IntoResponse> {
    if path.is_empty() {
        return Err(AppError::BadRequest("Missing file key".to_string()));
    }

    let bytes = state
        .service_context
        .storage
        .read(&path)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

    let headers = [
        (header::CONTENT_TYPE, "application/octet-stream".to_string()),
        (
            header::CONTENT_DISPOSITION,
            content_disposition(&params.file_name),
        ),
    ];

    Ok((headers, bytes))
}

/// ASCII names go out quoted; anything else is RFC 5987 encoded so
/// non-ASCII filenames survive the download.
fn content_disposition(file_name: &str) -> String {
    if file_name.is_ascii() {
        format!("attachment; filename=\"{}\"", file_name.replace('"', ""))
    } else {
        format!("attachment; filename*=UTF-8''{}", urlencoding::encode(file_name))
    }
}

fn preview_type(key: &str) -> &'static str {
    let lower = key.to_lowercase();
    let extension = lower.rsplit('.').next().unwrap_or("");

    match extension {
        "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp" | "svg" => "image",
        "pdf" => "pdf",
        "txt" | "md" | "json" | "xml" | "html" | "css" | "js" | "ts" => "text",
        "mp4" | "webm" | "avi" | "mov" => "video",
        "mp3" | "wav" | "ogg" | "flac" | "aac" => "audio",
        "doc" | "docx" | "xls" | "xlsx" | "ppt" | "pptx" => "office",
        "zip" | "rar" | "7z" | "tar" | "gz" => "archive",
        _ => "unknown",
    }
}
