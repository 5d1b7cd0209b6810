use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{SqlitePool, FromRow};

use crate::{
    domain::{NewResponse, Response, ResponseWithAnnouncement},
    error::{AppError, Result},
    repository::ResponseRepository,
};

#[derive(FromRow)]
struct ResponseRow {
    id: i64,
    announcement_id: i64,
    colleague_name: String,
    content: String,
    file_key: Option<String>,
    file_name: Option<String>,
    created_at: NaiveDateTime,
}

#[derive(FromRow)]
struct ResponseWithAnnouncementRow {
    id: i64,
    announcement_id: i64,
    announcement_title: String,
    colleague_name: String,
    content: String,
    file_key: Option<String>,
    file_name: Option<String>,
    created_at: NaiveDateTime,
}

pub struct SqliteResponseRepository {
    pool: SqlitePool,
}

impl SqliteResponseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_response(row: ResponseRow) -> Response {
        Response {
            id: row.id,
            announcement_id: row.announcement_id,
            colleague_name: row.colleague_name,
            content: row.content,
            file_key: row.file_key,
            file_name: row.file_name,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        }
    }
}

#[async_trait]
impl ResponseRepository for SqliteResponseRepository {
    async fn create(&self, response: NewResponse) -> Result<Response> {
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            INSERT INTO responses (announcement_id, colleague_name, content, file_key, file_name, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(response.announcement_id)
        .bind(&response.colleague_name)
        .bind(&response.content)
        .bind(&response.file_key)
        .bind(&response.file_name)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();

        let row = sqlx::query_as::<_, ResponseRow>(
            r#"
            SELECT id, announcement_id, colleague_name, content, file_key, file_name, created_at
            FROM responses
            WHERE id = ?
            "#
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(Self::row_to_response(row))
    }

    async fn list_by_announcement(
        &self,
        announcement_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Response>> {
        let rows = sqlx::query_as::<_, ResponseRow>(
            r#"
            SELECT id, announcement_id, colleague_name, content, file_key, file_name, created_at
            FROM responses
            WHERE announcement_id = ?
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?
            "#
        )
        .bind(announcement_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Self::row_to_response).collect())
    }

    async fn list_by_colleague(
        &self,
        colleague_name: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ResponseWithAnnouncement>> {
        let rows = sqlx::query_as::<_, ResponseWithAnnouncementRow>(
            r#"
            SELECT r.id, r.announcement_id, a.title AS announcement_title,
                   r.colleague_name, r.content, r.file_key, r.file_name, r.created_at
            FROM responses r
            JOIN announcements a ON r.announcement_id = a.id
            WHERE r.colleague_name = ?
            ORDER BY r.created_at DESC
            LIMIT ? OFFSET ?
            "#
        )
        .bind(colleague_name)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| ResponseWithAnnouncement {
                id: row.id,
                announcement_id: row.announcement_id,
                announcement_title: row.announcement_title,
                colleague_name: row.colleague_name,
                content: row.content,
                file_key: row.file_key,
                file_name: row.file_name,
                created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            })
            .collect())
    }

    async fn list_filtered(
        &self,
        announcement_id: Option<i64>,
        colleague_name: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Response>> {
        let rows = sqlx::query_as::<_, ResponseRow>(
            r#"
            SELECT id, announcement_id, colleague_name, content, file_key, file_name, created_at
            FROM responses
            WHERE (? IS NULL OR announcement_id = ?)
              AND (? IS NULL OR colleague_name = ?)
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?
            "#
        )
        .bind(announcement_id)
        .bind(announcement_id)
        .bind(colleague_name)
        .bind(colleague_name)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Self::row_to_response).collect())
    }

    async fn count_by_announcement(&self, announcement_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM responses WHERE announcement_id = ?"
        )
        .bind(announcement_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count)
    }
}
