use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{SqlitePool, FromRow};

use crate::{
    domain::{Announcement, AnnouncementKind, NewAnnouncement},
    error::{AppError, Result},
    repository::AnnouncementRepository,
};

#[derive(FromRow)]
struct AnnouncementRow {
    id: i64,
    title: String,
    content: String,
    kind: String,
    file_key: Option<String>,
    file_name: Option<String>,
    created_at: NaiveDateTime,
    updated_at: Option<NaiveDateTime>,
}

pub struct SqliteAnnouncementRepository {
    pool: SqlitePool,
}

impl SqliteAnnouncementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_announcement(row: AnnouncementRow) -> Result<Announcement> {
        Ok(Announcement {
            id: row.id,
            title: row.title,
            content: row.content,
            kind: parse_kind(&row.kind)?,
            file_key: row.file_key,
            file_name: row.file_name,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: row.updated_at.map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
        })
    }
}

pub(crate) fn parse_kind(s: &str) -> Result<AnnouncementKind> {
    match s {
        "announcement" => Ok(AnnouncementKind::Announcement),
        "inquiry" => Ok(AnnouncementKind::Inquiry),
        _ => Err(AppError::Database(format!("Invalid announcement kind: {}", s))),
    }
}

pub(crate) fn kind_to_str(kind: &AnnouncementKind) -> &'static str {
    match kind {
        AnnouncementKind::Announcement => "announcement",
        AnnouncementKind::Inquiry => "inquiry",
    }
}

#[async_trait]
impl AnnouncementRepository for SqliteAnnouncementRepository {
    async fn create(&self, announcement: NewAnnouncement) -> Result<Announcement> {
        let kind_str = kind_to_str(&announcement.kind);
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            INSERT INTO announcements (title, content, kind, file_key, file_name, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(&announcement.title)
        .bind(&announcement.content)
        .bind(kind_str)
        .bind(&announcement.file_key)
        .bind(&announcement.file_name)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(result.last_insert_rowid()).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created announcement".to_string())
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Announcement>> {
        let row = sqlx::query_as::<_, AnnouncementRow>(
            r#"
            SELECT id, title, content, kind, file_key, file_name, created_at, updated_at
            FROM announcements
            WHERE id = ?
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_announcement(r)?)),
            None => Ok(None)
        }
    }

    async fn list(
        &self,
        kind: Option<AnnouncementKind>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Announcement>> {
        let rows = if let Some(kind) = kind {
            sqlx::query_as::<_, AnnouncementRow>(
                r#"
                SELECT id, title, content, kind, file_key, file_name, created_at, updated_at
                FROM announcements
                WHERE kind = ?
                ORDER BY created_at DESC
                LIMIT ? OFFSET ?
                "#
            )
            .bind(kind_to_str(&kind))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, AnnouncementRow>(
                r#"
                SELECT id, title, content, kind, file_key, file_name, created_at, updated_at
                FROM announcements
                ORDER BY created_at DESC
                LIMIT ? OFFSET ?
                "#
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
        }
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_announcement)
            .collect()
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await
            .map_err(|e| AppError::Database(e.to_string()))?;

        sqlx::query("DELETE FROM responses WHERE announcement_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        sqlx::query("DELETE FROM announcements WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tx.commit().await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
