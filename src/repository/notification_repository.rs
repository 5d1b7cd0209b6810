use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc, NaiveDateTime};
use sqlx::{SqlitePool, FromRow};

use crate::{
    domain::{NewNotification, Notification, NotificationKind},
    error::{AppError, Result},
    repository::NotificationRepository,
};

#[derive(FromRow)]
struct NotificationRow {
    id: i64,
    user_id: i64,
    kind: String,
    title: String,
    content: String,
    is_read: i32,
    related_id: Option<i64>,
    created_at: NaiveDateTime,
}

pub struct SqliteNotificationRepository {
    pool: SqlitePool,
}

impl SqliteNotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_notification(row: NotificationRow) -> Result<Notification> {
        Ok(Notification {
            id: row.id,
            user_id: row.user_id,
            kind: Self::parse_kind(&row.kind)?,
            title: row.title,
            content: row.content,
            is_read: row.is_read != 0,
            related_id: row.related_id,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }

    fn parse_kind(s: &str) -> Result<NotificationKind> {
        match s {
            "new_announcement" => Ok(NotificationKind::NewAnnouncement),
            "new_response" => Ok(NotificationKind::NewResponse),
            "system" => Ok(NotificationKind::System),
            _ => Err(AppError::Database(format!("Invalid notification kind: {}", s))),
        }
    }

    fn kind_to_str(kind: &NotificationKind) -> &'static str {
        match kind {
            NotificationKind::NewAnnouncement => "new_announcement",
            NotificationKind::NewResponse => "new_response",
            NotificationKind::System => "system",
        }
    }
}

#[async_trait]
impl NotificationRepository for SqliteNotificationRepository {
    async fn create(&self, notification: NewNotification) -> Result<Notification> {
        let kind_str = Self::kind_to_str(&notification.kind);
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            INSERT INTO notifications (user_id, kind, title, content, is_read, related_id, created_at)
            VALUES (?, ?, ?, ?, 0, ?, ?)
            "#
        )
        .bind(notification.user_id)
        .bind(kind_str)
        .bind(&notification.title)
        .bind(&notification.content)
        .bind(notification.related_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(result.last_insert_rowid()).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created notification".to_string())
        })
    }

    async fn create_batch(&self, notifications: &[NewNotification]) -> Result<u64> {
        let now = Utc::now().naive_utc();

        let mut tx = self.pool.begin().await
            .map_err(|e| AppError::Database(e.to_string()))?;

        for notification in notifications {
            sqlx::query(
                r#"
                INSERT INTO notifications (user_id, kind, title, content, is_read, related_id, created_at)
                VALUES (?, ?, ?, ?, 0, ?, ?)
                "#
            )
            .bind(notification.user_id)
            .bind(Self::kind_to_str(&notification.kind))
            .bind(&notification.title)
            .bind(&notification.content)
            .bind(notification.related_id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        }

        tx.commit().await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(notifications.len() as u64)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Notification>> {
        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, user_id, kind, title, content, is_read, related_id, created_at
            FROM notifications
            WHERE id = ?
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_notification(r)?)),
            None => Ok(None)
        }
    }

    async fn list_for_user(
        &self,
        user_id: i64,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>> {
        let rows = if unread_only {
            sqlx::query_as::<_, NotificationRow>(
                r#"
                SELECT id, user_id, kind, title, content, is_read, related_id, created_at
                FROM notifications
                WHERE user_id = ? AND is_read = 0
                ORDER BY created_at DESC
                LIMIT ? OFFSET ?
                "#
            )
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, NotificationRow>(
                r#"
                SELECT id, user_id, kind, title, content, is_read, related_id, created_at
                FROM notifications
                WHERE user_id = ?
                ORDER BY created_at DESC
                LIMIT ? OFFSET ?
                "#
            )
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
        }
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_notification)
            .collect()
    }

    async fn mark_read(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_read(&self, user_id: i64) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1 WHERE user_id = ? AND is_read = 0"
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn unread_count(&self, user_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = 0"
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_older_than(&self, days: i64) -> Result<u64> {
        let cutoff = (Utc::now() - Duration::days(days)).naive_utc();

        let result = sqlx::query("DELETE FROM notifications WHERE created_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
