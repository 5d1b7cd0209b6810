use std::sync::Arc;

use crate::{
    domain::{NewNotification, Notification, NotificationKind},
    error::Result,
    repository::{NotificationRepository, UserRepository},
};

/// Creates per-user notification rows and manages their read state.
///
/// `broadcast` has no idempotency key: calling it twice produces duplicate
/// notifications. A persistence error aborts the whole batch.
pub struct NotificationService {
    notification_repo: Arc<dyn NotificationRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl NotificationService {
    pub fn new(
        notification_repo: Arc<dyn NotificationRepository>,
        user_repo: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            notification_repo,
            user_repo,
        }
    }

    /// Sends one notification to a single user.
    pub async fn send(
        &self,
        user_id: i64,
        kind: NotificationKind,
        title: &str,
        content: &str,
        related_id: Option<i64>,
    ) -> Result<Notification> {
        self.notification_repo
            .create(NewNotification {
                user_id,
                kind,
                title: title.to_string(),
                content: content.to_string(),
                related_id,
            })
            .await
    }

    /// Creates one unread notification per active user, excluding the
    /// actor, committed in a single transaction. Returns how many were
    /// created.
    pub async fn broadcast(
        &self,
        kind: NotificationKind,
        title: &str,
        content: &str,
        related_id: Option<i64>,
        exclude_user_id: Option<i64>,
    ) -> Result<u64> {
        let recipients = self.user_repo.list_active().await?;

        let batch: Vec<NewNotification> = recipients
            .into_iter()
            .filter(|user| Some(user.id) != exclude_user_id)
            .map(|user| NewNotification {
                user_id: user.id,
                kind,
                title: title.to_string(),
                content: content.to_string(),
                related_id,
            })
            .collect();

        if batch.is_empty() {
            return Ok(0);
        }

        let created = self.notification_repo.create_batch(&batch).await?;
        tracing::info!("Broadcast {} notifications ({})", created, title);

        Ok(created)
    }

    pub async fn get_notifications(
        &self,
        user_id: i64,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>> {
        self.notification_repo
            .list_for_user(user_id, unread_only, limit, offset)
            .await
    }

    pub async fn get_unread_count(&self, user_id: i64) -> Result<i64> {
        self.notification_repo.unread_count(user_id).await
    }

    /// Returns false when the notification does not exist. Marking an
    /// already-read notification reports success.
    pub async fn mark_as_read(&self, id: i64) -> Result<bool> {
        self.notification_repo.mark_read(id).await
    }

    /// Returns the number of notifications that were still unread.
    pub async fn mark_all_as_read(&self, user_id: i64) -> Result<u64> {
        self.notification_repo.mark_all_read(user_id).await
    }

    /// Hard delete. Returns false when the notification does not exist.
    pub async fn delete_notification(&self, id: i64) -> Result<bool> {
        self.notification_repo.delete(id).await
    }

    /// Maintenance purge of notifications older than the cutoff. Not
    /// exposed over HTTP; meant for an operator or a future periodic job.
    pub async fn delete_old_notifications(&self, days: i64) -> Result<u64> {
        let purged = self.notification_repo.delete_older_than(days).await?;
        if purged > 0 {
            tracing::info!("Purged {} notifications older than {} days", purged, days);
        }
        Ok(purged)
    }
}
