use async_trait::async_trait;
use crate::domain::*;
use crate::error::Result;

pub mod user_repository;
pub mod announcement_repository;
pub mod response_repository;
pub mod notification_repository;
pub mod search_repository;

pub use user_repository::SqliteUserRepository;
pub use announcement_repository::SqliteAnnouncementRepository;
pub use response_repository::SqliteResponseRepository;
pub use notification_repository::SqliteNotificationRepository;
pub use search_repository::{AnnouncementHit, ResponseHit, SqliteSearchRepository};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, request: CreateUserRequest) -> Result<User>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>>;
    async fn count(&self) -> Result<i64>;
    async fn list_active(&self) -> Result<Vec<User>>;
    async fn update(&self, id: i64, update: UpdateUserRequest) -> Result<User>;
    async fn set_active(&self, id: i64, is_active: bool) -> Result<User>;
    async fn delete(&self, id: i64) -> Result<()>;
}

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    async fn create(&self, announcement: NewAnnouncement) -> Result<Announcement>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Announcement>>;
    async fn list(
        &self,
        kind: Option<AnnouncementKind>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Announcement>>;
    /// Deletes the announcement and all of its responses in one transaction.
    async fn delete(&self, id: i64) -> Result<()>;
}

#[async_trait]
pub trait ResponseRepository: Send + Sync {
    async fn create(&self, response: NewResponse) -> Result<Response>;
    async fn list_by_announcement(
        &self,
        announcement_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Response>>;
    async fn list_by_colleague(
        &self,
        colleague_name: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ResponseWithAnnouncement>>;
    async fn list_filtered(
        &self,
        announcement_id: Option<i64>,
        colleague_name: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Response>>;
    async fn count_by_announcement(&self, announcement_id: i64) -> Result<i64>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: NewNotification) -> Result<Notification>;
    /// Inserts the whole batch inside a single transaction; a failure
    /// aborts all of it.
    async fn create_batch(&self, notifications: &[NewNotification]) -> Result<u64>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Notification>>;
    async fn list_for_user(
        &self,
        user_id: i64,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>>;
    async fn mark_read(&self, id: i64) -> Result<bool>;
    async fn mark_all_read(&self, user_id: i64) -> Result<u64>;
    async fn unread_count(&self, user_id: i64) -> Result<i64>;
    async fn delete(&self, id: i64) -> Result<bool>;
    async fn delete_older_than(&self, days: i64) -> Result<u64>;
}

#[async_trait]
pub trait SearchRepository: Send + Sync {
    async fn search_announcements(
        &self,
        query: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AnnouncementHit>>;
    async fn search_responses(
        &self,
        query: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ResponseHit>>;
}
