pub mod notification_service;
pub mod search_service;
pub mod mail_service;

use std::sync::Arc;
use sqlx::SqlitePool;

use crate::auth::AuthService;
use crate::repository::*;
use crate::storage::FileStorage;
pub use mail_service::{MailOutcome, Mailer};
pub use notification_service::NotificationService;
pub use search_service::{CombinedHit, SearchService, SearchSource};

pub struct ServiceContext {
    pub user_repo: Arc<dyn UserRepository>,
    pub announcement_repo: Arc<dyn AnnouncementRepository>,
    pub response_repo: Arc<dyn ResponseRepository>,
    pub notification_repo: Arc<dyn NotificationRepository>,
    pub notification_service: Arc<NotificationService>,
    pub search_service: Arc<SearchService>,
    pub auth_service: Arc<AuthService>,
    pub mailer: Arc<Mailer>,
    pub storage: Arc<dyn FileStorage>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        announcement_repo: Arc<dyn AnnouncementRepository>,
        response_repo: Arc<dyn ResponseRepository>,
        notification_repo: Arc<dyn NotificationRepository>,
        search_repo: Arc<dyn SearchRepository>,
        auth_service: Arc<AuthService>,
        mailer: Arc<Mailer>,
        storage: Arc<dyn FileStorage>,
        db_pool: SqlitePool,
    ) -> Self {
        let notification_service = Arc::new(NotificationService::new(
            notification_repo.clone(),
            user_repo.clone(),
        ));
        let search_service = Arc::new(SearchService::new(search_repo));

        Self {
            user_repo,
            announcement_repo,
            response_repo,
            notification_repo,
            notification_service,
            search_service,
            auth_service,
            mailer,
            storage,
            db_pool,
        }
    }
}
