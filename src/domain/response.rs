use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reply attached to one announcement, authored by a free-text name
/// rather than a user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub id: i64,
    pub announcement_id: i64,
    pub colleague_name: String,
    pub content: String,
    pub file_key: Option<String>,
    pub file_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseWithAnnouncement {
    pub id: i64,
    pub announcement_id: i64,
    pub announcement_title: String,
    pub colleague_name: String,
    pub content: String,
    pub file_key: Option<String>,
    pub file_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewResponse {
    pub announcement_id: i64,
    pub colleague_name: String,
    pub content: String,
    pub file_key: Option<String>,
    pub file_name: Option<String>,
}
