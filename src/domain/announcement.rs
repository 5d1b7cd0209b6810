use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: AnnouncementKind,
    pub file_key: Option<String>,
    pub file_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A broadcast notice or a question soliciting responses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementKind {
    Announcement,
    Inquiry,
}

impl AnnouncementKind {
    pub fn label(&self) -> &'static str {
        match self {
            AnnouncementKind::Announcement => "announcement",
            AnnouncementKind::Inquiry => "inquiry",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewAnnouncement {
    pub title: String,
    pub content: String,
    pub kind: AnnouncementKind,
    pub file_key: Option<String>,
    pub file_name: Option<String>,
}
