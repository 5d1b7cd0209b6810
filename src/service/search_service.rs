use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    error::Result,
    repository::{AnnouncementHit, ResponseHit, SearchRepository},
};

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSource {
    Announcement,
    Response,
}

/// One row of the combined search, tagged with where it came from.
#[derive(Debug, Clone, Serialize)]
pub struct CombinedHit {
    #[serde(rename = "type")]
    pub source: SearchSource,
    pub id: i64,
    pub display_title: String,
    pub display_content: String,
    pub announcement_title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub relevance: f64,
}

pub struct SearchService {
    search_repo: Arc<dyn SearchRepository>,
}

impl SearchService {
    pub fn new(search_repo: Arc<dyn SearchRepository>) -> Self {
        Self { search_repo }
    }

    pub async fn search_announcements(
        &self,
        query: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AnnouncementHit>> {
        self.search_repo.search_announcements(query, limit, offset).await
    }

    pub async fn search_responses(
        &self,
        query: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ResponseHit>> {
        self.search_repo.search_responses(query, limit, offset).await
    }

    /// Runs both searches independently, tags each row with its source,
    /// then merges and re-sorts by relevance descending. Ties keep no
    /// particular order.
    pub async fn search_all(
        &self,
        query: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CombinedHit>> {
        let announcements = self
            .search_repo
            .search_announcements(query, limit, offset)
            .await?;
        let responses = self
            .search_repo
            .search_responses(query, limit, offset)
            .await?;

        let mut results: Vec<CombinedHit> = announcements
            .into_iter()
            .map(|hit| CombinedHit {
                source: SearchSource::Announcement,
                id: hit.id,
                display_title: hit.title,
                display_content: hit.content,
                announcement_title: None,
                created_at: hit.created_at,
                relevance: hit.relevance,
            })
            .chain(responses.into_iter().map(|hit| CombinedHit {
                source: SearchSource::Response,
                id: hit.id,
                display_title: hit.announcement_title.clone().unwrap_or_default(),
                display_content: hit.content,
                announcement_title: hit.announcement_title,
                created_at: hit.created_at,
                relevance: hit.relevance,
            }))
            .collect();

        results.sort_unstable_by(|a, b| {
            b.relevance
                .partial_cmp(&a.relevance)
                .unwrap_or(Ordering::Equal)
        });

        Ok(results)
    }
}
