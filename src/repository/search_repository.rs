use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use serde::Serialize;
use sqlx::{SqlitePool, FromRow};

use crate::{
    domain::AnnouncementKind,
    error::{AppError, Result},
    repository::{announcement_repository::parse_kind, SearchRepository},
};

/// An announcement matched by a full-text query, with its bm25 relevance
/// (higher = more relevant).
#[derive(Debug, Clone, Serialize)]
pub struct AnnouncementHit {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: AnnouncementKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub relevance: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseHit {
    pub id: i64,
    pub announcement_id: i64,
    pub announcement_title: Option<String>,
    pub colleague_name: String,
    pub content: String,
    pub file_key: Option<String>,
    pub file_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub relevance: f64,
}

#[derive(FromRow)]
struct AnnouncementHitRow {
    id: i64,
    title: String,
    content: String,
    kind: String,
    created_at: NaiveDateTime,
    updated_at: Option<NaiveDateTime>,
    relevance: f64,
}

#[derive(FromRow)]
struct ResponseHitRow {
    id: i64,
    announcement_id: i64,
    announcement_title: Option<String>,
    colleague_name: String,
    content: String,
    file_key: Option<String>,
    file_name: Option<String>,
    created_at: NaiveDateTime,
    relevance: f64,
}

pub struct SqliteSearchRepository {
    pool: SqlitePool,
}

impl SqliteSearchRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Turns free text into an FTS5 MATCH expression: each whitespace-separated
/// term becomes a quoted token (implicit AND). Returns None when nothing
/// searchable remains, so callers can short-circuit to an empty result.
pub(crate) fn match_expression(query: &str) -> Option<String> {
    let terms: Vec<String> = query
        .split_whitespace()
        .map(|term| format!("\"{}\"", term.replace('"', "")))
        .filter(|quoted| quoted.len() > 2)
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" "))
    }
}

#[async_trait]
impl SearchRepository for SqliteSearchRepository {
    async fn search_announcements(
        &self,
        query: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AnnouncementHit>> {
        let Some(expr) = match_expression(query) else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query_as::<_, AnnouncementHitRow>(
            r#"
            SELECT a.id, a.title, a.content, a.kind, a.created_at, a.updated_at,
                   -bm25(announcements_fts) AS relevance
            FROM announcements_fts
            JOIN announcements a ON a.id = announcements_fts.rowid
            WHERE announcements_fts MATCH ?
            ORDER BY relevance DESC
            LIMIT ? OFFSET ?
            "#
        )
        .bind(&expr)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter()
            .map(|row| {
                Ok(AnnouncementHit {
                    id: row.id,
                    title: row.title,
                    content: row.content,
                    kind: parse_kind(&row.kind)?,
                    created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
                    updated_at: row
                        .updated_at
                        .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
                    relevance: row.relevance,
                })
            })
            .collect()
    }

    async fn search_responses(
        &self,
        query: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ResponseHit>> {
        let Some(expr) = match_expression(query) else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query_as::<_, ResponseHitRow>(
            r#"
            SELECT r.id, r.announcement_id, a.title AS announcement_title,
                   r.colleague_name, r.content, r.file_key, r.file_name, r.created_at,
                   -bm25(responses_fts) AS relevance
            FROM responses_fts
            JOIN responses r ON r.id = responses_fts.rowid
            LEFT JOIN announcements a ON r.announcement_id = a.id
            WHERE responses_fts MATCH ?
            ORDER BY relevance DESC
            LIMIT ? OFFSET ?
            "#
        )
        .bind(&expr)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| ResponseHit {
                id: row.id,
                announcement_id: row.announcement_id,
                announcement_title: row.announcement_title,
                colleague_name: row.colleague_name,
                content: row.content,
                file_key: row.file_key,
                file_name: row.file_name,
                created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
                relevance: row.relevance,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::match_expression;

    #[test]
    fn quotes_each_term() {
        assert_eq!(
            match_expression("quarterly plan"),
            Some("\"quarterly\" \"plan\"".to_string())
        );
    }

    #[test]
    fn strips_embedded_quotes() {
        assert_eq!(match_expression("a\"b"), Some("\"ab\"".to_string()));
    }

    #[test]
    fn empty_input_yields_none() {
        assert_eq!(match_expression("   "), None);
        assert_eq!(match_expression("\" \""), None);
    }
}
