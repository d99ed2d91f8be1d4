//! Hashtag repository.

use std::sync::Arc;

use crate::entities::{Hashtag, hashtag};
use chirp_common::{AppError, AppResult};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, SqlErr,
};

/// Hashtag repository for database operations.
#[derive(Clone)]
pub struct HashtagRepository {
    db: Arc<DatabaseConnection>,
}

/// Lowercase and deduplicate hashtag texts, preserving first occurrence.
///
/// Matching is exact after lowercasing; no further normalization is applied.
#[must_use]
pub fn normalize_texts(texts: &[String]) -> Vec<String> {
    let mut seen = Vec::with_capacity(texts.len());
    for text in texts {
        let lower = text.to_lowercase();
        if !seen.contains(&lower) {
            seen.push(lower);
        }
    }
    seen
}

impl HashtagRepository {
    /// Create a new hashtag repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a hashtag by text.
    pub async fn find_by_text(&self, text: &str) -> AppResult<Option<hashtag::Model>> {
        Hashtag::find()
            .filter(hashtag::Column::Text.eq(text.to_lowercase()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Resolve hashtag texts to rows, creating missing ones.
    ///
    /// Input is lowercased and deduplicated preserving first occurrence;
    /// the returned models follow that order. Runs on the caller-supplied
    /// connection so creation joins the caller's transaction. Concurrent
    /// creation of the same text falls back to a re-select on unique
    /// violation.
    pub async fn resolve_many<C: ConnectionTrait>(
        &self,
        conn: &C,
        texts: &[String],
    ) -> AppResult<Vec<hashtag::Model>> {
        let texts = normalize_texts(texts);
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let existing = Hashtag::find()
            .filter(hashtag::Column::Text.is_in(texts.clone()))
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut resolved = Vec::with_capacity(texts.len());
        for text in &texts {
            let found = existing.iter().find(|tag| tag.text == *text);
            match found {
                Some(tag) => resolved.push(tag.clone()),
                None => resolved.push(Self::create_on(conn, text).await?),
            }
        }

        Ok(resolved)
    }

    async fn create_on<C: ConnectionTrait>(conn: &C, text: &str) -> AppResult<hashtag::Model> {
        let now = Utc::now();
        let model = hashtag::ActiveModel {
            text: Set(text.to_string()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        match model.insert(conn).await {
            Ok(created) => Ok(created),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Hashtag::find()
                    .filter(hashtag::Column::Text.eq(text))
                    .one(conn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?
                    .ok_or_else(|| {
                        AppError::Database(format!("lost hashtag insert race for {text}"))
                    })
            }
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }
}
