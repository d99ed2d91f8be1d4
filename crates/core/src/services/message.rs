//! Message service.

use std::sync::Arc;

use chirp_common::{AppError, AppResult, IdGenerator};
use chirp_db::{
    MessageFilter,
    entities::{message, user},
    repositories::{
        HashtagRepository, MessageRepository, TrendRepository, TrendWindow, UserRepository,
    },
};
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};

/// Input for creating a new message.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMessageInput {
    /// Author display name; the user row is created on first use.
    pub user_name: String,
    /// Message text content.
    pub text: String,
    /// Hashtag texts, in caller order; duplicates are collapsed.
    #[serde(default)]
    pub hashtags: Vec<String>,
}

/// Fully hydrated message read model.
#[derive(Debug, Clone, Serialize)]
pub struct MessageDetail {
    /// External time-sortable identifier (ULID).
    pub id: String,
    /// Owning user.
    pub user: user::Model,
    /// Message text content.
    pub text: String,
    /// Associated hashtag texts.
    pub hashtags: Vec<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Message service for business logic.
///
/// Write paths run inside a single database transaction; read paths are
/// single consistent reads with no locking.
#[derive(Clone)]
pub struct MessageService {
    db: Arc<DatabaseConnection>,
    user_repo: UserRepository,
    hashtag_repo: HashtagRepository,
    message_repo: MessageRepository,
    trend_repo: TrendRepository,
    id_gen: IdGenerator,
}

impl MessageService {
    /// Create a new message service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            user_repo: UserRepository::new(db.clone()),
            hashtag_repo: HashtagRepository::new(db.clone()),
            message_repo: MessageRepository::new(db.clone()),
            trend_repo: TrendRepository::new(db.clone()),
            id_gen: IdGenerator::new(),
            db,
        }
    }

    /// Create a message and return its ULID.
    ///
    /// Resolves the user and hashtags, bumps each hashtag's trend bucket for
    /// the creation minute, and inserts the message with its associations,
    /// all in one transaction. Any failure rolls the whole thing back: no
    /// partial message, no stray trend increment.
    pub async fn create_message(&self, input: &CreateMessageInput) -> AppResult<String> {
        if input.text.is_empty() {
            return Err(AppError::Validation(
                "message text must not be empty".to_string(),
            ));
        }

        // One instant drives both the message row and the bucket index, so
        // the two can never disagree about which minute the message is in.
        let ulid = self.id_gen.generate()?;
        let now = Utc::now();
        let bucket = TrendRepository::bucket_for(now);

        // An early return drops the transaction, which rolls it back.
        let tx = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let user = self.user_repo.resolve(&tx, &input.user_name).await?;
        let hashtags = self.hashtag_repo.resolve_many(&tx, &input.hashtags).await?;

        for tag in &hashtags {
            self.trend_repo.increment(&tx, bucket, tag.id).await?;
        }

        let message = self
            .message_repo
            .insert(&tx, &ulid, user.id, &input.text, now)
            .await?;

        let hashtag_ids: Vec<i64> = hashtags.iter().map(|tag| tag.id).collect();
        self.message_repo
            .attach_hashtags(&tx, message.id, &hashtag_ids)
            .await?;

        tx.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(
            id = %ulid,
            user = %input.user_name,
            hashtags = hashtags.len(),
            "created message"
        );

        Ok(ulid)
    }

    /// Get a message by its ULID, hydrated with user and hashtags.
    pub async fn get_message(&self, id: &str) -> AppResult<MessageDetail> {
        let Some(message) = self.message_repo.find_by_ulid(id).await? else {
            return Err(AppError::MessageNotFound(id.to_string()));
        };

        let mut details = self.hydrate(vec![message]).await?;
        details
            .pop()
            .ok_or_else(|| AppError::Internal(format!("hydration dropped message {id}")))
    }

    /// List messages matching the filter, newest first.
    ///
    /// Rejects aggregate filters: listing and aggregation are mutually
    /// exclusive request shapes. Unknown user names or hashtags yield an
    /// empty list, not an error.
    pub async fn list_messages(&self, filter: &MessageFilter) -> AppResult<Vec<MessageDetail>> {
        if filter.is_aggregate_query() {
            return Err(AppError::Validation(
                "aggregate filter cannot be served by message listing".to_string(),
            ));
        }

        let user_id = match &filter.user_name {
            Some(name) => match self.user_repo.find_by_name(name).await? {
                Some(user) => Some(user.id),
                None => return Ok(vec![]),
            },
            None => None,
        };

        let hashtag_id = match &filter.hashtag {
            Some(text) => match self.hashtag_repo.find_by_text(text).await? {
                Some(tag) => Some(tag.id),
                None => return Ok(vec![]),
            },
            None => None,
        };

        let rows = self.message_repo.list(filter, user_id, hashtag_id).await?;
        self.hydrate(rows).await
    }

    /// Resampled trend counts for the filter's date range.
    ///
    /// Requires an aggregation period of at least one minute and a valid
    /// date range. The cursor, if any, is ignored. An unknown hashtag yields
    /// an empty result.
    pub async fn get_trends(&self, filter: &MessageFilter) -> AppResult<Vec<TrendWindow>> {
        if !filter.is_aggregate_query() {
            return Err(AppError::Validation(
                "trend query requires an aggregation period of at least one minute".to_string(),
            ));
        }
        if !filter.is_date_range_query() {
            return Err(AppError::Validation(
                "trend query requires a valid date range".to_string(),
            ));
        }

        let (Some(from), Some(to), Some(period)) = (
            filter.from_date(),
            filter.to_date(),
            filter.aggregation_period(),
        ) else {
            return Err(AppError::Validation(
                "trend query requires a valid date range".to_string(),
            ));
        };

        let hashtag_id = match &filter.hashtag {
            Some(text) => match self.hashtag_repo.find_by_text(text).await? {
                Some(tag) => Some(tag.id),
                None => return Ok(vec![]),
            },
            None => None,
        };

        self.trend_repo
            .query(
                TrendRepository::bucket_for(from),
                TrendRepository::bucket_for(to),
                period,
                hashtag_id,
            )
            .await
    }

    /// Attach owning users and hashtag texts to message rows.
    async fn hydrate(&self, messages: Vec<message::Model>) -> AppResult<Vec<MessageDetail>> {
        if messages.is_empty() {
            return Ok(vec![]);
        }

        let authors = self.message_repo.load_authors(&messages).await?;
        let hashtags = self.message_repo.load_hashtags(&messages).await?;

        messages
            .into_iter()
            .zip(authors)
            .zip(hashtags)
            .map(|((message, author), tags)| {
                let user = author.ok_or_else(|| {
                    AppError::Database(format!("message {} has no owner row", message.ulid))
                })?;
                Ok(MessageDetail {
                    id: message.ulid,
                    user,
                    text: message.text,
                    hashtags: tags.into_iter().map(|tag| tag.text).collect(),
                    created_at: message.created_at.with_timezone(&Utc),
                })
            })
            .collect()
    }
}
