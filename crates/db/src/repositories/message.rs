//! Message repository.

use std::sync::Arc;

use crate::entities::{Hashtag, Message, MessageHashtag, hashtag, message, message_hashtag, user};
use crate::filter::MessageFilter;
use chirp_common::{AppError, AppResult};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, LoaderTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

/// Message repository for database operations.
#[derive(Clone)]
pub struct MessageRepository {
    db: Arc<DatabaseConnection>,
}

impl MessageRepository {
    /// Create a new message repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a message row on the caller-supplied connection.
    pub async fn insert<C: ConnectionTrait>(
        &self,
        conn: &C,
        ulid: &str,
        user_id: i64,
        text: &str,
        created_at: DateTime<Utc>,
    ) -> AppResult<message::Model> {
        let model = message::ActiveModel {
            ulid: Set(ulid.to_string()),
            user_id: Set(user_id),
            text: Set(text.to_string()),
            created_at: Set(created_at.into()),
            updated_at: Set(created_at.into()),
            ..Default::default()
        };

        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert the message's hashtag association rows.
    pub async fn attach_hashtags<C: ConnectionTrait>(
        &self,
        conn: &C,
        message_id: i64,
        hashtag_ids: &[i64],
    ) -> AppResult<()> {
        if hashtag_ids.is_empty() {
            return Ok(());
        }

        let rows = hashtag_ids.iter().map(|&hashtag_id| {
            message_hashtag::ActiveModel {
                message_id: Set(message_id),
                hashtag_id: Set(hashtag_id),
            }
        });

        MessageHashtag::insert_many(rows)
            .exec_without_returning(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Find a message by its ULID.
    pub async fn find_by_ulid(&self, ulid: &str) -> AppResult<Option<message::Model>> {
        Message::find()
            .filter(message::Column::Ulid.eq(ulid))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List messages matching the filter, newest first.
    ///
    /// A cursor takes precedence over a date range; user and hashtag
    /// constraints are resolved to IDs by the caller and AND-combined here.
    pub async fn list(
        &self,
        filter: &MessageFilter,
        user_id: Option<i64>,
        hashtag_id: Option<i64>,
    ) -> AppResult<Vec<message::Model>> {
        let mut query = Message::find()
            .order_by_desc(message::Column::Ulid)
            .limit(filter.limit());

        if let Some(cursor) = &filter.cursor {
            query = query.filter(message::Column::Ulid.lt(cursor.as_str()));
        } else if filter.is_date_range_query() {
            if let (Some(from), Some(to)) = (filter.from_date(), filter.to_date()) {
                query = query
                    .filter(message::Column::CreatedAt.gt(from))
                    .filter(message::Column::CreatedAt.lt(to));
            }
        }

        if let Some(id) = user_id {
            query = query.filter(message::Column::UserId.eq(id));
        }

        if let Some(id) = hashtag_id {
            query = query
                .inner_join(MessageHashtag)
                .filter(message_hashtag::Column::HashtagId.eq(id));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Load the owning user for each message, in message order.
    pub async fn load_authors(
        &self,
        messages: &[message::Model],
    ) -> AppResult<Vec<Option<user::Model>>> {
        messages
            .load_one(user::Entity, self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Load the associated hashtags for each message, in message order.
    pub async fn load_hashtags(
        &self,
        messages: &[message::Model],
    ) -> AppResult<Vec<Vec<hashtag::Model>>> {
        messages
            .load_many_to_many(Hashtag, MessageHashtag, self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
