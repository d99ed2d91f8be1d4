//! User repository.

use std::sync::Arc;

use crate::entities::{User, user};
use chirp_common::{AppError, AppResult};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, SqlErr,
};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by exact name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<user::Model>> {
        Self::find_by_name_on(self.db.as_ref(), name).await
    }

    /// Resolve a user name to its row, creating the row on first use.
    ///
    /// Runs on the caller-supplied connection so it can participate in the
    /// caller's transaction. Explicit select / insert / re-select on unique
    /// violation, so a concurrent resolve of the same name never yields two
    /// rows.
    pub async fn resolve<C: ConnectionTrait>(
        &self,
        conn: &C,
        name: &str,
    ) -> AppResult<user::Model> {
        if let Some(existing) = Self::find_by_name_on(conn, name).await? {
            return Ok(existing);
        }

        let now = Utc::now();
        let model = user::ActiveModel {
            name: Set(name.to_string()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        match model.insert(conn).await {
            Ok(created) => Ok(created),
            // A concurrent transaction inserted the same name first; the row
            // is there now, fetch it.
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Self::find_by_name_on(conn, name)
                    .await?
                    .ok_or_else(|| AppError::Database(format!("lost user insert race for {name}")))
            }
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    async fn find_by_name_on<C: ConnectionTrait>(
        conn: &C,
        name: &str,
    ) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Name.eq(name))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
