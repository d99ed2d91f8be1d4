//! Trend bucket repository.

use std::sync::Arc;

use crate::entities::{TrendBucket, trend_bucket};
use chirp_common::{AppError, AppResult};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect, Set,
    sea_query::{Expr, ExprTrait, OnConflict},
};
use serde::Serialize;

/// Seconds per bucket.
const MINUTE: i64 = 60;

/// One resampled trend window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendWindow {
    /// Window start (inclusive).
    pub from_date: DateTime<Utc>,
    /// Window end (exclusive).
    pub to_date: DateTime<Utc>,
    /// Number of tagged messages created inside the window.
    pub count: u64,
}

#[derive(Debug, FromQueryResult)]
struct RawTrend {
    bucket: i64,
    count: i64,
}

/// Trend repository maintaining minute-granularity hashtag counters.
#[derive(Clone)]
pub struct TrendRepository {
    db: Arc<DatabaseConnection>,
}

impl TrendRepository {
    /// Create a new trend repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Convert an instant to its minute bucket index.
    #[must_use]
    pub fn bucket_for(t: DateTime<Utc>) -> i64 {
        t.timestamp().div_euclid(MINUTE)
    }

    /// Atomically insert a `(bucket, hashtag)` counter at 1 or add 1 to it.
    ///
    /// A single conflict-safe upsert, never a read-then-write, so concurrent
    /// transactions incrementing the same pair cannot lose updates. Runs on
    /// the caller-supplied connection so the increment commits or rolls back
    /// with the message insert.
    pub async fn increment<C: ConnectionTrait>(
        &self,
        conn: &C,
        bucket: i64,
        hashtag_id: i64,
    ) -> AppResult<()> {
        let model = trend_bucket::ActiveModel {
            bucket: Set(bucket),
            hashtag_id: Set(hashtag_id),
            count: Set(1),
        };

        TrendBucket::insert(model)
            .on_conflict(
                OnConflict::columns([
                    trend_bucket::Column::Bucket,
                    trend_bucket::Column::HashtagId,
                ])
                .value(
                    trend_bucket::Column::Count,
                    Expr::col((trend_bucket::Entity, trend_bucket::Column::Count)).add(1),
                )
                .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Resample minute buckets into windows of `period` width.
    ///
    /// Buckets strictly inside `(from_bucket, to_bucket)` are grouped by
    /// integer-dividing their index by the window width and their counts
    /// summed, optionally restricted to one hashtag. Windows are returned
    /// ordered by start ascending; an empty range yields an empty vector.
    pub async fn query(
        &self,
        from_bucket: i64,
        to_bucket: i64,
        period: Duration,
        hashtag_id: Option<i64>,
    ) -> AppResult<Vec<TrendWindow>> {
        let width = period.num_minutes().max(1);
        let grouped = Expr::col(trend_bucket::Column::Bucket).div(width);

        let mut query = TrendBucket::find()
            .select_only()
            .column_as(grouped.clone(), "bucket")
            .column_as(trend_bucket::Column::Count.sum(), "count")
            .filter(trend_bucket::Column::Bucket.gt(from_bucket))
            .filter(trend_bucket::Column::Bucket.lt(to_bucket))
            .group_by(grouped.clone())
            .order_by_asc(grouped);

        if let Some(id) = hashtag_id {
            query = query.filter(trend_bucket::Column::HashtagId.eq(id));
        }

        let rows = query
            .into_model::<RawTrend>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter()
            .map(|raw| {
                let from_secs = raw.bucket * width * MINUTE;
                let from_date = DateTime::from_timestamp(from_secs, 0).ok_or_else(|| {
                    AppError::Internal(format!("trend window out of range: {from_secs}"))
                })?;
                Ok(TrendWindow {
                    from_date,
                    to_date: from_date + Duration::minutes(width),
                    count: u64::try_from(raw.count).unwrap_or(0),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    #[test]
    fn test_bucket_for() {
        let t = DateTime::from_timestamp(120, 30).unwrap();
        assert_eq!(TrendRepository::bucket_for(t), 2);
    }

    #[tokio::test]
    async fn test_query_maps_windows() {
        // Two five-minute windows: group indexes 100 and 101.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    btreemap! {
                        "bucket" => Value::BigInt(Some(100)),
                        "count" => Value::BigInt(Some(3)),
                    },
                    btreemap! {
                        "bucket" => Value::BigInt(Some(101)),
                        "count" => Value::BigInt(Some(1)),
                    },
                ]])
                .into_connection(),
        );

        let repo = TrendRepository::new(db);
        let windows = repo
            .query(499, 511, Duration::minutes(5), None)
            .await
            .unwrap();

        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].count, 3);
        assert_eq!(
            windows[0].from_date,
            DateTime::from_timestamp(100 * 5 * 60, 0).unwrap()
        );
        assert_eq!(
            windows[0].to_date - windows[0].from_date,
            Duration::minutes(5)
        );
        assert_eq!(windows[1].count, 1);
        assert!(windows[0].from_date < windows[1].from_date);
    }

    #[tokio::test]
    async fn test_query_empty_range() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<std::collections::BTreeMap<&str, Value>>::new()])
                .into_connection(),
        );

        let repo = TrendRepository::new(db);
        let windows = repo
            .query(0, 1, Duration::minutes(1), Some(42))
            .await
            .unwrap();

        assert!(windows.is_empty());
    }
}
