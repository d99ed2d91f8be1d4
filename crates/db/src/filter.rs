//! Declarative query filter for message listing and trend aggregation.

use chrono::{DateTime, Duration, Utc};

/// Default page size when the caller does not supply a limit.
const DEFAULT_LIMIT: u64 = 100;

/// A declarative request description consumed by the message service.
///
/// A filter describes one of two request shapes:
/// - a listing (cursor takes precedence over a date range, user and hashtag
///   constraints are AND-combined on top), or
/// - a trend aggregation (`aggregation` of at least one minute plus a valid
///   date range).
///
/// The two shapes are mutually exclusive: an aggregate filter is rejected by
/// the listing path and vice versa.
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    /// Opaque cursor: a previously-issued message ULID; list strictly older.
    pub cursor: Option<String>,
    /// Range start (inclusive boundary is truncated to the minute).
    pub from_date: Option<DateTime<Utc>>,
    /// Range end (truncated to the minute).
    pub to_date: Option<DateTime<Utc>>,
    /// Maximum number of rows to return.
    pub limit: Option<u64>,
    /// Restrict to messages owned by this user name.
    pub user_name: Option<String>,
    /// Restrict to messages carrying this hashtag.
    pub hashtag: Option<String>,
    /// Aggregation period for trend queries.
    pub aggregation: Option<Duration>,
}

/// Truncate a timestamp down to a whole minute.
fn truncate_to_minute(t: DateTime<Utc>) -> DateTime<Utc> {
    let secs = t.timestamp().div_euclid(60) * 60;
    DateTime::from_timestamp(secs, 0).unwrap_or(t)
}

impl MessageFilter {
    /// Whether a pagination cursor is present.
    #[must_use]
    pub const fn is_cursor_query(&self) -> bool {
        self.cursor.is_some()
    }

    /// Whether both range boundaries are present and ordered.
    #[must_use]
    pub fn is_date_range_query(&self) -> bool {
        match (self.from_date(), self.to_date()) {
            (Some(from), Some(to)) => from < to,
            _ => false,
        }
    }

    /// Whether a user-name constraint is present.
    #[must_use]
    pub const fn is_user_query(&self) -> bool {
        self.user_name.is_some()
    }

    /// Whether a hashtag constraint is present.
    #[must_use]
    pub const fn is_hashtag_query(&self) -> bool {
        self.hashtag.is_some()
    }

    /// Whether this filter requests trend aggregation.
    ///
    /// Periods below one minute do not count: buckets are minute-granular.
    #[must_use]
    pub fn is_aggregate_query(&self) -> bool {
        self.aggregation
            .is_some_and(|period| period >= Duration::minutes(1))
    }

    /// Range start, truncated to the minute.
    #[must_use]
    pub fn from_date(&self) -> Option<DateTime<Utc>> {
        self.from_date.map(truncate_to_minute)
    }

    /// Range end, truncated to the minute.
    #[must_use]
    pub fn to_date(&self) -> Option<DateTime<Utc>> {
        self.to_date.map(truncate_to_minute)
    }

    /// Requested aggregation period.
    #[must_use]
    pub const fn aggregation_period(&self) -> Option<Duration> {
        self.aggregation
    }

    /// Effective page size.
    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_limit() {
        let filter = MessageFilter::default();
        assert_eq!(filter.limit(), 100);

        let filter = MessageFilter {
            limit: Some(10),
            ..Default::default()
        };
        assert_eq!(filter.limit(), 10);
    }

    #[test]
    fn test_date_range_requires_both_boundaries() {
        let from = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap();

        let filter = MessageFilter {
            from_date: Some(from),
            ..Default::default()
        };
        assert!(!filter.is_date_range_query());

        let filter = MessageFilter {
            from_date: Some(from),
            to_date: Some(to),
            ..Default::default()
        };
        assert!(filter.is_date_range_query());
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let from = Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let filter = MessageFilter {
            from_date: Some(from),
            to_date: Some(to),
            ..Default::default()
        };
        assert!(!filter.is_date_range_query());
    }

    #[test]
    fn test_boundaries_truncate_to_minute() {
        let from = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 42).unwrap();

        let filter = MessageFilter {
            from_date: Some(from),
            ..Default::default()
        };
        assert_eq!(
            filter.from_date().unwrap(),
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_range_collapsing_under_truncation_is_rejected() {
        // Both instants fall inside the same minute, so the truncated range
        // is empty.
        let from = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 5).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 55).unwrap();

        let filter = MessageFilter {
            from_date: Some(from),
            to_date: Some(to),
            ..Default::default()
        };
        assert!(!filter.is_date_range_query());
    }

    #[test]
    fn test_aggregate_query_requires_at_least_one_minute() {
        let filter = MessageFilter {
            aggregation: Some(Duration::seconds(30)),
            ..Default::default()
        };
        assert!(!filter.is_aggregate_query());

        let filter = MessageFilter {
            aggregation: Some(Duration::minutes(5)),
            ..Default::default()
        };
        assert!(filter.is_aggregate_query());
    }
}
