//! End-to-end message flow tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test message_flow -- --ignored`

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chirp_core::{CreateMessageInput, MessageService};
use chirp_db::MessageFilter;
use chirp_db::test_utils::TestDatabase;
use chrono::{Duration, Utc};

/// Open a second connection to the test database. With sea-orm's `mock`
/// feature enabled (needed by the unit tests), `DatabaseConnection` is not
/// `Clone`, so the service gets its own connection to the same database.
async fn connect(db: &TestDatabase) -> sea_orm::DatabaseConnection {
    sea_orm::Database::connect(db.config.database_url())
        .await
        .unwrap()
}

fn input(user: &str, text: &str, hashtags: &[&str]) -> CreateMessageInput {
    CreateMessageInput {
        user_name: user.to_string(),
        text: text.to_string(),
        hashtags: hashtags.iter().map(ToString::to_string).collect(),
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_identifiers_strictly_increase() {
    let db = TestDatabase::create_unique().await.unwrap();
    let service = MessageService::new(Arc::new(connect(&db).await));

    let mut previous = String::new();
    for i in 0..20 {
        let id = service
            .create_message(&input("alice", &format!("message {i}"), &[]))
            .await
            .unwrap();
        assert!(id > previous, "{id} !> {previous}");
        previous = id;
    }

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_round_trip() {
    let db = TestDatabase::create_unique().await.unwrap();
    let service = MessageService::new(Arc::new(connect(&db).await));

    let id = service
        .create_message(&input("alice", "hello", &["x"]))
        .await
        .unwrap();

    let detail = service.get_message(&id).await.unwrap();
    assert_eq!(detail.text, "hello");
    assert_eq!(detail.user.name, "alice");
    assert_eq!(detail.hashtags, vec!["x".to_string()]);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_hashtag_rows_are_reused() {
    let db = TestDatabase::create_unique().await.unwrap();
    let service = MessageService::new(Arc::new(connect(&db).await));

    service
        .create_message(&input("alice", "first", &["shared"]))
        .await
        .unwrap();
    service
        .create_message(&input("bob", "second", &["shared"]))
        .await
        .unwrap();

    let filter = MessageFilter {
        hashtag: Some("shared".to_string()),
        ..Default::default()
    };
    let messages = service.list_messages(&filter).await.unwrap();
    assert_eq!(messages.len(), 2);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_cursor_pagination_covers_all_messages() {
    let db = TestDatabase::create_unique().await.unwrap();
    let service = MessageService::new(Arc::new(connect(&db).await));

    let mut created = Vec::new();
    for i in 0..10 {
        created.push(
            service
                .create_message(&input("alice", &format!("message {i}"), &[]))
                .await
                .unwrap(),
        );
    }

    // Walk pages of 3, seeding each cursor from the previous page's last id.
    let mut seen = Vec::new();
    let mut cursor = None;
    loop {
        let filter = MessageFilter {
            cursor: cursor.clone(),
            limit: Some(3),
            ..Default::default()
        };
        let page = service.list_messages(&filter).await.unwrap();
        if page.is_empty() {
            break;
        }
        cursor = page.last().map(|m| m.id.clone());
        seen.extend(page.into_iter().map(|m| m.id));
    }

    let mut expected = created.clone();
    expected.sort();
    expected.reverse();
    assert_eq!(seen, expected);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_trend_counts_per_minute() {
    let db = TestDatabase::create_unique().await.unwrap();
    let service = MessageService::new(Arc::new(connect(&db).await));

    let t = Utc::now();
    service
        .create_message(&input("alice", "at work", &["atwork", "someother"]))
        .await
        .unwrap();
    service
        .create_message(&input("alice", "drifting", &["drift", "carbon"]))
        .await
        .unwrap();

    let filter = MessageFilter {
        hashtag: Some("atwork".to_string()),
        ..Default::default()
    };
    let messages = service.list_messages(&filter).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "at work");

    let filter = MessageFilter {
        from_date: Some(t - Duration::minutes(2)),
        to_date: Some(t + Duration::minutes(2)),
        aggregation: Some(Duration::minutes(1)),
        hashtag: Some("atwork".to_string()),
        ..Default::default()
    };
    let trends = service.get_trends(&filter).await.unwrap();
    assert_eq!(trends.len(), 1);
    assert_eq!(trends[0].count, 1);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_same_minute_messages_share_a_bucket() {
    let db = TestDatabase::create_unique().await.unwrap();
    let service = MessageService::new(Arc::new(connect(&db).await));

    let t = Utc::now();
    service
        .create_message(&input("alice", "one", &["burst"]))
        .await
        .unwrap();
    service
        .create_message(&input("bob", "two", &["burst"]))
        .await
        .unwrap();

    let filter = MessageFilter {
        from_date: Some(t - Duration::minutes(2)),
        to_date: Some(t + Duration::minutes(2)),
        aggregation: Some(Duration::minutes(1)),
        hashtag: Some("burst".to_string()),
        ..Default::default()
    };
    let trends = service.get_trends(&filter).await.unwrap();

    let total: u64 = trends.iter().map(|w| w.count).sum();
    assert_eq!(total, 2);

    db.drop_database().await.unwrap();
}
