//! Integration tests for job persistence, the cursor store and system
//! parameters.
//!
//! These tests require the `sqlite` and `migrate` features to be enabled
//! and use an in-memory SQLite database.

#![cfg(all(feature = "sqlite", feature = "migrate"))]

use chrono::{TimeZone, Utc};
use jobfeed::connect_and_migrate;
use jobfeed::entity::{job_category, job_contact, job_occupation};
use jobfeed::feed::{DetailRecord, FeedMetadata};
use jobfeed::repository::{
    self, CursorUpdate, clear_cursor, count_jobs, find_job, find_locations, get_parameter,
    read_cursor, save_job, set_parameter, write_cursor,
};
use jobfeed::sync::normalize;
use jobfeed::{FeedCursor, SystemParameter};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::{Value, json};

/// Create an in-memory SQLite database with migrations applied.
async fn setup_test_db() -> DatabaseConnection {
    connect_and_migrate("sqlite::memory:")
        .await
        .expect("Failed to create test database")
}

fn detail(id: &str, title: &str, locations: Value) -> DetailRecord {
    serde_json::from_value(json!({
        "uuid": id,
        "status": "ACTIVE",
        "sistEndret": "2025-03-04T10:15:00",
        "ad_content": {
            "title": title,
            "employer": {"name": "Nav IT", "orgnr": "889640782"},
            "published": "2025-03-03T08:00:00Z",
            "applicationDue": "Snarest",
            "positioncount": "2",
            "workLocations": locations,
            "contactList": [
                {"name": "Kari", "email": "kari@example.no"},
                {"name": "Kari", "email": "kari@example.no"}
            ],
            "categoryList": [
                {"categoryType": "STYRK08", "code": "2512", "name": "Programvareutviklere"},
                {"categoryType": "STYRK08", "code": "2512", "name": "Programvareutviklere"}
            ],
            "occupationCategories": [
                {"level1": "IT", "level2": "Utvikling"}
            ]
        }
    }))
    .expect("valid detail record")
}

fn oslo() -> Value {
    json!({"address": "Fyrstikkalléen 1", "city": "OSLO", "postalCode": "0661", "country": "NORGE", "municipal": "OSLO", "county": "OSLO"})
}

fn bergen() -> Value {
    json!({"city": "BERGEN", "postalCode": "5003", "country": "NORGE", "municipal": "BERGEN", "county": "VESTLAND"})
}

async fn count_children(db: &DatabaseConnection, id: &str) -> (usize, u64, u64, u64) {
    let locations = find_locations(db, id).await.unwrap().len();
    let contacts = job_contact::Entity::find()
        .filter(job_contact::Column::JobId.eq(id))
        .count(db)
        .await
        .unwrap();
    let categories = job_category::Entity::find()
        .filter(job_category::Column::JobId.eq(id))
        .count(db)
        .await
        .unwrap();
    let occupations = job_occupation::Entity::find()
        .filter(job_occupation::Column::JobId.eq(id))
        .count(db)
        .await
        .unwrap();
    (locations, contacts, categories, occupations)
}

// ─── Jobs ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_save_job_persists_parent_and_children() {
    let db = setup_test_db().await;
    let record = detail("job-a", "Utvikler", json!([oslo(), oslo()]));

    save_job(&db, &normalize(&record).unwrap()).await.unwrap();

    let job = find_job(&db, "job-a").await.unwrap().expect("job stored");
    assert_eq!(job.title.as_deref(), Some("Utvikler"));
    assert_eq!(job.status.as_deref(), Some("ACTIVE"));
    assert_eq!(job.employer_name.as_deref(), Some("Nav IT"));
    assert_eq!(job.municipality.as_deref(), Some("OSLO"));
    assert_eq!(job.position_count, Some(2));
    assert_eq!(job.application_due, None);
    assert_eq!(job.application_due_text.as_deref(), Some("Snarest"));

    // Identical locations collapse; contacts are kept verbatim.
    assert_eq!(count_children(&db, "job-a").await, (1, 2, 1, 1));
}

#[tokio::test]
async fn test_save_job_is_idempotent() {
    let db = setup_test_db().await;
    let job = normalize(&detail("job-a", "Utvikler", json!([oslo(), bergen()]))).unwrap();

    save_job(&db, &job).await.unwrap();
    let first = find_job(&db, "job-a").await.unwrap().unwrap();
    let first_children = count_children(&db, "job-a").await;

    save_job(&db, &job).await.unwrap();
    let second = find_job(&db, "job-a").await.unwrap().unwrap();

    assert_eq!(count_jobs(&db).await.unwrap(), 1);
    assert_eq!(count_children(&db, "job-a").await, first_children);
    assert_eq!(first.created_at, second.created_at);
    assert!(second.synced_at >= first.synced_at);
    assert_eq!(first.title, second.title);
    assert_eq!(first.published, second.published);
}

#[tokio::test]
async fn test_reingestion_replaces_children_and_overwrites_fields() {
    let db = setup_test_db().await;
    save_job(
        &db,
        &normalize(&detail("job-a", "Utvikler", json!([oslo(), bergen()]))).unwrap(),
    )
    .await
    .unwrap();

    save_job(
        &db,
        &normalize(&detail("job-a", "Seniorutvikler", json!([bergen()]))).unwrap(),
    )
    .await
    .unwrap();

    let job = find_job(&db, "job-a").await.unwrap().unwrap();
    assert_eq!(job.title.as_deref(), Some("Seniorutvikler"));
    // First location drives the denormalized place columns.
    assert_eq!(job.municipality.as_deref(), Some("BERGEN"));

    let locations = find_locations(&db, "job-a").await.unwrap();
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].postal_code.as_deref(), Some("5003"));
}

#[tokio::test]
async fn test_distinct_postal_codes_stay_distinct() {
    let db = setup_test_db().await;
    let mut other = oslo();
    other["postalCode"] = json!("0150");

    save_job(
        &db,
        &normalize(&detail("job-a", "Utvikler", json!([oslo(), other]))).unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(find_locations(&db, "job-a").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_jobs_do_not_share_children() {
    let db = setup_test_db().await;
    save_job(&db, &normalize(&detail("job-a", "A", json!([oslo()]))).unwrap())
        .await
        .unwrap();
    save_job(&db, &normalize(&detail("job-b", "B", json!([]))).unwrap())
        .await
        .unwrap();

    assert_eq!(count_jobs(&db).await.unwrap(), 2);
    assert_eq!(find_locations(&db, "job-a").await.unwrap().len(), 1);
    assert!(find_locations(&db, "job-b").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_find_job_missing() {
    let db = setup_test_db().await;
    assert!(find_job(&db, "nope").await.unwrap().is_none());
}

// ─── Cursor ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_cursor_read_empty() {
    let db = setup_test_db().await;
    assert!(read_cursor(&db).await.unwrap().is_none());
}

#[tokio::test]
async fn test_cursor_write_supersedes_previous_row() {
    let db = setup_test_db().await;
    let seen = Utc.with_ymd_and_hms(2025, 3, 4, 12, 0, 0).unwrap();

    write_cursor(&db, &CursorUpdate::new("page-1")).await.unwrap();
    write_cursor(
        &db,
        &CursorUpdate {
            next_locator: "page-2".to_string(),
            last_seen_date: Some(seen),
            metadata: FeedMetadata {
                title: Some("Arbeidsplassen".to_string()),
                feed_url: Some("https://pam-stilling-feed.nav.no/api/v1/feed".to_string()),
                ..Default::default()
            },
        },
    )
    .await
    .unwrap();

    assert_eq!(FeedCursor::find().count(&db).await.unwrap(), 1);
    let cursor = read_cursor(&db).await.unwrap().unwrap();
    assert_eq!(cursor.next_locator, "page-2");
    assert_eq!(cursor.last_seen_date, Some(seen.fixed_offset()));
    assert_eq!(cursor.title.as_deref(), Some("Arbeidsplassen"));
    assert!(cursor.home_page_url.is_none());
}

#[tokio::test]
async fn test_cursor_rejects_empty_locator() {
    let db = setup_test_db().await;
    write_cursor(&db, &CursorUpdate::new("page-1")).await.unwrap();

    let err = write_cursor(&db, &CursorUpdate::new("")).await.unwrap_err();
    assert!(matches!(err, repository::RepositoryError::InvalidInput { .. }));
    assert_eq!(
        read_cursor(&db).await.unwrap().unwrap().next_locator,
        "page-1"
    );
}

#[tokio::test]
async fn test_cursor_clear() {
    let db = setup_test_db().await;
    write_cursor(&db, &CursorUpdate::new("page-1")).await.unwrap();

    assert_eq!(clear_cursor(&db).await.unwrap(), 1);
    assert!(read_cursor(&db).await.unwrap().is_none());
    assert_eq!(clear_cursor(&db).await.unwrap(), 0);
}

// ─── System parameters ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_parameters_upsert() {
    let db = setup_test_db().await;
    assert!(get_parameter(&db, "feed_last_update").await.unwrap().is_none());

    set_parameter(&db, "feed_last_update", "2025-03-01T00:00:00+00:00")
        .await
        .unwrap();
    set_parameter(&db, "feed_last_update", "2025-03-02T00:00:00+00:00")
        .await
        .unwrap();

    assert_eq!(
        get_parameter(&db, "feed_last_update").await.unwrap().as_deref(),
        Some("2025-03-02T00:00:00+00:00")
    );
    assert_eq!(SystemParameter::find().count(&db).await.unwrap(), 1);
}
