//! Persistence tests for the JSON-lines statement log
//!
//! Tests for durability across restarts:
//! - Statements survive reopening the log
//! - Torn writes at the tail are cut off
//! - Corrupt lines become malformed records, not lost ids

use std::fs;
use std::io::Write;
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use xapi_lrs::service::{PageQuery, ServiceError, StatementService};
use xapi_lrs::store::{JsonlStore, JsonlStoreConfig, PageRequest, StatementStore, StoreError};
use xapi_lrs::types::{Actor, FilterCriteria, Statement, StatementObject, Verb};
use xapi_lrs::utils::parse_instant;

const ID_A: &str = "3f2a9b10-6c1d-4e8f-9a7b-1c2d3e4f5a6b";
const ID_B: &str = "7c9e6679-7425-40de-944b-e07fc1f90ae7";

fn statement(mbox: &str, activity: &str) -> Statement {
    Statement::new(
        Actor::mbox(mbox),
        Verb::new("http://adlnet.gov/expapi/verbs/experienced"),
        StatementObject::activity(activity),
    )
}

fn open(dir: &TempDir) -> JsonlStore {
    JsonlStore::open(JsonlStoreConfig::new(dir.path())).unwrap()
}

#[tokio::test]
async fn test_statements_survive_reopen() {
    let dir = TempDir::new().unwrap();

    let ids = {
        let service = StatementService::with_store(Arc::new(open(&dir)));
        service
            .post_statements(vec![
                statement("mailto:a@example.org", "http://example.org/a").with_id(ID_A),
                statement("mailto:b@example.org", "http://example.org/b"),
            ])
            .await
            .unwrap()
    };
    assert_eq!(ids[0], ID_A);

    let store = open(&dir);
    assert_eq!(store.count().await.unwrap(), 2);

    let first = store.find_by_id(ID_A).await.unwrap();
    assert_eq!(first.actor.canonical_id().as_deref(), Some("mailto:a@example.org"));
    assert!(first.stored.is_some());

    let second = store.find_by_id(&ids[1]).await.unwrap();
    assert_eq!(second.object.activity_id(), Some("http://example.org/b"));
}

#[tokio::test]
async fn test_write_order_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let service = StatementService::with_store(Arc::new(open(&dir)));
        for i in 0..6 {
            service
                .post_statement(statement("mailto:a@example.org", &format!("http://example.org/{}", i)))
                .await
                .unwrap();
        }
    }

    let service = StatementService::with_store(Arc::new(open(&dir)));
    let criteria = FilterCriteria::new().actor("mailto:a@example.org");
    let mut page = PageQuery { limit: Some(4), more: None };
    let mut activities = Vec::new();
    loop {
        let result = service.get_statements(&criteria, &page).await.unwrap();
        activities.extend(
            result
                .statements
                .iter()
                .filter_map(|s| s.object.activity_id().map(str::to_owned)),
        );
        match result.more {
            Some(more) => page.more = Some(more),
            None => break,
        }
    }

    let expected: Vec<String> = (0..6).map(|i| format!("http://example.org/{}", i)).collect();
    assert_eq!(activities, expected);
}

#[tokio::test]
async fn test_conflict_is_not_written() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    store
        .save(statement("mailto:a@example.org", "http://example.org/a").with_id(ID_A))
        .await
        .unwrap();

    let err = store
        .save_all(vec![
            statement("mailto:b@example.org", "http://example.org/b").with_id(ID_B),
            statement("mailto:c@example.org", "http://example.org/c").with_id(ID_A),
        ])
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict { ref id } if id == ID_A));

    let contents = fs::read_to_string(dir.path().join("statements.jsonl")).unwrap();
    assert_eq!(contents.lines().count(), 1);
    assert!(matches!(store.find_by_id(ID_B).await, Err(StoreError::NotFound { .. })));
}

#[tokio::test]
async fn test_torn_tail_is_truncated() {
    let dir = TempDir::new().unwrap();
    {
        let store = open(&dir);
        store
            .save(statement("mailto:a@example.org", "http://example.org/a").with_id(ID_A))
            .await
            .unwrap();
    }

    let path = dir.path().join("statements.jsonl");
    let intact_len = fs::metadata(&path).unwrap().len();
    let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(br#"{"kind":"STATEMENT","record":{"id":"7c9e"#).unwrap();
    drop(file);

    let store = open(&dir);
    assert_eq!(store.count().await.unwrap(), 1);
    assert_eq!(fs::metadata(&path).unwrap().len(), intact_len);

    store
        .save(statement("mailto:b@example.org", "http://example.org/b").with_id(ID_B))
        .await
        .unwrap();
    drop(store);

    let store = open(&dir);
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_corrupt_line_reports_malformed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("statements.jsonl");
    let corrupt = json!({
        "kind": "STATEMENT",
        "record": {"id": ID_B, "actor": 42, "verb": {"id": "http://example.org/v"}}
    });
    fs::write(&path, format!("{}\nnot json at all\n", corrupt)).unwrap();

    let store = Arc::new(open(&dir));
    assert_eq!(store.count().await.unwrap(), 0);
    assert!(matches!(
        store.find_by_id(ID_B).await,
        Err(StoreError::Malformed { ref id, .. }) if id == ID_B
    ));

    let service = StatementService::with_store(store);
    assert!(matches!(
        service.get_statement(ID_B).await,
        Err(ServiceError::Malformed { .. })
    ));
    assert!(matches!(
        service.get_statement(ID_A).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_unfiltered_page_from_log() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    store
        .save_all(vec![
            statement("mailto:a@example.org", "http://example.org/a").with_id(ID_A),
            statement("mailto:b@example.org", "http://example.org/b").with_id(ID_B),
        ])
        .await
        .unwrap();

    let page = store
        .find_by_filter(&FilterCriteria::new(), PageRequest::first(1))
        .await
        .unwrap();
    assert_eq!(page.statements.len(), 1);
    assert_eq!(page.statements[0].key(), Some(ID_A));
    assert_eq!(page.next, Some(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_stored_follows_write_order_under_concurrency() {
    let dir = TempDir::new().unwrap();
    let service = Arc::new(StatementService::with_store(Arc::new(open(&dir))));

    let mut handles = Vec::new();
    for task in 0..16 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            for i in 0..20 {
                let activity = format!("http://example.org/{}/{}", task, i);
                service
                    .post_statement(statement("mailto:a@example.org", &activity))
                    .await
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let page = service
        .get_statements(&FilterCriteria::new(), &PageQuery { limit: Some(1000), more: None })
        .await
        .unwrap();
    assert_eq!(page.len(), 320);

    let stored: Vec<_> = page
        .statements
        .iter()
        .map(|s| parse_instant(s.stored.as_deref().unwrap()).unwrap())
        .collect();
    let inversions = stored.windows(2).filter(|w| w[0] >= w[1]).count();
    assert_eq!(inversions, 0);
}

#[tokio::test]
async fn test_pending_rollback_applied_on_open() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    store
        .save(statement("mailto:a@example.org", "http://example.org/a").with_id(ID_A))
        .await
        .unwrap();

    let log = store.config().statements_path();
    let marker = store.config().rollback_path();
    let committed_len = fs::metadata(&log).unwrap().len();
    store
        .save(statement("mailto:b@example.org", "http://example.org/b").with_id(ID_B))
        .await
        .unwrap();
    drop(store);

    // A batch whose failed write could not be truncated away
    fs::write(&marker, committed_len.to_string()).unwrap();

    let store = open(&dir);
    assert!(!marker.exists());
    assert_eq!(fs::metadata(&log).unwrap().len(), committed_len);
    assert_eq!(store.count().await.unwrap(), 1);
    assert!(matches!(store.find_by_id(ID_B).await, Err(StoreError::NotFound { .. })));
}
