//! Integration tests for the statement service over the in-memory store

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;

use xapi_lrs::service::{PageQuery, ServiceError, StatementService};
use xapi_lrs::store::MemoryStore;
use xapi_lrs::types::{Actor, FilterCriteria, Statement, StatementObject, Verb};
use xapi_lrs::utils::parse_instant;
use xapi_lrs::validation::{decode_batch, ValidationError};

fn setup_service() -> Arc<StatementService> {
    Arc::new(StatementService::with_store(Arc::new(MemoryStore::new())))
}

fn statement(mbox: &str, activity: &str) -> Statement {
    Statement::new(
        Actor::mbox(mbox),
        Verb::new("http://adlnet.gov/expapi/verbs/answered"),
        StatementObject::activity(activity),
    )
}

async fn collect_all(service: &StatementService, criteria: &FilterCriteria, limit: usize) -> Vec<Statement> {
    let mut page = PageQuery { limit: Some(limit), more: None };
    let mut all = Vec::new();
    loop {
        let result = service.get_statements(criteria, &page).await.unwrap();
        assert!(result.len() <= limit);
        all.extend(result.statements);
        match result.more {
            Some(more) => page.more = Some(more),
            None => return all,
        }
    }
}

#[tokio::test]
async fn test_post_and_get_round_trip() {
    let service = setup_service();
    let submitted = statement("mailto:alice@example.org", "http://example.org/quiz/1")
        .with_timestamp("2024-03-01T09:30:00+02:00")
        .with_result(json!({"success": true, "score": {"scaled": 0.9}}))
        .with_context(json!({"registration": "ec531277-b57b-4c15-8d91-d292c5b2b8f7"}));

    let ids = service.post_statement(submitted.clone()).await.unwrap();
    let stored = service.get_statement(&ids[0]).await.unwrap();

    assert_eq!(stored.actor, submitted.actor);
    assert_eq!(stored.verb, submitted.verb);
    assert_eq!(stored.object, submitted.object);
    assert_eq!(stored.result, submitted.result);
    assert_eq!(stored.context, submitted.context);
    assert_eq!(stored.timestamp, submitted.timestamp);
    assert_eq!(stored.key(), Some(ids[0].as_str()));
}

#[tokio::test]
async fn test_batch_ids_in_submission_order() {
    let service = setup_service();
    let batch = vec![
        statement("mailto:a@example.org", "http://example.org/1")
            .with_id("00000000-0000-4000-8000-000000000003"),
        statement("mailto:a@example.org", "http://example.org/2"),
        statement("mailto:a@example.org", "http://example.org/3")
            .with_id("00000000-0000-4000-8000-000000000001"),
    ];

    let ids = service.post_statements(batch).await.unwrap();
    assert_eq!(ids.len(), 3);
    assert_eq!(ids[0], "00000000-0000-4000-8000-000000000003");
    assert_eq!(ids[2], "00000000-0000-4000-8000-000000000001");

    let activities: Vec<_> = collect_all(&service, &FilterCriteria::new(), 10)
        .await
        .into_iter()
        .filter_map(|s| s.object.activity_id().map(str::to_owned))
        .collect();
    assert_eq!(
        activities,
        vec!["http://example.org/1", "http://example.org/2", "http://example.org/3"]
    );
}

#[tokio::test]
async fn test_duplicate_within_batch_stores_nothing() {
    let service = setup_service();
    let id = "9a3e1f2b-1111-4c2d-8e3f-5a6b7c8d9e0f";
    let result = service
        .post_statements(vec![
            statement("mailto:a@example.org", "http://example.org/1").with_id(id),
            statement("mailto:b@example.org", "http://example.org/2").with_id(id.to_uppercase()),
        ])
        .await;

    assert!(matches!(
        result,
        Err(ServiceError::Validation(ValidationError::DuplicateId { .. }))
    ));
    assert_eq!(service.store().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_resubmission_without_id_is_new_record() {
    let service = setup_service();
    let submitted = statement("mailto:a@example.org", "http://example.org/1");

    let first = service.post_statement(submitted.clone()).await.unwrap();
    let second = service.post_statement(submitted).await.unwrap();

    assert_ne!(first, second);
    assert_eq!(service.store().count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_resubmitted_id_conflicts() {
    let service = setup_service();
    let first = statement("mailto:a@example.org", "http://example.org/1");
    let ids = service.post_statement(first.clone()).await.unwrap();

    let err = service
        .post_statement(statement("mailto:b@example.org", "http://example.org/2").with_id(ids[0].clone()))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(ref id) if *id == ids[0]));

    let kept = service.get_statement(&ids[0]).await.unwrap();
    assert_eq!(kept.actor, first.actor);
}

#[tokio::test]
async fn test_filters_combine_with_and() {
    let service = setup_service();
    let (a1, a2) = ("mailto:a1@example.org", "mailto:a2@example.org");
    let (x1, x2) = ("http://example.org/x1", "http://example.org/x2");
    service
        .post_statements(vec![
            statement(a1, x1),
            statement(a1, x2),
            statement(a2, x1),
            statement(a2, x2),
        ])
        .await
        .unwrap();

    let actor_only = collect_all(&service, &FilterCriteria::new().actor(a1), 10).await;
    assert_eq!(actor_only.len(), 2);
    assert!(actor_only
        .iter()
        .all(|s| s.actor.canonical_id().as_deref() == Some(a1)));

    let both = collect_all(&service, &FilterCriteria::new().actor(a1).activity(x2), 10).await;
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].object.activity_id(), Some(x2));
    assert_eq!(both[0].actor.canonical_id().as_deref(), Some(a1));

    let activity_only = collect_all(&service, &FilterCriteria::new().activity(x1), 10).await;
    assert_eq!(activity_only.len(), 2);

    assert_eq!(collect_all(&service, &FilterCriteria::new(), 10).await.len(), 4);

    let nobody = FilterCriteria::new().actor("mailto:nobody@example.org");
    let empty = service.get_statements(&nobody, &PageQuery::default()).await.unwrap();
    assert!(empty.is_empty());
    assert!(!empty.has_more());
}

#[tokio::test]
async fn test_paging_visits_every_match_once() {
    let service = setup_service();
    for i in 0..23 {
        let mbox = if i % 3 == 0 { "mailto:b@example.org" } else { "mailto:a@example.org" };
        service
            .post_statement(statement(mbox, &format!("http://example.org/{}", i)))
            .await
            .unwrap();
    }

    let criteria = FilterCriteria::new().actor("mailto:a@example.org");
    let all = collect_all(&service, &criteria, 4).await;
    assert_eq!(all.len(), 15);

    let ids: HashSet<_> = all.iter().filter_map(|s| s.key()).collect();
    assert_eq!(ids.len(), 15);

    let stored: Vec<_> = all
        .iter()
        .filter_map(|s| s.stored.as_deref().and_then(parse_instant))
        .collect();
    assert!(stored.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_account_and_shorthand_actors() {
    let service = setup_service();
    let body = json!([
        {
            "actor": {"account": {"homePage": "https://lms.example.org", "name": "u-42"}},
            "verb": {"id": "http://adlnet.gov/expapi/verbs/launched"},
            "object": {"id": "http://example.org/course"}
        },
        {
            "actor": "mailto:short@example.org",
            "verb": "http://adlnet.gov/expapi/verbs/launched",
            "object": "http://example.org/course"
        }
    ]);
    service.post_statements(decode_batch(body).unwrap()).await.unwrap();

    let account = FilterCriteria::new().actor("https://lms.example.org|u-42");
    assert_eq!(collect_all(&service, &account, 10).await.len(), 1);

    let shorthand = FilterCriteria::new().actor("mailto:short@example.org");
    let found = collect_all(&service, &shorthand, 10).await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].object.activity_id(), Some("http://example.org/course"));
}

#[tokio::test]
async fn test_concurrent_posts() {
    let service = setup_service();
    let mut handles = Vec::new();
    for task in 0..8 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            let mut ids = Vec::new();
            for i in 0..25 {
                let activity = format!("http://example.org/{}/{}", task, i);
                ids.extend(
                    service
                        .post_statement(statement("mailto:a@example.org", &activity))
                        .await
                        .unwrap(),
                );
            }
            ids
        }));
    }

    let mut ids = HashSet::new();
    for result in futures::future::join_all(handles).await {
        ids.extend(result.unwrap());
    }
    assert_eq!(ids.len(), 200);
    assert_eq!(service.store().count().await.unwrap(), 200);

    let all = collect_all(&service, &FilterCriteria::new(), 1000).await;
    let stored: HashSet<_> = all.iter().filter_map(|s| s.stored.clone()).collect();
    assert_eq!(stored.len(), 200);
}
