// SPDX-License-Identifier: MIT

use super::*;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn adapter(base_url: String) -> HttpBoardAdapter {
    HttpBoardAdapter::new(base_url, "test-token", Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn create_task_parses_wire_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/projects/board-1/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "task-1", "identifier": null, "title": "Fix it", "status": "todo", "updated_at": null
        })))
        .mount(&server)
        .await;

    let task = adapter(server.uri()).create_task("board-1", "Fix it", "desc", "todo").await.unwrap();
    assert_eq!(task.task_id, "task-1");
    assert_eq!(task.status, "todo");
}

#[tokio::test]
async fn not_found_maps_to_not_found_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).and(path("/projects/missing/tasks")).respond_with(ResponseTemplate::new(404)).mount(&server).await;

    let err = adapter(server.uri()).list_tasks("missing").await.unwrap_err();
    assert!(matches!(err, AdapterError::NotFound(_)));
}

#[test]
fn updated_at_ms_parses_rfc3339() {
    let task = BoardTask {
        task_id: "t".into(),
        identifier: None,
        title: "x".into(),
        status: "todo".into(),
        updated_at: Some("2024-01-01T00:00:00Z".to_string()),
    };
    assert_eq!(task.updated_at_ms(), Some(1_704_067_200_000));
}

#[test]
fn updated_at_ms_is_none_when_absent_or_unparseable() {
    let absent = BoardTask { task_id: "t".into(), identifier: None, title: "x".into(), status: "todo".into(), updated_at: None };
    assert_eq!(absent.updated_at_ms(), None);

    let garbage = BoardTask { task_id: "t".into(), identifier: None, title: "x".into(), status: "todo".into(), updated_at: Some("not-a-date".into()) };
    assert_eq!(garbage.updated_at_ms(), None);
}

#[tokio::test]
async fn fake_adapter_records_status_updates_and_set_task_status_is_independent() {
    let fake = FakeBoardAdapter::new();
    fake.seed_task(BoardTask { task_id: "t-1".into(), identifier: Some("ENG-1".into()), title: "Fix it".into(), status: "todo".into(), updated_at: None });

    fake.update_task_status("t-1", "inprogress").await.unwrap();
    assert_eq!(fake.status_updates(), vec![("t-1".to_string(), "inprogress".to_string())]);

    // An external edit via set_task_status is not recorded as an orchestrator write.
    fake.set_task_status("t-1", "done", Some("2024-01-01T00:00:00Z"));
    assert_eq!(fake.status_updates().len(), 1);

    let tasks = fake.list_tasks("whatever").await.unwrap();
    assert_eq!(tasks[0].status, "done");
}
