// SPDX-License-Identifier: MIT

use super::*;
use tempfile::tempdir;

#[test]
fn has_local_store_requires_marker_directory() {
    let dir = tempdir().unwrap();
    assert!(!has_local_store(dir.path()));

    std::fs::create_dir(dir.path().join(LOCAL_STORE_MARKER)).unwrap();
    assert!(has_local_store(dir.path()));
}

#[test]
fn classify_cli_failure_recognizes_connection_phrasing_as_transient() {
    assert!(matches!(classify_cli_failure("connection refused"), AdapterError::Transient(_)));
    assert!(matches!(classify_cli_failure("request timeout after 30s"), AdapterError::Transient(_)));
    assert!(matches!(classify_cli_failure("unknown flag --bogus"), AdapterError::Malformed(_)));
}

#[tokio::test]
async fn fake_adapter_close_then_reopen_round_trips_status() {
    let fake = FakeLocalAdapter::new();
    fake.seed_issue(LocalIssue { id: "local-1".into(), identifier: Some("ENG-1".into()), title: "Fix it".into(), status: "open".into(), issue_type: Some("task".into()), priority: Some(3) });

    fake.close_issue(std::path::Path::new("/tmp"), "local-1").await.unwrap();
    assert_eq!(fake.closed_calls(), vec!["local-1".to_string()]);

    fake.reopen_issue(std::path::Path::new("/tmp"), "local-1").await.unwrap();
    assert_eq!(fake.reopened_calls(), vec!["local-1".to_string()]);
}

#[tokio::test]
async fn fake_adapter_close_of_unknown_issue_is_not_found() {
    let fake = FakeLocalAdapter::new();
    let err = fake.close_issue(std::path::Path::new("/tmp"), "missing").await.unwrap_err();
    assert!(matches!(err, AdapterError::NotFound(_)));
}

#[tokio::test]
async fn cli_adapter_is_a_no_op_without_the_marker_directory() {
    let dir = tempdir().unwrap();
    let adapter = CliLocalAdapter::new("bd");

    let issues = adapter.list_issues(dir.path()).await.unwrap();
    assert!(issues.is_empty());

    adapter.close_issue(dir.path(), "whatever").await.unwrap();
    adapter.reopen_issue(dir.path(), "whatever").await.unwrap();
}
