// SPDX-License-Identifier: MIT

use super::*;
use triad_core::status::PrimaryStatus;

fn sample_project() -> Project {
    Project::new("ENG", "Engineering", "primary-1")
}

fn sample_issue() -> Issue {
    Issue::new("ENG", "ENG-1", "Fix the thing", PrimaryStatus::Todo, 1_000)
}

#[test]
fn upsert_and_get_project_round_trips() {
    let store = Store::open_in_memory().unwrap();
    store.upsert_project(&sample_project()).unwrap();
    let fetched = store.get_project("ENG").unwrap().unwrap();
    assert_eq!(fetched.identifier, "ENG");
    assert_eq!(fetched.primary_id, "primary-1");
}

#[test]
fn upsert_project_preserves_primary_id_once_set() {
    let store = Store::open_in_memory().unwrap();
    store.upsert_project(&sample_project()).unwrap();

    let mut updated = sample_project();
    updated.primary_id = "different-id".to_string();
    store.upsert_project(&updated).unwrap();

    let fetched = store.get_project("ENG").unwrap().unwrap();
    assert_eq!(fetched.primary_id, "primary-1");
}

#[test]
fn upsert_project_coalesces_optional_fields() {
    let store = Store::open_in_memory().unwrap();
    let mut p = sample_project();
    p.board_id = Some("board-1".to_string());
    store.upsert_project(&p).unwrap();

    let mut without_board = sample_project();
    without_board.board_id = None;
    store.upsert_project(&without_board).unwrap();

    let fetched = store.get_project("ENG").unwrap().unwrap();
    assert_eq!(fetched.board_id, Some("board-1".to_string()));
}

#[test]
fn get_project_returns_none_for_unknown_identifier() {
    let store = Store::open_in_memory().unwrap();
    assert!(store.get_project("MISSING").unwrap().is_none());
}

#[test]
fn list_projects_is_sorted_by_identifier() {
    let store = Store::open_in_memory().unwrap();
    store.upsert_project(&Project::new("ZOO", "Zoo", "p-z")).unwrap();
    store.upsert_project(&Project::new("ENG", "Engineering", "p-e")).unwrap();
    let projects = store.list_projects().unwrap();
    assert_eq!(projects.iter().map(|p| p.identifier.as_str()).collect::<Vec<_>>(), vec!["ENG", "ZOO"]);
}

#[test]
fn upsert_and_get_issue_round_trips() {
    let store = Store::open_in_memory().unwrap();
    store.upsert_project(&sample_project()).unwrap();
    store.upsert_issue(&sample_issue()).unwrap();

    let fetched = store.get_issue("ENG", "ENG-1").unwrap().unwrap();
    assert_eq!(fetched.title, "Fix the thing");
    assert_eq!(fetched.status, PrimaryStatus::Todo);
}

#[test]
fn upsert_issue_never_replaces_an_assigned_board_task_id() {
    let store = Store::open_in_memory().unwrap();
    store.upsert_project(&sample_project()).unwrap();

    let mut first = sample_issue();
    first.board_task_id = Some("board-task-1".to_string());
    store.upsert_issue(&first).unwrap();

    let mut second = sample_issue();
    second.board_task_id = Some("board-task-2".to_string());
    store.upsert_issue(&second).unwrap();

    let fetched = store.get_issue("ENG", "ENG-1").unwrap().unwrap();
    assert_eq!(fetched.board_task_id, Some("board-task-1".to_string()));
}

#[test]
fn upsert_issue_null_timestamp_does_not_overwrite_stored_value() {
    let store = Store::open_in_memory().unwrap();
    store.upsert_project(&sample_project()).unwrap();

    let mut with_sync = sample_issue();
    with_sync.last_sync_at = Some(500);
    store.upsert_issue(&with_sync).unwrap();

    let mut without_sync = sample_issue();
    without_sync.last_sync_at = None;
    store.upsert_issue(&without_sync).unwrap();

    let fetched = store.get_issue("ENG", "ENG-1").unwrap().unwrap();
    assert_eq!(fetched.last_sync_at, Some(500));
}

#[test]
fn upsert_issue_always_overwrites_status_and_advances_primary_modified_at() {
    let store = Store::open_in_memory().unwrap();
    store.upsert_project(&sample_project()).unwrap();
    store.upsert_issue(&sample_issue()).unwrap();

    let mut updated = sample_issue();
    updated.status = PrimaryStatus::Done;
    updated.primary_modified_at = 2_000;
    store.upsert_issue(&updated).unwrap();

    let fetched = store.get_issue("ENG", "ENG-1").unwrap().unwrap();
    assert_eq!(fetched.status, PrimaryStatus::Done);
    assert_eq!(fetched.primary_modified_at, 2_000);
}

#[test]
fn upsert_issue_never_lets_primary_modified_at_go_backwards() {
    let store = Store::open_in_memory().unwrap();
    store.upsert_project(&sample_project()).unwrap();

    let mut newer = sample_issue();
    newer.primary_modified_at = 5_000;
    store.upsert_issue(&newer).unwrap();

    // A later write carrying an older timestamp (e.g. Primary's own clock running a
    // few ms behind the local clock that stamped the previous write) must not move
    // the stored value backwards.
    let mut older = sample_issue();
    older.status = PrimaryStatus::InProgress;
    older.primary_modified_at = 4_000;
    store.upsert_issue(&older).unwrap();

    let fetched = store.get_issue("ENG", "ENG-1").unwrap().unwrap();
    assert_eq!(fetched.status, PrimaryStatus::InProgress);
    assert_eq!(fetched.primary_modified_at, 5_000);
}

#[test]
fn list_issues_for_project_only_returns_that_projects_issues() {
    let store = Store::open_in_memory().unwrap();
    store.upsert_project(&sample_project()).unwrap();
    store.upsert_project(&Project::new("OTHER", "Other", "p-o")).unwrap();
    store.upsert_issue(&sample_issue()).unwrap();
    store.upsert_issue(&Issue::new("OTHER", "OTHER-1", "Unrelated", PrimaryStatus::Todo, 1)).unwrap();

    let issues = store.list_issues_for_project("ENG").unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].identifier, "ENG-1");
}

#[test]
fn clear_board_mappings_for_one_project_leaves_others_untouched() {
    let store = Store::open_in_memory().unwrap();
    store.upsert_project(&sample_project()).unwrap();
    store.upsert_project(&Project::new("OTHER", "Other", "p-o")).unwrap();

    let mut eng_issue = sample_issue();
    eng_issue.board_task_id = Some("bt-1".to_string());
    eng_issue.board_status = Some("todo".to_string());
    store.upsert_issue(&eng_issue).unwrap();

    let mut other_issue = Issue::new("OTHER", "OTHER-1", "Unrelated", PrimaryStatus::Todo, 1);
    other_issue.board_task_id = Some("bt-2".to_string());
    store.upsert_issue(&other_issue).unwrap();

    store.clear_board_mappings(Some("ENG")).unwrap();

    assert_eq!(store.get_issue("ENG", "ENG-1").unwrap().unwrap().board_task_id, None);
    assert_eq!(store.get_issue("OTHER", "OTHER-1").unwrap().unwrap().board_task_id, Some("bt-2".to_string()));
}

#[test]
fn clear_all_resets_mappings_but_preserves_identity() {
    let store = Store::open_in_memory().unwrap();
    store.upsert_project(&sample_project()).unwrap();

    let mut issue = sample_issue();
    issue.board_task_id = Some("bt-1".to_string());
    issue.local_id = Some("local-1".to_string());
    store.upsert_issue(&issue).unwrap();

    store.clear_all().unwrap();

    let fetched = store.get_issue("ENG", "ENG-1").unwrap().unwrap();
    assert_eq!(fetched.board_task_id, None);
    assert_eq!(fetched.local_id, None);
    assert_eq!(fetched.identifier, "ENG-1");
    assert_eq!(fetched.title, "Fix the thing");
}

#[test]
fn metadata_round_trips_and_overwrites() {
    let store = Store::open_in_memory().unwrap();
    assert_eq!(store.get_metadata("last_sync").unwrap(), None);

    store.set_metadata("last_sync", "1000").unwrap();
    assert_eq!(store.get_metadata("last_sync").unwrap(), Some("1000".to_string()));

    store.set_metadata("last_sync", "2000").unwrap();
    assert_eq!(store.get_metadata("last_sync").unwrap(), Some("2000".to_string()));
}

#[test]
fn opening_the_same_store_file_twice_fails_with_locked() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sync-state.db");
    let _first = Store::open(&path).unwrap();
    let second = Store::open(&path);
    assert!(matches!(second, Err(StoreError::Locked { .. })));
}
