// SPDX-License-Identifier: MIT

use super::*;
use yare::parameterized;

#[parameterized(
    backlog = { PrimaryStatus::Backlog, BoardStatus::Todo },
    todo = { PrimaryStatus::Todo, BoardStatus::Todo },
    in_progress = { PrimaryStatus::InProgress, BoardStatus::InProgress },
    done = { PrimaryStatus::Done, BoardStatus::Done },
    cancelled = { PrimaryStatus::Cancelled, BoardStatus::Cancelled },
)]
fn primary_to_board_is_total(primary: PrimaryStatus, board: BoardStatus) {
    assert_eq!(map_primary_to_board(primary), board);
}

#[test]
fn board_todo_preserves_backlog_fallback() {
    assert_eq!(map_board_to_primary(BoardStatus::Todo, PrimaryStatus::Backlog), PrimaryStatus::Backlog);
    assert_eq!(map_board_to_primary(BoardStatus::Todo, PrimaryStatus::Todo), PrimaryStatus::Todo);
}

#[test]
fn board_todo_falls_back_to_primary_todo_when_fallback_is_not_backlog_family() {
    assert_eq!(map_board_to_primary(BoardStatus::Todo, PrimaryStatus::Done), PrimaryStatus::Todo);
    assert_eq!(map_board_to_primary(BoardStatus::Todo, PrimaryStatus::InProgress), PrimaryStatus::Todo);
}

#[test]
fn board_in_review_collapses_to_in_progress() {
    assert_eq!(map_board_to_primary(BoardStatus::InReview, PrimaryStatus::Backlog), PrimaryStatus::InProgress);
    assert_eq!(map_board_to_primary(BoardStatus::InProgress, PrimaryStatus::Backlog), PrimaryStatus::InProgress);
}

#[test]
fn board_to_primary_terminal_states_ignore_fallback() {
    assert_eq!(map_board_to_primary(BoardStatus::Done, PrimaryStatus::Backlog), PrimaryStatus::Done);
    assert_eq!(map_board_to_primary(BoardStatus::Cancelled, PrimaryStatus::InProgress), PrimaryStatus::Cancelled);
}

#[test]
fn primary_to_local_is_open_until_terminal() {
    assert_eq!(map_primary_to_local(PrimaryStatus::Backlog), LocalStatus::Open);
    assert_eq!(map_primary_to_local(PrimaryStatus::Todo), LocalStatus::Open);
    assert_eq!(map_primary_to_local(PrimaryStatus::InProgress), LocalStatus::Open);
    assert_eq!(map_primary_to_local(PrimaryStatus::Done), LocalStatus::Closed);
    assert_eq!(map_primary_to_local(PrimaryStatus::Cancelled), LocalStatus::Closed);
}

#[test]
fn local_closed_maps_to_done_by_default() {
    assert_eq!(map_local_to_primary(LocalStatus::Closed, PrimaryStatus::InProgress), PrimaryStatus::Done);
}

#[test]
fn local_closed_preserves_cancelled() {
    assert_eq!(map_local_to_primary(LocalStatus::Closed, PrimaryStatus::Cancelled), PrimaryStatus::Cancelled);
}

#[test]
fn local_open_reopens_a_closed_primary_issue_as_in_progress() {
    assert_eq!(map_local_to_primary(LocalStatus::Open, PrimaryStatus::Done), PrimaryStatus::InProgress);
    assert_eq!(map_local_to_primary(LocalStatus::Open, PrimaryStatus::Cancelled), PrimaryStatus::InProgress);
}

#[test]
fn local_open_does_not_disturb_an_already_open_primary_issue() {
    assert_eq!(map_local_to_primary(LocalStatus::Open, PrimaryStatus::Backlog), PrimaryStatus::Backlog);
    assert_eq!(map_local_to_primary(LocalStatus::Open, PrimaryStatus::Todo), PrimaryStatus::Todo);
    assert_eq!(map_local_to_primary(LocalStatus::Open, PrimaryStatus::InProgress), PrimaryStatus::InProgress);
}

#[parameterized(
    no_priority = { Priority::NoPriority, 1 },
    low = { Priority::Low, 2 },
    medium = { Priority::Medium, 3 },
    high = { Priority::High, 4 },
    urgent = { Priority::Urgent, 5 },
)]
fn priority_to_local_round_trips(priority: Priority, local: u8) {
    assert_eq!(map_priority_to_local(priority), local);
    assert_eq!(map_priority_from_local(local), Ok(priority));
}

#[test]
fn priority_from_local_rejects_out_of_range_values() {
    assert_eq!(
        map_priority_from_local(0),
        Err(MapError { axis: MapAxis::Priority, value: "0".to_string(), source_backend: "local" })
    );
    assert_eq!(
        map_priority_from_local(6),
        Err(MapError { axis: MapAxis::Priority, value: "6".to_string(), source_backend: "local" })
    );
}

#[test]
fn type_mapping_is_identity_for_known_values() {
    assert_eq!(map_type("bug", "board"), Ok(IssueType::Bug));
    assert_eq!(map_type("epic", "local"), Ok(IssueType::Epic));
}

#[test]
fn type_mapping_rejects_unknown_values() {
    assert_eq!(
        map_type("quux", "board"),
        Err(MapError { axis: MapAxis::Type, value: "quux".to_string(), source_backend: "board" })
    );
}
