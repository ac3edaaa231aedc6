// SPDX-License-Identifier: MIT

use super::*;
use yare::parameterized;

#[parameterized(
    backlog = { PrimaryStatus::Backlog, "Backlog" },
    todo = { PrimaryStatus::Todo, "Todo" },
    in_progress = { PrimaryStatus::InProgress, "InProgress" },
    done = { PrimaryStatus::Done, "Done" },
    cancelled = { PrimaryStatus::Cancelled, "Cancelled" },
)]
fn primary_status_round_trips_through_its_wire_string(status: PrimaryStatus, wire: &str) {
    assert_eq!(status.as_str(), wire);
    assert_eq!(PrimaryStatus::parse(wire), Some(status));
}

#[test]
fn primary_status_rejects_unknown_value() {
    assert_eq!(PrimaryStatus::parse("bogus"), None);
}

#[test]
fn primary_status_is_closed_only_for_done_and_cancelled() {
    assert!(!PrimaryStatus::Backlog.is_closed());
    assert!(!PrimaryStatus::Todo.is_closed());
    assert!(!PrimaryStatus::InProgress.is_closed());
    assert!(PrimaryStatus::Done.is_closed());
    assert!(PrimaryStatus::Cancelled.is_closed());
}

#[parameterized(
    todo = { BoardStatus::Todo, "todo" },
    in_progress = { BoardStatus::InProgress, "inprogress" },
    in_review = { BoardStatus::InReview, "inreview" },
    done = { BoardStatus::Done, "done" },
    cancelled = { BoardStatus::Cancelled, "cancelled" },
)]
fn board_status_round_trips_through_its_wire_string(status: BoardStatus, wire: &str) {
    assert_eq!(status.as_str(), wire);
    assert_eq!(BoardStatus::parse(wire), Some(status));
}

#[test]
fn local_status_round_trips() {
    assert_eq!(LocalStatus::parse("open"), Some(LocalStatus::Open));
    assert_eq!(LocalStatus::parse("closed"), Some(LocalStatus::Closed));
    assert_eq!(LocalStatus::parse("bogus"), None);
}

#[test]
fn priority_ordering_is_ascending_with_urgency() {
    assert!(Priority::NoPriority < Priority::Low);
    assert!(Priority::Low < Priority::Medium);
    assert!(Priority::Medium < Priority::High);
    assert!(Priority::High < Priority::Urgent);
}

#[test]
fn issue_type_round_trips() {
    for (t, wire) in [
        (IssueType::Task, "task"),
        (IssueType::Bug, "bug"),
        (IssueType::Feature, "feature"),
        (IssueType::Epic, "epic"),
        (IssueType::Chore, "chore"),
    ] {
        assert_eq!(t.as_str(), wire);
        assert_eq!(IssueType::parse(wire), Some(t));
    }
}
