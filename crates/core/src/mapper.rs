// SPDX-License-Identifier: MIT

//! Pure, total translation functions between Primary, Board, and Local vocabularies.
//!
//! Nothing in this module performs IO. Every function either returns a value or a
//! [`MapError`] for an unrecognized input — never a panic.

use crate::status::{BoardStatus, IssueType, LocalStatus, Priority, PrimaryStatus};
use thiserror::Error;

/// A field-mapping axis, used only to label [`MapError`] for logging with both
/// the source and target vocabularies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapAxis {
    Status,
    Priority,
    Type,
}

impl std::fmt::Display for MapAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            MapAxis::Status => "status",
            MapAxis::Priority => "priority",
            MapAxis::Type => "type",
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unrecognized {axis} value {value:?} from {source_backend}")]
pub struct MapError {
    pub axis: MapAxis,
    pub value: String,
    pub source_backend: &'static str,
}

/// Primary status → Board status. Total (every `PrimaryStatus` variant has a Board value).
pub fn map_primary_to_board(status: PrimaryStatus) -> BoardStatus {
    match status {
        PrimaryStatus::Backlog => BoardStatus::Todo,
        PrimaryStatus::Todo => BoardStatus::Todo,
        PrimaryStatus::InProgress => BoardStatus::InProgress,
        PrimaryStatus::Done => BoardStatus::Done,
        PrimaryStatus::Cancelled => BoardStatus::Cancelled,
    }
}

/// Board status → Primary status.
///
/// `InReview` maps to `InProgress`. Because `{Backlog, Todo}` and `InReview → InProgress`
/// collapse the richer Primary space into a smaller Board space, the reverse direction is
/// ambiguous for `todo`: `fallback` (the last-known Primary status) resolves it so that an
/// unchanged Board observation never forces a Primary write (no sync loop on an idle task).
pub fn map_board_to_primary(status: BoardStatus, fallback: PrimaryStatus) -> PrimaryStatus {
    match status {
        BoardStatus::Todo => {
            if matches!(fallback, PrimaryStatus::Backlog | PrimaryStatus::Todo) {
                fallback
            } else {
                PrimaryStatus::Todo
            }
        }
        BoardStatus::InProgress | BoardStatus::InReview => PrimaryStatus::InProgress,
        BoardStatus::Done => PrimaryStatus::Done,
        BoardStatus::Cancelled => PrimaryStatus::Cancelled,
    }
}

/// Primary status → Local status (coarse open/closed).
pub fn map_primary_to_local(status: PrimaryStatus) -> LocalStatus {
    match status {
        PrimaryStatus::Backlog | PrimaryStatus::Todo | PrimaryStatus::InProgress => LocalStatus::Open,
        PrimaryStatus::Done | PrimaryStatus::Cancelled => LocalStatus::Closed,
    }
}

/// Local status → Primary status.
///
/// Local is coarser than Primary, so this never demotes a richer Primary state through a
/// coarser Local observation when there is no semantic change:
/// - `Closed` → `Done`, unless the current Primary status is already `Cancelled` (preserved)
/// - `Open` → `InProgress` only if the current Primary status is a closed state; otherwise
///   the current Primary status is kept untouched (a `Todo ↔ InProgress` flip is invisible
///   to Local and must not be inferred from it)
pub fn map_local_to_primary(status: LocalStatus, current_primary: PrimaryStatus) -> PrimaryStatus {
    match status {
        LocalStatus::Closed => {
            if current_primary == PrimaryStatus::Cancelled {
                PrimaryStatus::Cancelled
            } else {
                PrimaryStatus::Done
            }
        }
        LocalStatus::Open => {
            if current_primary.is_closed() {
                PrimaryStatus::InProgress
            } else {
                current_primary
            }
        }
    }
}

/// Primary priority → Local numeric priority (1..=5, ascending with urgency).
pub fn map_priority_to_local(priority: Priority) -> u8 {
    match priority {
        Priority::NoPriority => 1,
        Priority::Low => 2,
        Priority::Medium => 3,
        Priority::High => 4,
        Priority::Urgent => 5,
    }
}

/// Local numeric priority (1..=5) → Primary priority. Out-of-range values are `malformed`.
pub fn map_priority_from_local(value: u8) -> Result<Priority, MapError> {
    Ok(match value {
        1 => Priority::NoPriority,
        2 => Priority::Low,
        3 => Priority::Medium,
        4 => Priority::High,
        5 => Priority::Urgent,
        other => {
            return Err(MapError { axis: MapAxis::Priority, value: other.to_string(), source_backend: "local" })
        }
    })
}

/// Type is identity-mapped across all three backends; this exists only to funnel
/// unrecognized wire strings through the same `MapError` path as the other axes.
pub fn map_type(value: &str, source_backend: &'static str) -> Result<IssueType, MapError> {
    IssueType::parse(value).ok_or_else(|| MapError { axis: MapAxis::Type, value: value.to_string(), source_backend })
}

#[cfg(test)]
#[path = "mapper_tests.rs"]
mod tests;
