// SPDX-License-Identifier: MIT

//! The `Issue` entity — composite identity `(project_identifier, identifier)`.

use crate::status::PrimaryStatus;
use serde::{Deserialize, Serialize};

/// A synchronized issue. `identifier` is the Primary-assigned short code (e.g. `"ABC-42"`).
///
/// Invariants (enforced by `triad-storage`, not by this type):
/// - once `board_task_id` is assigned it is never replaced, only cleared on explicit reset
/// - `primary_modified_at` is monotonic non-decreasing across successful upserts
/// - `board_status` reflects the last value *observed*, not written — the baseline for
///   change detection in Phase 1/2
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub project_identifier: String,
    pub identifier: String,
    pub title: String,
    /// Canonical Primary status.
    pub status: PrimaryStatus,
    /// Last observed Board status, as a wire string (see `triad_core::status::BoardStatus`).
    pub board_status: Option<String>,
    pub local_id: Option<String>,
    /// Last observed Local status, as a wire string (see `triad_core::status::LocalStatus`).
    pub local_status: Option<String>,
    pub board_task_id: Option<String>,
    pub primary_modified_at: i64,
    pub board_modified_at: Option<i64>,
    pub last_sync_at: Option<i64>,
}

impl Issue {
    pub fn new(project_identifier: impl Into<String>, identifier: impl Into<String>, title: impl Into<String>, status: PrimaryStatus, primary_modified_at: i64) -> Self {
        Self {
            project_identifier: project_identifier.into(),
            identifier: identifier.into(),
            title: title.into(),
            status,
            board_status: None,
            local_id: None,
            local_status: None,
            board_task_id: None,
            primary_modified_at,
            board_modified_at: None,
            last_sync_at: None,
        }
    }
}
