// SPDX-License-Identifier: MIT

//! The `Project` entity — identity in Primary is authoritative.

use serde::{Deserialize, Serialize};

/// A synchronized project, joined across Primary, Board, and Local by `identifier`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Stable short code, primary key. Unique across the store.
    pub identifier: String,
    pub name: String,
    /// Primary's internal project id. Never changes once set.
    pub primary_id: String,
    /// Board's internal project id. Set at most once, then reused.
    pub board_id: Option<String>,
    /// Path to a checkout hosting a Local store, if any.
    pub filesystem_path: Option<String>,
    /// Opaque id of a provisioned PM assistant, if any (see sidecar in `triad-engine`).
    pub agent_id: Option<String>,
    /// Epoch ms of the last completed sync cycle that touched this project.
    pub last_sync_at: Option<i64>,
    /// Epoch ms this project was last observed in a Primary project listing.
    pub last_checked_at: Option<i64>,
}

impl Project {
    pub fn new(identifier: impl Into<String>, name: impl Into<String>, primary_id: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            primary_id: primary_id.into(),
            board_id: None,
            filesystem_path: None,
            agent_id: None,
            last_sync_at: None,
            last_checked_at: None,
        }
    }

    pub fn has_local_store(&self) -> bool {
        self.filesystem_path.is_some()
    }
}
