// SPDX-License-Identifier: MIT

//! `SyncMetadata` — the small key/value ledger `triad-storage` persists alongside
//! projects and issues: the global `last_sync` timestamp and per-phase watermarks
//! the orchestrator uses to decide whether a phase has ever run for a project.

use serde::{Deserialize, Serialize};

/// One of the four sync phases, used to key a project's watermark row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncPhase {
    PrimaryToBoard,
    BoardToPrimary,
    PrimaryToLocal,
    LocalToPrimary,
}

impl SyncPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncPhase::PrimaryToBoard => "primary_to_board",
            SyncPhase::BoardToPrimary => "board_to_primary",
            SyncPhase::PrimaryToLocal => "primary_to_local",
            SyncPhase::LocalToPrimary => "local_to_primary",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "primary_to_board" => SyncPhase::PrimaryToBoard,
            "board_to_primary" => SyncPhase::BoardToPrimary,
            "primary_to_local" => SyncPhase::PrimaryToLocal,
            "local_to_primary" => SyncPhase::LocalToPrimary,
            _ => return None,
        })
    }
}

/// A project's per-phase watermark: the epoch ms at which that phase last completed
/// successfully for that project. `None` means the phase has never completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncWatermarks {
    pub primary_to_board: Option<i64>,
    pub board_to_primary: Option<i64>,
    pub primary_to_local: Option<i64>,
    pub local_to_primary: Option<i64>,
}

impl SyncWatermarks {
    pub fn get(&self, phase: SyncPhase) -> Option<i64> {
        match phase {
            SyncPhase::PrimaryToBoard => self.primary_to_board,
            SyncPhase::BoardToPrimary => self.board_to_primary,
            SyncPhase::PrimaryToLocal => self.primary_to_local,
            SyncPhase::LocalToPrimary => self.local_to_primary,
        }
    }

    pub fn set(&mut self, phase: SyncPhase, at: i64) {
        match phase {
            SyncPhase::PrimaryToBoard => self.primary_to_board = Some(at),
            SyncPhase::BoardToPrimary => self.board_to_primary = Some(at),
            SyncPhase::PrimaryToLocal => self.primary_to_local = Some(at),
            SyncPhase::LocalToPrimary => self.local_to_primary = Some(at),
        }
    }
}

/// Global sync metadata, one row per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncMetadata {
    /// Epoch ms of the last cycle that completed all four phases without a fatal error.
    pub last_sync: Option<i64>,
    /// Total number of cycles run since the store was created, for `triadd health`.
    pub cycle_count: u64,
}
