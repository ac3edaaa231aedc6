// SPDX-License-Identifier: MIT

//! Conflict resolution between a concurrently-changed Primary and Board side.
//!
//! Board's `updated_at` is known to not always advance on a status-only edit, so
//! this treats a missing or stale Board timestamp as "unknown", not "just now" —
//! doubt resolves toward Primary, never toward Board.

/// Hysteresis window: timestamps closer together than this are treated as
/// simultaneous and resolved by the freshness guard rather than by "newer wins".
pub const HYSTERESIS_MS: i64 = 1_000;

/// Board timestamps older than this are no longer trusted as a baseline.
pub const BOARD_FRESHNESS_GUARD_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictWinner {
    Primary,
    Board,
}

/// Resolve a conflict between a Primary edit and a Board edit observed in the same
/// cycle. `now` is used to evaluate the Board freshness guard.
///
/// Rule: if both timestamps are present and differ by at least [`HYSTERESIS_MS`],
/// the newer side wins. Otherwise — close together, or Board's timestamp missing
/// or older than [`BOARD_FRESHNESS_GUARD_MS`] — Primary wins by default.
pub fn resolve(primary_modified_at: i64, board_modified_at: Option<i64>, now: i64) -> ConflictWinner {
    if let Some(board_at) = board_modified_at {
        let board_is_fresh = now.saturating_sub(board_at) < BOARD_FRESHNESS_GUARD_MS;
        if board_is_fresh {
            let delta = primary_modified_at - board_at;
            if delta.abs() >= HYSTERESIS_MS {
                return if delta > 0 { ConflictWinner::Primary } else { ConflictWinner::Board };
            }
        }
    }
    ConflictWinner::Primary
}
