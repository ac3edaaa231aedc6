// SPDX-License-Identifier: MIT

//! Error kinds shared across crate boundaries. Adapter- and store-specific errors live
//! in `triad-adapters` and `triad-storage` respectively and convert into these via `From`.

use thiserror::Error;

/// How an adapter call failed, classified the way the orchestrator needs to react to it:
/// transient failures back off and retry next cycle, the rest are logged and skipped for
/// the current issue/project without aborting the cycle.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Network/5xx/timeout — retry on the next cycle, no escalation.
    #[error("transient backend failure: {0}")]
    Transient(String),

    /// The remote object referenced by a stored id no longer exists.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend returned data this adapter cannot parse or map.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Authn/authz failure — not expected to resolve itself; logged loudly.
    #[error("forbidden: {0}")]
    Forbidden(String),
}

impl AdapterError {
    /// Whether the orchestrator should treat this as worth retrying next cycle rather
    /// than surfacing a warning immediately.
    pub fn is_transient(&self) -> bool {
        matches!(self, AdapterError::Transient(_))
    }
}
