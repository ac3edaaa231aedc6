// SPDX-License-Identifier: MIT

//! The daemon-level error type: everything that can go wrong assembling or
//! running the process, carrying enough information for `triad-cli` to pick an
//! exit code (`1` for startup errors, `2` for runtime errors).

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("state store error: {0}")]
    Store(#[from] triad_storage::StoreError),

    #[error("adapter error: {0}")]
    Adapter(#[from] triad_core::AdapterError),

    #[error("health endpoint error: {0}")]
    Health(#[from] std::io::Error),
}

impl DaemonError {
    /// Whether this failure happened before the daemon ever started running a
    /// cycle (exit code 1) as opposed to during operation (exit code 2).
    pub fn is_startup_error(&self) -> bool {
        matches!(self, DaemonError::Config(_) | DaemonError::Store(_))
    }
}
