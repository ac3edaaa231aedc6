// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store at {path} is held by another process")]
    Locked { path: String },

    #[error("corrupted row in {table}: {detail}")]
    Corrupted { table: &'static str, detail: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;
