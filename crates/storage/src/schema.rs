// SPDX-License-Identifier: MIT

//! Schema DDL and versioned migrations, applied via `PRAGMA user_version`.
//!
//! Each migration is idempotent and the current schema version is the single source
//! of truth for what has been applied — re-running `migrate` against an up-to-date
//! database is a no-op.

use rusqlite::Connection;

use crate::error::Result;

pub const CURRENT_VERSION: i64 = 1;

const V1_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS projects (
    identifier TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    primary_id TEXT NOT NULL,
    board_id TEXT,
    filesystem_path TEXT,
    agent_id TEXT,
    last_sync_at INTEGER,
    last_checked_at INTEGER
);

CREATE TABLE IF NOT EXISTS issues (
    project_identifier TEXT NOT NULL,
    identifier TEXT NOT NULL,
    title TEXT NOT NULL,
    status TEXT NOT NULL,
    board_status TEXT,
    local_id TEXT,
    local_status TEXT,
    board_task_id TEXT,
    primary_modified_at INTEGER NOT NULL,
    board_modified_at INTEGER,
    last_sync_at INTEGER,
    PRIMARY KEY (project_identifier, identifier),
    FOREIGN KEY (project_identifier) REFERENCES projects(identifier)
);

CREATE TABLE IF NOT EXISTS sync_metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_issues_board_task_id ON issues(board_task_id);
CREATE INDEX IF NOT EXISTS idx_issues_local_id ON issues(local_id);
CREATE INDEX IF NOT EXISTS idx_issues_primary_modified_at ON issues(primary_modified_at);
CREATE INDEX IF NOT EXISTS idx_projects_primary_id ON projects(primary_id);
"#;

/// Bring a freshly-opened connection up to [`CURRENT_VERSION`]. Safe to call on every
/// startup: a database already at the current version runs no DDL.
pub fn migrate(conn: &Connection) -> Result<()> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if version < 1 {
        conn.execute_batch(V1_SCHEMA)?;
    }

    if version < CURRENT_VERSION {
        conn.pragma_update(None, "user_version", CURRENT_VERSION)?;
    }

    Ok(())
}
