// SPDX-License-Identifier: MIT

//! The State Store: a single-file SQLite database holding every `Project`, `Issue`,
//! and the `sync_metadata` key/value table, guarded by an exclusive [`StoreLock`] for
//! the process lifetime.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;
use triad_core::status::PrimaryStatus;
use triad_core::{Issue, Project};

use crate::error::{Result, StoreError};
use crate::lock::StoreLock;
use crate::schema;

pub struct Store {
    conn: Connection,
    _lock: StoreLock,
}

impl Store {
    /// Open (creating if absent) the store at `path`, run migrations, and acquire the
    /// exclusive process lock. A store already held by another process returns
    /// [`StoreError::Locked`].
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let lock = StoreLock::acquire(path)?;

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA journal_mode = WAL; PRAGMA locking_mode = EXCLUSIVE;")?;
        schema::migrate(&conn)?;

        debug!(path = %path.display(), "state store opened");
        Ok(Self { conn, _lock: lock })
    }

    /// In-memory store for tests. No file lock is taken.
    #[cfg(any(test, feature = "test-support"))]
    pub fn open_in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        schema::migrate(&conn)?;
        // An in-memory store has no backing file to lock; acquire a throwaway lock on a
        // unique temp path so the type stays uniform across test and production code.
        let dir = std::env::temp_dir();
        let unique = format!("triad-test-{}-{}.lock", std::process::id(), COUNTER.fetch_add(1, Ordering::Relaxed));
        let lock = StoreLock::acquire(&dir.join(unique))?;
        Ok(Self { conn, _lock: lock })
    }

    pub fn upsert_project(&self, project: &Project) -> Result<()> {
        self.conn.execute(
            "INSERT INTO projects (identifier, name, primary_id, board_id, filesystem_path, agent_id, last_sync_at, last_checked_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(identifier) DO UPDATE SET
                 name = excluded.name,
                 primary_id = COALESCE(projects.primary_id, excluded.primary_id),
                 board_id = COALESCE(excluded.board_id, projects.board_id),
                 filesystem_path = COALESCE(excluded.filesystem_path, projects.filesystem_path),
                 agent_id = COALESCE(excluded.agent_id, projects.agent_id),
                 last_sync_at = COALESCE(excluded.last_sync_at, projects.last_sync_at),
                 last_checked_at = COALESCE(excluded.last_checked_at, projects.last_checked_at)",
            params![
                project.identifier,
                project.name,
                project.primary_id,
                project.board_id,
                project.filesystem_path,
                project.agent_id,
                project.last_sync_at,
                project.last_checked_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_project(&self, identifier: &str) -> Result<Option<Project>> {
        self.conn
            .query_row(
                "SELECT identifier, name, primary_id, board_id, filesystem_path, agent_id, last_sync_at, last_checked_at
                 FROM projects WHERE identifier = ?1",
                params![identifier],
                row_to_project,
            )
            .optional()
            .map_err(StoreError::from)
    }

    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let mut stmt = self.conn.prepare(
            "SELECT identifier, name, primary_id, board_id, filesystem_path, agent_id, last_sync_at, last_checked_at
             FROM projects ORDER BY identifier",
        )?;
        let rows = stmt.query_map([], row_to_project)?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(StoreError::from)
    }

    pub fn upsert_issue(&self, issue: &Issue) -> Result<()> {
        self.conn.execute(
            "INSERT INTO issues (project_identifier, identifier, title, status, board_status, local_id, local_status, board_task_id, primary_modified_at, board_modified_at, last_sync_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(project_identifier, identifier) DO UPDATE SET
                 title = excluded.title,
                 status = excluded.status,
                 board_status = COALESCE(excluded.board_status, issues.board_status),
                 local_id = COALESCE(excluded.local_id, issues.local_id),
                 local_status = COALESCE(excluded.local_status, issues.local_status),
                 board_task_id = COALESCE(issues.board_task_id, excluded.board_task_id),
                 primary_modified_at = MAX(issues.primary_modified_at, excluded.primary_modified_at),
                 board_modified_at = COALESCE(excluded.board_modified_at, issues.board_modified_at),
                 last_sync_at = COALESCE(excluded.last_sync_at, issues.last_sync_at)",
            params![
                issue.project_identifier,
                issue.identifier,
                issue.title,
                issue.status.as_str(),
                issue.board_status,
                issue.local_id,
                issue.local_status,
                issue.board_task_id,
                issue.primary_modified_at,
                issue.board_modified_at,
                issue.last_sync_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_issue(&self, project_identifier: &str, identifier: &str) -> Result<Option<Issue>> {
        self.conn
            .query_row(
                "SELECT project_identifier, identifier, title, status, board_status, local_id, local_status, board_task_id, primary_modified_at, board_modified_at, last_sync_at
                 FROM issues WHERE project_identifier = ?1 AND identifier = ?2",
                params![project_identifier, identifier],
                row_to_issue,
            )
            .optional()
            .map_err(StoreError::from)
    }

    pub fn list_issues_for_project(&self, project_identifier: &str) -> Result<Vec<Issue>> {
        let mut stmt = self.conn.prepare(
            "SELECT project_identifier, identifier, title, status, board_status, local_id, local_status, board_task_id, primary_modified_at, board_modified_at, last_sync_at
             FROM issues WHERE project_identifier = ?1 ORDER BY identifier",
        )?;
        let rows = stmt.query_map(params![project_identifier], row_to_issue)?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(StoreError::from)
    }

    /// Null out `board_task_id`/`board_status` for one project, or for every project when
    /// `project_identifier` is `None` — used to force Phase 1 to recreate Board tasks
    /// after a Board-side reset.
    pub fn clear_board_mappings(&self, project_identifier: Option<&str>) -> Result<()> {
        match project_identifier {
            Some(id) => {
                self.conn.execute(
                    "UPDATE issues SET board_task_id = NULL, board_status = NULL WHERE project_identifier = ?1",
                    params![id],
                )?;
            }
            None => {
                self.conn.execute("UPDATE issues SET board_task_id = NULL, board_status = NULL", [])?;
            }
        }
        Ok(())
    }

    /// Reset every mapping field (`board_*`, `local_*`) across all issues while
    /// preserving identity (`project_identifier`, `identifier`, `title`, `status`).
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute(
            "UPDATE issues SET board_task_id = NULL, board_status = NULL, board_modified_at = NULL, local_id = NULL, local_status = NULL, last_sync_at = NULL",
            [],
        )?;
        Ok(())
    }

    pub fn get_metadata(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM sync_metadata WHERE key = ?1", params![key], |row| row.get(0))
            .optional()
            .map_err(StoreError::from)
    }

    pub fn set_metadata(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sync_metadata (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

fn row_to_project(row: &rusqlite::Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        identifier: row.get(0)?,
        name: row.get(1)?,
        primary_id: row.get(2)?,
        board_id: row.get(3)?,
        filesystem_path: row.get(4)?,
        agent_id: row.get(5)?,
        last_sync_at: row.get(6)?,
        last_checked_at: row.get(7)?,
    })
}

fn row_to_issue(row: &rusqlite::Row<'_>) -> rusqlite::Result<Issue> {
    let status_str: String = row.get(3)?;
    let status = PrimaryStatus::parse(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("invalid status {status_str:?} in issues row").into(),
        )
    })?;

    Ok(Issue {
        project_identifier: row.get(0)?,
        identifier: row.get(1)?,
        title: row.get(2)?,
        status,
        board_status: row.get(4)?,
        local_id: row.get(5)?,
        local_status: row.get(6)?,
        board_task_id: row.get(7)?,
        primary_modified_at: row.get(8)?,
        board_modified_at: row.get(9)?,
        last_sync_at: row.get(10)?,
    })
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
