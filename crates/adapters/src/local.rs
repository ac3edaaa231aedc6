// SPDX-License-Identifier: MIT

//! The `LocalAdapter` trait and its subprocess-backed CLI implementation.
//!
//! Local is a git-backed issue store operated entirely through a subprocess: every
//! call invokes `$LOCAL_CLI_PATH <subcmd> [args]` and parses line-delimited JSON on
//! stdout. A project with no `.local/` marker directory is not a Local project at
//! all, so every method is a no-op (not an error) when the marker is absent.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use triad_core::AdapterError;

/// The marker directory identifying a checkout as hosting a Local store.
pub const LOCAL_STORE_MARKER: &str = ".local";

/// An issue as reported by the Local CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalIssue {
    pub id: String,
    pub identifier: Option<String>,
    pub title: String,
    pub status: String,
    pub issue_type: Option<String>,
    pub priority: Option<u8>,
}

#[async_trait]
pub trait LocalAdapter: Clone + Send + Sync + 'static {
    async fn list_issues(&self, project_path: &Path) -> Result<Vec<LocalIssue>, AdapterError>;

    async fn create_issue(&self, project_path: &Path, title: &str, issue_type: &str, priority: u8) -> Result<LocalIssue, AdapterError>;

    async fn update_issue(&self, project_path: &Path, id: &str, fields: serde_json::Value) -> Result<(), AdapterError>;

    async fn close_issue(&self, project_path: &Path, id: &str) -> Result<(), AdapterError>;

    async fn reopen_issue(&self, project_path: &Path, id: &str) -> Result<(), AdapterError>;
}

/// Returns whether `project_path` exists and contains the Local store marker
/// directory. Every [`CliLocalAdapter`] method treats a "no" here as a no-op.
pub fn has_local_store(project_path: &Path) -> bool {
    project_path.join(LOCAL_STORE_MARKER).is_dir()
}

/// Spawns `$LOCAL_CLI_PATH <subcmd> [args]` per call and parses line-delimited JSON
/// on stdout. A non-zero exit is `Transient` when stderr looks like a connection or
/// timeout failure, `Malformed` otherwise.
#[derive(Clone)]
pub struct CliLocalAdapter {
    cli_path: PathBuf,
}

impl CliLocalAdapter {
    pub fn new(cli_path: impl Into<PathBuf>) -> Self {
        Self { cli_path: cli_path.into() }
    }

    async fn run(&self, project_path: &Path, args: &[&str]) -> Result<Vec<serde_json::Value>, AdapterError> {
        let output = Command::new(&self.cli_path)
            .args(args)
            .current_dir(project_path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| AdapterError::Transient(format!("spawning {}: {e}", self.cli_path.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_cli_failure(&stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(|e| AdapterError::Malformed(format!("parsing Local CLI output: {e}"))))
            .collect()
    }
}

fn classify_cli_failure(stderr: &str) -> AdapterError {
    let lower = stderr.to_lowercase();
    if lower.contains("timeout") || lower.contains("connection") || lower.contains("temporarily unavailable") {
        AdapterError::Transient(stderr.trim().to_string())
    } else {
        AdapterError::Malformed(stderr.trim().to_string())
    }
}

fn value_to_issue(v: serde_json::Value) -> Result<LocalIssue, AdapterError> {
    serde_json::from_value(v).map_err(|e| AdapterError::Malformed(format!("Local issue shape: {e}")))
}

#[async_trait]
impl LocalAdapter for CliLocalAdapter {
    async fn list_issues(&self, project_path: &Path) -> Result<Vec<LocalIssue>, AdapterError> {
        if !has_local_store(project_path) {
            return Ok(Vec::new());
        }
        let values = self.run(project_path, &["list", "--json"]).await?;
        values.into_iter().map(value_to_issue).collect()
    }

    async fn create_issue(&self, project_path: &Path, title: &str, issue_type: &str, priority: u8) -> Result<LocalIssue, AdapterError> {
        if !has_local_store(project_path) {
            return Err(AdapterError::NotFound(format!("no Local store at {}", project_path.display())));
        }
        let priority_str = priority.to_string();
        let values = self
            .run(project_path, &["create", "--title", title, "--type", issue_type, "--priority", &priority_str, "--json"])
            .await?;
        let value = values.into_iter().next().ok_or_else(|| AdapterError::Malformed("Local create produced no output".to_string()))?;
        value_to_issue(value)
    }

    async fn update_issue(&self, project_path: &Path, id: &str, fields: serde_json::Value) -> Result<(), AdapterError> {
        if !has_local_store(project_path) {
            return Ok(());
        }
        let fields_json = fields.to_string();
        self.run(project_path, &["update", id, "--fields", &fields_json, "--json"]).await?;
        Ok(())
    }

    async fn close_issue(&self, project_path: &Path, id: &str) -> Result<(), AdapterError> {
        if !has_local_store(project_path) {
            return Ok(());
        }
        self.run(project_path, &["close", id, "--json"]).await?;
        Ok(())
    }

    async fn reopen_issue(&self, project_path: &Path, id: &str) -> Result<(), AdapterError> {
        if !has_local_store(project_path) {
            return Ok(());
        }
        self.run(project_path, &["reopen", id, "--json"]).await?;
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeState {
        issues: HashMap<String, LocalIssue>,
        next_id: u64,
        closed: Vec<String>,
        reopened: Vec<String>,
        next_fails_transient: bool,
    }

    /// In-memory `LocalAdapter` for unit and property tests. Ignores the
    /// `.local/` marker check entirely — tests opt in by seeding issues directly.
    #[derive(Clone, Default)]
    pub struct FakeLocalAdapter {
        inner: Arc<Mutex<FakeState>>,
    }

    impl FakeLocalAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn seed_issue(&self, issue: LocalIssue) {
            self.inner.lock().issues.insert(issue.id.clone(), issue);
        }

        pub fn set_status(&self, id: &str, status: &str) {
            if let Some(issue) = self.inner.lock().issues.get_mut(id) {
                issue.status = status.to_string();
            }
        }

        pub fn closed_calls(&self) -> Vec<String> {
            self.inner.lock().closed.clone()
        }

        pub fn reopened_calls(&self) -> Vec<String> {
            self.inner.lock().reopened.clone()
        }

        pub fn fail_next_with_transient(&self) {
            self.inner.lock().next_fails_transient = true;
        }

        fn maybe_fail(&self) -> Result<(), AdapterError> {
            let mut state = self.inner.lock();
            if state.next_fails_transient {
                state.next_fails_transient = false;
                return Err(AdapterError::Transient("fake transient failure".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl LocalAdapter for FakeLocalAdapter {
        async fn list_issues(&self, _project_path: &Path) -> Result<Vec<LocalIssue>, AdapterError> {
            self.maybe_fail()?;
            Ok(self.inner.lock().issues.values().cloned().collect())
        }

        async fn create_issue(&self, _project_path: &Path, title: &str, issue_type: &str, priority: u8) -> Result<LocalIssue, AdapterError> {
            self.maybe_fail()?;
            let mut state = self.inner.lock();
            state.next_id += 1;
            let issue = LocalIssue {
                id: format!("local-{}", state.next_id),
                identifier: None,
                title: title.to_string(),
                status: "open".to_string(),
                issue_type: Some(issue_type.to_string()),
                priority: Some(priority),
            };
            state.issues.insert(issue.id.clone(), issue.clone());
            Ok(issue)
        }

        async fn update_issue(&self, _project_path: &Path, _id: &str, _fields: serde_json::Value) -> Result<(), AdapterError> {
            self.maybe_fail()
        }

        async fn close_issue(&self, _project_path: &Path, id: &str) -> Result<(), AdapterError> {
            self.maybe_fail()?;
            let mut state = self.inner.lock();
            if let Some(issue) = state.issues.get_mut(id) {
                issue.status = "closed".to_string();
            } else {
                return Err(AdapterError::NotFound(id.to_string()));
            }
            state.closed.push(id.to_string());
            Ok(())
        }

        async fn reopen_issue(&self, _project_path: &Path, id: &str) -> Result<(), AdapterError> {
            self.maybe_fail()?;
            let mut state = self.inner.lock();
            if let Some(issue) = state.issues.get_mut(id) {
                issue.status = "open".to_string();
            } else {
                return Err(AdapterError::NotFound(id.to_string()));
            }
            state.reopened.push(id.to_string());
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeLocalAdapter;

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
