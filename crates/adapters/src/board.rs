// SPDX-License-Identifier: MIT

//! The `BoardAdapter` trait and its HTTP implementation.
//!
//! Board is the sloppiest of the three backends about timestamps: `updated_at`
//! does not always advance on a status-only edit, so callers must treat its
//! absence as "unknown", never as "just now" (see `triad_core::mapper` and the
//! conflict rule in `triad_engine`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use triad_core::AdapterError;

/// A project as reported by Board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardProject {
    pub board_id: String,
    pub name: String,
}

/// A task as reported by Board. `identifier` is the Primary short code embedded in the
/// task (title prefix or a custom field, depending on deployment) when resolvable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardTask {
    pub task_id: String,
    pub identifier: Option<String>,
    pub title: String,
    pub status: String,
    /// RFC3339 timestamp, when Board actually reports one.
    pub updated_at: Option<String>,
}

impl BoardTask {
    /// Epoch ms, parsed from `updated_at`. `None` if absent or unparseable — both cases
    /// are "unknown, not baseline" to the conflict rule.
    pub fn updated_at_ms(&self) -> Option<i64> {
        self.updated_at.as_deref().and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok()).map(|dt| dt.timestamp_millis())
    }
}

#[async_trait]
pub trait BoardAdapter: Clone + Send + Sync + 'static {
    async fn list_projects(&self) -> Result<Vec<BoardProject>, AdapterError>;

    async fn create_project(&self, name: &str, meta: serde_json::Value) -> Result<BoardProject, AdapterError>;

    async fn list_tasks(&self, board_project_id: &str) -> Result<Vec<BoardTask>, AdapterError>;

    async fn create_task(&self, board_project_id: &str, title: &str, desc: &str, status: &str) -> Result<BoardTask, AdapterError>;

    async fn update_task_status(&self, task_id: &str, status: &str) -> Result<(), AdapterError>;
}

/// Bearer-token `reqwest` client for Board's REST API.
#[derive(Clone)]
pub struct HttpBoardAdapter {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpBoardAdapter {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, request_timeout: Duration) -> Result<Self, AdapterError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| AdapterError::Transient(format!("building HTTP client: {e}")))?;
        Ok(Self { client, base_url: base_url.into(), token: token.into() })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, AdapterError> {
        let response = builder.bearer_auth(&self.token).send().await.map_err(classify_reqwest_error)?;

        match response.status() {
            status if status.is_success() => Ok(response),
            reqwest::StatusCode::NOT_FOUND => Err(AdapterError::NotFound(response.url().to_string())),
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Err(AdapterError::Forbidden(format!("Board rejected credentials for {}", response.url())))
            }
            status if status.is_server_error() => Err(AdapterError::Transient(format!("Board returned {status}"))),
            status => Err(AdapterError::Malformed(format!("Board returned unexpected status {status}"))),
        }
    }
}

fn classify_reqwest_error(err: reqwest::Error) -> AdapterError {
    if err.is_timeout() || err.is_connect() {
        AdapterError::Transient(err.to_string())
    } else {
        AdapterError::Malformed(err.to_string())
    }
}

#[derive(Deserialize)]
struct WireProject {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct WireTask {
    id: String,
    identifier: Option<String>,
    title: String,
    status: String,
    updated_at: Option<String>,
}

fn wire_to_task(w: WireTask) -> BoardTask {
    BoardTask { task_id: w.id, identifier: w.identifier, title: w.title, status: w.status, updated_at: w.updated_at }
}

#[async_trait]
impl BoardAdapter for HttpBoardAdapter {
    async fn list_projects(&self) -> Result<Vec<BoardProject>, AdapterError> {
        let response = self.send(self.client.get(self.url("/projects"))).await?;
        let wire: Vec<WireProject> = response.json().await.map_err(|e| AdapterError::Malformed(e.to_string()))?;
        Ok(wire.into_iter().map(|w| BoardProject { board_id: w.id, name: w.name }).collect())
    }

    async fn create_project(&self, name: &str, meta: serde_json::Value) -> Result<BoardProject, AdapterError> {
        let body = serde_json::json!({ "name": name, "meta": meta });
        let response = self.send(self.client.post(self.url("/projects")).json(&body)).await?;
        let wire: WireProject = response.json().await.map_err(|e| AdapterError::Malformed(e.to_string()))?;
        Ok(BoardProject { board_id: wire.id, name: wire.name })
    }

    async fn list_tasks(&self, board_project_id: &str) -> Result<Vec<BoardTask>, AdapterError> {
        let response = self.send(self.client.get(self.url(&format!("/projects/{board_project_id}/tasks")))).await?;
        let wire: Vec<WireTask> = response.json().await.map_err(|e| AdapterError::Malformed(e.to_string()))?;
        Ok(wire.into_iter().map(wire_to_task).collect())
    }

    async fn create_task(&self, board_project_id: &str, title: &str, desc: &str, status: &str) -> Result<BoardTask, AdapterError> {
        let body = serde_json::json!({ "title": title, "description": desc, "status": status });
        let response = self.send(self.client.post(self.url(&format!("/projects/{board_project_id}/tasks"))).json(&body)).await?;
        let wire: WireTask = response.json().await.map_err(|e| AdapterError::Malformed(e.to_string()))?;
        Ok(wire_to_task(wire))
    }

    async fn update_task_status(&self, task_id: &str, status: &str) -> Result<(), AdapterError> {
        let body = serde_json::json!({ "status": status });
        self.send(self.client.patch(self.url(&format!("/tasks/{task_id}"))).json(&body)).await?;
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
        projects: Vec<BoardProject>,
        tasks: HashMap<String, BoardTask>,
        next_task_id: u64,
        status_updates: Vec<(String, String)>,
        next_fails_transient: bool,
    }

    /// In-memory `BoardAdapter` for unit and property tests.
    #[derive(Clone, Default)]
    pub struct FakeBoardAdapter {
        inner: Arc<Mutex<FakeState>>,
    }

    impl FakeBoardAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn seed_project(&self, project: BoardProject) {
            self.inner.lock().projects.push(project);
        }

        /// Seed a task directly (bypassing `create_task`), for scenarios that start
        /// mid-flight with a pre-existing Board task.
        pub fn seed_task(&self, task: BoardTask) {
            self.inner.lock().tasks.insert(task.task_id.clone(), task);
        }

        /// Set a task's status and `updated_at` as Board would on an external edit,
        /// independent of anything the orchestrator wrote.
        pub fn set_task_status(&self, task_id: &str, status: &str, updated_at: Option<&str>) {
            let mut state = self.inner.lock();
            if let Some(task) = state.tasks.get_mut(task_id) {
                task.status = status.to_string();
                task.updated_at = updated_at.map(|s| s.to_string());
            }
        }

        pub fn status_updates(&self) -> Vec<(String, String)> {
            self.inner.lock().status_updates.clone()
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
    impl BoardAdapter for FakeBoardAdapter {
        async fn list_projects(&self) -> Result<Vec<BoardProject>, AdapterError> {
            self.maybe_fail()?;
            Ok(self.inner.lock().projects.clone())
        }

        async fn create_project(&self, name: &str, _meta: serde_json::Value) -> Result<BoardProject, AdapterError> {
            self.maybe_fail()?;
            let project = BoardProject { board_id: format!("board-{name}"), name: name.to_string() };
            self.inner.lock().projects.push(project.clone());
            Ok(project)
        }

        async fn list_tasks(&self, _board_project_id: &str) -> Result<Vec<BoardTask>, AdapterError> {
            self.maybe_fail()?;
            Ok(self.inner.lock().tasks.values().cloned().collect())
        }

        async fn create_task(&self, _board_project_id: &str, title: &str, _desc: &str, status: &str) -> Result<BoardTask, AdapterError> {
            self.maybe_fail()?;
            let mut state = self.inner.lock();
            state.next_task_id += 1;
            let task = BoardTask {
                task_id: format!("task-{}", state.next_task_id),
                identifier: None,
                title: title.to_string(),
                status: status.to_string(),
                updated_at: None,
            };
            state.tasks.insert(task.task_id.clone(), task.clone());
            Ok(task)
        }

        async fn update_task_status(&self, task_id: &str, status: &str) -> Result<(), AdapterError> {
            self.maybe_fail()?;
            let mut state = self.inner.lock();
            match state.tasks.get_mut(task_id) {
                Some(task) => task.status = status.to_string(),
                None => return Err(AdapterError::NotFound(task_id.to_string())),
            }
            state.status_updates.push((task_id.to_string(), status.to_string()));
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeBoardAdapter;

#[cfg(test)]
#[path = "board_tests.rs"]
mod tests;
