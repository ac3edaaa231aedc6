// SPDX-License-Identifier: MIT

//! The `PrimaryAdapter` trait and its HTTP implementation.
//!
//! Primary is the authoritative source of issue identity: `identifier` (e.g.
//! `"ENG-42"`) is the cross-system join key, and its status vocabulary is the
//! richest of the three backends.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use triad_core::status::{IssueType, Priority};
use triad_core::{AdapterError, PrimaryStatus};

/// A project as reported by Primary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryProject {
    pub primary_id: String,
    pub identifier: String,
    pub name: String,
}

/// An issue as reported by Primary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryIssue {
    pub identifier: String,
    pub title: String,
    pub status: PrimaryStatus,
    /// Epoch ms of the last edit, when Primary reports one.
    pub modified_on: Option<i64>,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_issue_type")]
    pub issue_type: IssueType,
    #[serde(default = "default_priority")]
    pub priority: Priority,
}

fn default_issue_type() -> IssueType {
    IssueType::Task
}

fn default_priority() -> Priority {
    Priority::NoPriority
}

impl PrimaryIssue {
    pub fn new(identifier: impl Into<String>, title: impl Into<String>, status: PrimaryStatus, modified_on: Option<i64>) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            status,
            modified_on,
            description: String::new(),
            issue_type: default_issue_type(),
            priority: default_priority(),
        }
    }
}

#[async_trait]
pub trait PrimaryAdapter: Clone + Send + Sync + 'static {
    async fn list_projects(&self) -> Result<Vec<PrimaryProject>, AdapterError>;

    /// List issues for a project, optionally restricted to those modified after
    /// `modified_after` (epoch ms). Passing `None` lists every issue.
    async fn list_issues(&self, project_id: &str, modified_after: Option<i64>) -> Result<Vec<PrimaryIssue>, AdapterError>;

    async fn get_issue(&self, identifier: &str) -> Result<Option<PrimaryIssue>, AdapterError>;

    async fn update_issue_status(&self, identifier: &str, status: PrimaryStatus) -> Result<(), AdapterError>;

    /// Create a Primary issue from a Board task that has no known Primary counterpart.
    /// Not currently called by the reconciliation phases (see `DESIGN.md`); kept on the
    /// trait for adapters and future bootstrap flows that need it.
    async fn create_issue(&self, project_id: &str, title: &str, description: &str) -> Result<PrimaryIssue, AdapterError>;
}

/// Bearer-token `reqwest` client for Primary's REST API.
#[derive(Clone)]
pub struct HttpPrimaryAdapter {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpPrimaryAdapter {
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
                Err(AdapterError::Forbidden(format!("Primary rejected credentials for {}", response.url())))
            }
            status if status.is_server_error() => Err(AdapterError::Transient(format!("Primary returned {status}"))),
            status => Err(AdapterError::Malformed(format!("Primary returned unexpected status {status}"))),
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
    identifier: String,
    name: String,
}

#[derive(Deserialize)]
struct WireIssue {
    identifier: String,
    title: String,
    status: String,
    modified_on: Option<i64>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    issue_type: Option<String>,
    #[serde(default)]
    priority: Option<String>,
}

fn wire_to_issue(w: WireIssue) -> Result<PrimaryIssue, AdapterError> {
    let status = PrimaryStatus::parse(&w.status)
        .ok_or_else(|| AdapterError::Malformed(format!("unknown Primary status {:?}", w.status)))?;
    let issue_type = match w.issue_type {
        Some(s) => IssueType::parse(&s).ok_or_else(|| AdapterError::Malformed(format!("unknown Primary issue type {s:?}")))?,
        None => default_issue_type(),
    };
    let priority = match w.priority {
        Some(s) => Priority::parse(&s).ok_or_else(|| AdapterError::Malformed(format!("unknown Primary priority {s:?}")))?,
        None => default_priority(),
    };
    Ok(PrimaryIssue { identifier: w.identifier, title: w.title, status, modified_on: w.modified_on, description: w.description, issue_type, priority })
}

#[async_trait]
impl PrimaryAdapter for HttpPrimaryAdapter {
    async fn list_projects(&self) -> Result<Vec<PrimaryProject>, AdapterError> {
        let response = self.send(self.client.get(self.url("/projects"))).await?;
        let wire: Vec<WireProject> = response.json().await.map_err(|e| AdapterError::Malformed(e.to_string()))?;
        Ok(wire.into_iter().map(|w| PrimaryProject { primary_id: w.id, identifier: w.identifier, name: w.name }).collect())
    }

    async fn list_issues(&self, project_id: &str, modified_after: Option<i64>) -> Result<Vec<PrimaryIssue>, AdapterError> {
        let mut builder = self.client.get(self.url(&format!("/projects/{project_id}/issues")));
        if let Some(ts) = modified_after {
            builder = builder.query(&[("modified_after", ts)]);
        }
        let response = self.send(builder).await?;
        let wire: Vec<WireIssue> = response.json().await.map_err(|e| AdapterError::Malformed(e.to_string()))?;
        wire.into_iter().map(wire_to_issue).collect()
    }

    async fn get_issue(&self, identifier: &str) -> Result<Option<PrimaryIssue>, AdapterError> {
        match self.send(self.client.get(self.url(&format!("/issues/{identifier}")))).await {
            Ok(response) => {
                let wire: WireIssue = response.json().await.map_err(|e| AdapterError::Malformed(e.to_string()))?;
                Ok(Some(wire_to_issue(wire)?))
            }
            Err(AdapterError::NotFound(_)) => Ok(None),
            Err(other) => Err(other),
        }
    }

    async fn update_issue_status(&self, identifier: &str, status: PrimaryStatus) -> Result<(), AdapterError> {
        let body = serde_json::json!({ "status": status.as_str() });
        self.send(self.client.patch(self.url(&format!("/issues/{identifier}"))).json(&body)).await?;
        Ok(())
    }

    async fn create_issue(&self, project_id: &str, title: &str, description: &str) -> Result<PrimaryIssue, AdapterError> {
        let body = serde_json::json!({ "title": title, "description": description });
        let response = self.send(self.client.post(self.url(&format!("/projects/{project_id}/issues"))).json(&body)).await?;
        let wire: WireIssue = response.json().await.map_err(|e| AdapterError::Malformed(e.to_string()))?;
        wire_to_issue(wire)
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
        projects: Vec<PrimaryProject>,
        issues: HashMap<String, PrimaryIssue>,
        status_updates: Vec<(String, PrimaryStatus)>,
        next_fails_transient: bool,
    }

    /// In-memory `PrimaryAdapter` for unit and property tests: a cloneable handle
    /// over shared, lock-protected state, with call-recording for assertions.
    #[derive(Clone, Default)]
    pub struct FakePrimaryAdapter {
        inner: Arc<Mutex<FakeState>>,
    }

    impl FakePrimaryAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn seed_project(&self, project: PrimaryProject) {
            self.inner.lock().projects.push(project);
        }

        pub fn seed_issue(&self, issue: PrimaryIssue) {
            self.inner.lock().issues.insert(issue.identifier.clone(), issue);
        }

        pub fn status_updates(&self) -> Vec<(String, PrimaryStatus)> {
            self.inner.lock().status_updates.clone()
        }

        /// Make the next call fail with `AdapterError::Transient`, for backoff tests.
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
    impl PrimaryAdapter for FakePrimaryAdapter {
        async fn list_projects(&self) -> Result<Vec<PrimaryProject>, AdapterError> {
            self.maybe_fail()?;
            Ok(self.inner.lock().projects.clone())
        }

        async fn list_issues(&self, _project_id: &str, modified_after: Option<i64>) -> Result<Vec<PrimaryIssue>, AdapterError> {
            self.maybe_fail()?;
            let state = self.inner.lock();
            Ok(state
                .issues
                .values()
                .filter(|i| match modified_after {
                    None => true,
                    Some(after) => i.modified_on.map(|m| m > after).unwrap_or(true),
                })
                .cloned()
                .collect())
        }

        async fn get_issue(&self, identifier: &str) -> Result<Option<PrimaryIssue>, AdapterError> {
            self.maybe_fail()?;
            Ok(self.inner.lock().issues.get(identifier).cloned())
        }

        async fn update_issue_status(&self, identifier: &str, status: PrimaryStatus) -> Result<(), AdapterError> {
            self.maybe_fail()?;
            let mut state = self.inner.lock();
            if let Some(issue) = state.issues.get_mut(identifier) {
                issue.status = status;
            } else {
                return Err(AdapterError::NotFound(identifier.to_string()));
            }
            state.status_updates.push((identifier.to_string(), status));
            Ok(())
        }

        async fn create_issue(&self, _project_id: &str, title: &str, _description: &str) -> Result<PrimaryIssue, AdapterError> {
            self.maybe_fail()?;
            let identifier = format!("FAKE-{}", self.inner.lock().issues.len() + 1);
            let issue = PrimaryIssue::new(identifier.clone(), title.to_string(), PrimaryStatus::Todo, None);
            self.inner.lock().issues.insert(identifier, issue.clone());
            Ok(issue)
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakePrimaryAdapter;

#[cfg(test)]
#[path = "primary_tests.rs"]
mod tests;
