// SPDX-License-Identifier: MIT

//! An async facade over the synchronous [`triad_storage::Store`].
//!
//! `rusqlite::Connection` blocks the calling thread for every query, so each
//! operation is confined to a single `tokio::task::spawn_blocking` call — the
//! orchestrator's async tasks never block on the store directly.

use std::sync::Arc;

use parking_lot::Mutex;
use triad_core::{Issue, Project};
use triad_storage::{Result as StoreResult, Store};

#[derive(Clone)]
pub struct StoreHandle(Arc<Mutex<Store>>);

impl StoreHandle {
    pub fn new(store: Store) -> Self {
        Self(Arc::new(Mutex::new(store)))
    }

    async fn call<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Store) -> StoreResult<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.0);
        tokio::task::spawn_blocking(move || f(&inner.lock()))
            .await
            .expect("store task panicked")
    }

    pub async fn upsert_project(&self, project: Project) -> StoreResult<()> {
        self.call(move |s| s.upsert_project(&project)).await
    }

    pub async fn get_project(&self, identifier: String) -> StoreResult<Option<Project>> {
        self.call(move |s| s.get_project(&identifier)).await
    }

    pub async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        self.call(|s| s.list_projects()).await
    }

    pub async fn upsert_issue(&self, issue: Issue) -> StoreResult<()> {
        self.call(move |s| s.upsert_issue(&issue)).await
    }

    pub async fn get_issue(&self, project_identifier: String, identifier: String) -> StoreResult<Option<Issue>> {
        self.call(move |s| s.get_issue(&project_identifier, &identifier)).await
    }

    pub async fn list_issues_for_project(&self, project_identifier: String) -> StoreResult<Vec<Issue>> {
        self.call(move |s| s.list_issues_for_project(&project_identifier)).await
    }

    pub async fn clear_board_mappings(&self, project_identifier: Option<String>) -> StoreResult<()> {
        self.call(move |s| s.clear_board_mappings(project_identifier.as_deref())).await
    }

    pub async fn clear_all(&self) -> StoreResult<()> {
        self.call(|s| s.clear_all()).await
    }

    pub async fn get_metadata(&self, key: String) -> StoreResult<Option<String>> {
        self.call(move |s| s.get_metadata(&key)).await
    }

    pub async fn set_metadata(&self, key: String, value: String) -> StoreResult<()> {
        self.call(move |s| s.set_metadata(&key, &value)).await
    }
}
