// SPDX-License-Identifier: MIT

//! The best-effort consumer for `triad_engine::ProvisioningEvent`. No real
//! "agent" service ships in this repository, so this consumer only performs
//! the one concrete side effect kept here: writing the per-project sidecar
//! file and marking the project provisioned in the State Store so the
//! orchestrator does not refire the event on every subsequent cycle.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use triad_engine::{EventReceiver, ProvisioningEvent, StoreHandle};

/// Drain `rx` until the channel closes or `cancel` fires, provisioning each
/// `ProjectCreated` event's sidecar file and persisting `agent_id` back to the
/// store. `IssueChanged` events carry no sidecar-relevant side effect in this
/// repository and are only logged at `debug`.
pub async fn drain(mut rx: EventReceiver, store: StoreHandle, cancel: CancellationToken) {
    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Some(event) => handle(event, &store).await,
                    None => break,
                }
            }
            _ = cancel.cancelled() => break,
        }
    }
}

async fn handle(event: ProvisioningEvent, store: &StoreHandle) {
    match event {
        ProvisioningEvent::ProjectCreated { project_identifier } => provision_project(&project_identifier, store).await,
        ProvisioningEvent::IssueChanged { project_identifier, issue_identifier } => {
            debug!(project = %project_identifier, identifier = %issue_identifier, "issue-changed provisioning event dropped, no consumer wired");
        }
    }
}

async fn provision_project(project_identifier: &str, store: &StoreHandle) {
    let Ok(Some(mut project)) = store.get_project(project_identifier.to_string()).await else {
        warn!(project = %project_identifier, "provisioning event for unknown project, dropping");
        return;
    };

    if let Some(path) = project.filesystem_path.clone() {
        let agent_id = format!("agent-{project_identifier}");
        if let Err(e) = crate::sidecar::write(std::path::Path::new(&path), &agent_id) {
            warn!(project = %project_identifier, error = %e, "failed writing provisioning sidecar, will retry on next discovery");
            return;
        }
        project.agent_id = Some(agent_id);
        if let Err(e) = store.upsert_project(project).await {
            warn!(project = %project_identifier, error = %e, "failed persisting agent_id after provisioning");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use triad_core::Project;
    use triad_storage::Store;

    #[tokio::test]
    async fn project_created_writes_sidecar_and_persists_agent_id() {
        let dir = tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join(".local")).expect("mkdir");

        let store = StoreHandle::new(Store::open_in_memory().expect("open store"));
        let mut project = Project::new("ENG", "Engineering", "primary-1");
        project.filesystem_path = Some(dir.path().to_string_lossy().into_owned());
        store.upsert_project(project).await.expect("seed project");

        provision_project("ENG", &store).await;

        let sidecar = crate::sidecar::read(dir.path()).expect("sidecar written");
        assert_eq!(sidecar.last_agent_id, "agent-ENG");

        let stored = store.get_project("ENG".to_string()).await.expect("get").expect("present");
        assert_eq!(stored.agent_id, Some("agent-ENG".to_string()));
    }

    #[tokio::test]
    async fn project_without_filesystem_path_is_a_no_op() {
        let store = StoreHandle::new(Store::open_in_memory().expect("open store"));
        store.upsert_project(Project::new("ENG", "Engineering", "primary-1")).await.expect("seed project");

        provision_project("ENG", &store).await;

        let stored = store.get_project("ENG".to_string()).await.expect("get").expect("present");
        assert_eq!(stored.agent_id, None);
    }

    #[tokio::test]
    async fn unknown_project_is_logged_and_dropped() {
        let store = StoreHandle::new(Store::open_in_memory().expect("open store"));
        provision_project("GHOST", &store).await;
        assert_eq!(store.get_project("GHOST".to_string()).await.expect("get"), None);
    }
}
