// SPDX-License-Identifier: MIT

//! The Sync Orchestrator: drives one reconciliation cycle end to end.
//!
//! A cycle is sequential per project: Phase 1 (Primary → Board), Phase 2
//! (Board → Primary), Phase 3a (Primary → Local), Phase 3b (Local → Primary). Two
//! different projects' pipelines may run concurrently (bounded by
//! `OrchestratorConfig::max_workers`); within one project the four phases always
//! run in order because Phase 2's skip-set depends on Phase 1's writes.
//!
//! The in-memory loop-suppression set (`recently_updated`) is scoped to a single
//! project's run rather than the whole cycle: issue identifiers are already unique
//! per project (Primary mints them, e.g. `"ENG-42"`), so a project-local set is
//! observationally identical to a cycle-wide one and lets different projects run
//! without sharing a lock on it.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex as SyncMutex;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};
use triad_adapters::{BoardAdapter, LocalAdapter, PrimaryAdapter};
use triad_adapters::local::has_local_store;
use triad_core::mapper::{map_board_to_primary, map_local_to_primary, map_primary_to_board, map_primary_to_local, map_priority_to_local};
use triad_core::status::{BoardStatus, LocalStatus, PrimaryStatus};
use triad_core::{AdapterError, Clock, Issue, Project};

use crate::backoff::BackoffTracker;
use crate::config::OrchestratorConfig;
use crate::conflict::{self, ConflictWinner};
use crate::event::{EventSink, ProvisioningEvent};
use crate::health::{CycleSummary, HealthState};
use crate::store_handle::StoreHandle;

const LAST_SYNC_METADATA_KEY: &str = "last_sync";

/// Minimum gap between repeated `forbidden` log lines for the same project.
const FORBIDDEN_LOG_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// The full wiring an orchestrator needs: one adapter per backend, the state
/// store, a clock, and the shared sinks for health and best-effort provisioning.
pub struct Orchestrator<P, B, L, C> {
    primary: P,
    board: B,
    local: L,
    store: StoreHandle,
    clock: C,
    config: OrchestratorConfig,
    health: HealthState,
    events: EventSink,
    backoff: BackoffTracker,
    last_forbidden_log: Arc<SyncMutex<HashMap<String, Instant>>>,
}

impl<P, B, L, C> Orchestrator<P, B, L, C>
where
    P: PrimaryAdapter,
    B: BoardAdapter,
    L: LocalAdapter,
    C: Clock,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(primary: P, board: B, local: L, store: StoreHandle, clock: C, config: OrchestratorConfig, health: HealthState, events: EventSink) -> Self {
        Self {
            primary,
            board,
            local,
            store,
            clock,
            config,
            health,
            events,
            backoff: BackoffTracker::new(),
            last_forbidden_log: Arc::new(SyncMutex::new(HashMap::new())),
        }
    }

    pub fn health(&self) -> HealthState {
        self.health.clone()
    }

    fn worker(&self) -> ProjectWorker<P, B, L, C> {
        ProjectWorker {
            primary: self.primary.clone(),
            board: self.board.clone(),
            local: self.local.clone(),
            store: self.store.clone(),
            clock: self.clock.clone(),
            config: self.config.clone(),
            events: self.events.clone(),
            last_forbidden_log: Arc::clone(&self.last_forbidden_log),
        }
    }

    /// Run one full cycle: discover projects, then run Phase 1-3b for every
    /// active, non-backed-off project. Returns a summary suitable for `/health`.
    pub async fn run_cycle(&mut self) -> CycleSummary {
        let started_at = self.clock.epoch_ms();
        let start = self.clock.now();

        let contexts = match self.discover_projects().await {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "cycle entry failed, aborting cycle");
                let summary = CycleSummary { started_at, duration_ms: 0, completed: false, ..Default::default() };
                self.health.record_cycle(summary.clone());
                return summary;
            }
        };

        let now = Instant::now();
        let runnable: Vec<_> = contexts.into_iter().filter(|c| !self.backoff.is_backing_off(&c.project.identifier, now)).collect();

        let permits = self.config.max_workers.unwrap_or(1).max(1);
        let semaphore = Arc::new(Semaphore::new(permits));
        let mut joins = JoinSet::new();
        for ctx in runnable {
            let worker = self.worker();
            let sem = Arc::clone(&semaphore);
            joins.spawn(async move {
                let _permit = sem.acquire_owned().await.expect("semaphore closed");
                worker.run_project_cycle(ctx).await
            });
        }

        let mut summary = CycleSummary { started_at, completed: true, ..Default::default() };
        while let Some(joined) = joins.join_next().await {
            let result = match joined {
                Ok(r) => r,
                Err(e) => {
                    warn!(error = %e, "project cycle task panicked");
                    continue;
                }
            };
            summary.phase1_count += result.phase1;
            summary.phase2_count += result.phase2;
            summary.phase3_count += result.phase3;
            summary.errors += result.errors;
            summary.entities_considered += result.entities;
            summary.writes_succeeded += result.writes;

            if result.transient_failure {
                self.backoff.record_failure(&result.project_identifier, now);
            } else {
                self.backoff.record_success(&result.project_identifier);
            }
        }

        summary.duration_ms = self.clock.now().saturating_duration_since(start).as_millis() as i64;

        if !self.config.dry_run {
            let _ = self.store.set_metadata(LAST_SYNC_METADATA_KEY.to_string(), started_at.to_string()).await;
        }

        info!(
            phase1 = summary.phase1_count,
            phase2 = summary.phase2_count,
            phase3 = summary.phase3_count,
            errors = summary.errors,
            duration_ms = summary.duration_ms,
            "cycle complete"
        );
        self.health.record_cycle(summary.clone());
        summary
    }

    /// Cycle entry: list Primary projects, upsert them, resolve each
    /// active project's Board mapping and filesystem path, and (when configured)
    /// drop empty projects from the active set.
    async fn discover_projects(&mut self) -> Result<Vec<ProjectContext>, AdapterError> {
        let primary_projects = self.primary.list_projects().await?;
        let mut contexts = Vec::new();

        for pp in primary_projects {
            if !self.config.is_active_project(&pp.identifier) {
                continue;
            }

            let existing = self.store.get_project(pp.identifier.clone()).await.ok().flatten();
            let mut project = existing.unwrap_or_else(|| Project::new(pp.identifier.clone(), pp.name.clone(), pp.primary_id.clone()));
            project.name = pp.name.clone();
            project.last_checked_at = Some(self.clock.epoch_ms());
            if let Some(dir) = &self.config.stacks_dir {
                let candidate = dir.join(&pp.identifier);
                if has_local_store(&candidate) {
                    project.filesystem_path = Some(candidate.to_string_lossy().into_owned());
                }
            }

            if !self.config.dry_run {
                let _ = self.store.upsert_project(project.clone()).await;
            }

            let newly_provisioned = self.ensure_board_project(&mut project).await;

            if self.config.skip_empty_projects {
                let issues = self.primary.list_issues(&project.primary_id, None).await.unwrap_or_default();
                if issues.is_empty() {
                    continue;
                }
            }

            if newly_provisioned {
                self.events.emit(ProvisioningEvent::ProjectCreated { project_identifier: project.identifier.clone() });
            }

            contexts.push(ProjectContext { project });
        }

        Ok(contexts)
    }

    /// Ensure `project.board_id` is set, matching an existing Board project by
    /// name or creating one. Returns whether this is the first time the project
    /// was seen without a prior `agent_id` (used to gate the provisioning event).
    async fn ensure_board_project(&mut self, project: &mut Project) -> bool {
        let needs_agent_event = project.agent_id.is_none();

        if project.board_id.is_none() {
            let board_id = match self.board.list_projects().await {
                Ok(boards) => boards.into_iter().find(|b| b.name == project.name).map(|b| b.board_id),
                Err(_) => None,
            };
            let board_id = match board_id {
                Some(id) => Some(id),
                None => self.board.create_project(&project.name, serde_json::json!({})).await.ok().map(|b| b.board_id),
            };
            if let Some(id) = board_id {
                project.board_id = Some(id);
                if !self.config.dry_run {
                    let _ = self.store.upsert_project(project.clone()).await;
                }
            }
        }

        needs_agent_event
    }
}

struct ProjectContext {
    project: Project,
}

#[derive(Default)]
struct ProjectCycleResult {
    project_identifier: String,
    phase1: u64,
    phase2: u64,
    phase3: u64,
    errors: u64,
    entities: u64,
    writes: u64,
    transient_failure: bool,
}

/// A cloned, stateless handle used to run one project's pipeline. Cheap to spawn
/// onto its own task: every field is `Clone` and carries no per-call state.
struct ProjectWorker<P, B, L, C> {
    primary: P,
    board: B,
    local: L,
    store: StoreHandle,
    clock: C,
    config: OrchestratorConfig,
    events: EventSink,
    last_forbidden_log: Arc<SyncMutex<HashMap<String, Instant>>>,
}

impl<P, B, L, C> ProjectWorker<P, B, L, C>
where
    P: PrimaryAdapter,
    B: BoardAdapter,
    L: LocalAdapter,
    C: Clock,
{
    /// Log an adapter failure, deduplicating `forbidden` so a standing permissions
    /// problem logs at most once per [`FORBIDDEN_LOG_INTERVAL`] per project.
    fn log_adapter_error(&self, project_identifier: &str, e: &AdapterError) {
        if !matches!(e, AdapterError::Forbidden(_)) {
            warn!(project = project_identifier, error = %e, "adapter call failed");
            return;
        }
        let now = Instant::now();
        let mut last = self.last_forbidden_log.lock();
        let should_log = last.get(project_identifier).map(|t| now.duration_since(*t) >= FORBIDDEN_LOG_INTERVAL).unwrap_or(true);
        if should_log {
            last.insert(project_identifier.to_string(), now);
            warn!(project = project_identifier, error = %e, "adapter call forbidden");
        }
    }

    async fn run_project_cycle(&self, ctx: ProjectContext) -> ProjectCycleResult {
        let project = ctx.project;
        let mut result = ProjectCycleResult { project_identifier: project.identifier.clone(), ..Default::default() };
        let mut recently_updated: HashSet<String> = HashSet::new();

        let modified_after = if self.config.incremental_sync {
            self.store.get_metadata(watermark_key(&project.identifier)).await.ok().flatten().and_then(|s| s.parse::<i64>().ok())
        } else {
            None
        };

        let primary_issues = match self.primary.list_issues(&project.primary_id, modified_after).await {
            Ok(issues) => issues,
            Err(e) => {
                self.log_adapter_error(&project.identifier, &e);
                result.errors += 1;
                result.transient_failure = e.is_transient();
                return result;
            }
        };

        self.phase1_primary_to_board(&project, &primary_issues, &mut recently_updated, &mut result).await;
        self.phase2_board_to_primary(&project, &recently_updated, &mut result).await;

        if let Some(path) = project.filesystem_path.as_deref().filter(|p| has_local_store(std::path::Path::new(p))) {
            let path = std::path::Path::new(path);
            self.phase3a_primary_to_local(&project, path, &primary_issues, &mut result).await;
            self.phase3b_local_to_primary(&project, path, &recently_updated, &mut result).await;
        }

        if !self.config.dry_run {
            let _ = self.store.set_metadata(watermark_key(&project.identifier), self.clock.epoch_ms().to_string()).await;
        }

        result
    }

    async fn phase1_primary_to_board(&self, project: &Project, primary_issues: &[triad_adapters::PrimaryIssue], recently_updated: &mut HashSet<String>, result: &mut ProjectCycleResult) {
        let Some(board_id) = project.board_id.clone() else { return };

        let board_tasks = match self.board.list_tasks(&board_id).await {
            Ok(tasks) => tasks,
            Err(e) => {
                self.log_adapter_error(&project.identifier, &e);
                result.errors += 1;
                result.transient_failure |= e.is_transient();
                Vec::new()
            }
        };
        let mut tasks_by_id: HashMap<String, triad_adapters::BoardTask> = board_tasks.into_iter().map(|t| (t.task_id.clone(), t)).collect();
        let tasks_by_title: HashMap<String, String> = tasks_by_id.values().map(|t| (t.title.clone(), t.task_id.clone())).collect();

        for p in primary_issues {
            result.entities += 1;
            let stored = self.store.get_issue(project.identifier.clone(), p.identifier.clone()).await.ok().flatten();

            let board_task_id = stored
                .as_ref()
                .and_then(|s| s.board_task_id.clone())
                .or_else(|| tasks_by_title.get(&p.title).cloned());

            let board_task = board_task_id.as_ref().and_then(|id| tasks_by_id.remove(id));

            let mut issue_row = stored.clone().unwrap_or_else(|| Issue::new(project.identifier.clone(), p.identifier.clone(), p.title.clone(), p.status, p.modified_on.unwrap_or(0)));
            issue_row.title = p.title.clone();

            match board_task {
                None => {
                    let desired = map_primary_to_board(p.status);
                    match self.create_board_task(&board_id, p, desired).await {
                        Ok(created) => {
                            issue_row.board_task_id = Some(created.task_id.clone());
                            issue_row.board_status = Some(created.status.clone());
                            issue_row.status = p.status;
                            issue_row.primary_modified_at = p.modified_on.unwrap_or(issue_row.primary_modified_at);
                            recently_updated.insert(p.identifier.clone());
                            result.writes += 1;
                            result.phase1 += 1;
                            info!(project = %project.identifier, identifier = %p.identifier, phase = "1", outcome = "created_board_task", "sync decision");
                        }
                        Err(e) => {
                            self.log_adapter_error(&project.identifier, &e);
                            result.errors += 1;
                            result.transient_failure |= e.is_transient();
                        }
                    }
                }
                Some(b) => {
                    let baseline_board_status = issue_row.board_status.clone();
                    let primary_changed = issue_row.status != p.status;
                    let board_changed = baseline_board_status.as_deref() != Some(b.status.as_str());

                    let mut keep_status = p.status;
                    match (primary_changed, board_changed) {
                        (true, false) => {
                            if self.write_board_status(&project.identifier, &b.task_id, p.status, result).await {
                                recently_updated.insert(p.identifier.clone());
                            }
                        }
                        (true, true) => {
                            let now = self.clock.epoch_ms();
                            let winner = conflict::resolve(p.modified_on.unwrap_or(now), b.updated_at_ms(), now);
                            info!(
                                project = %project.identifier, identifier = %p.identifier, phase = "1",
                                primary_modified_at = ?p.modified_on, board_modified_at = ?b.updated_at_ms(), winner = ?winner,
                                "sync decision"
                            );
                            match winner {
                                ConflictWinner::Primary => {
                                    if self.write_board_status(&project.identifier, &b.task_id, p.status, result).await {
                                        recently_updated.insert(p.identifier.clone());
                                    }
                                }
                                ConflictWinner::Board => {
                                    // Primary lost: do not advance the stored status this cycle
                                    // so Phase 2 still sees the pre-cycle baseline.
                                    keep_status = issue_row.status;
                                }
                            }
                        }
                        (false, true) | (false, false) => {}
                    }

                    issue_row.board_task_id = Some(b.task_id.clone());
                    issue_row.board_status = Some(b.status.clone());
                    issue_row.board_modified_at = b.updated_at_ms();
                    issue_row.status = keep_status;
                    issue_row.primary_modified_at = p.modified_on.unwrap_or(issue_row.primary_modified_at);
                }
            }

            if !self.config.dry_run {
                let _ = self.store.upsert_issue(issue_row).await;
            }
        }
    }

    async fn create_board_task(&self, board_id: &str, p: &triad_adapters::PrimaryIssue, status: BoardStatus) -> Result<triad_adapters::BoardTask, AdapterError> {
        if self.config.dry_run {
            return Ok(triad_adapters::BoardTask { task_id: "dry-run".to_string(), identifier: Some(p.identifier.clone()), title: p.title.clone(), status: status.as_str().to_string(), updated_at: None });
        }
        self.board.create_task(board_id, &p.title, &p.description, status.as_str()).await
    }

    async fn write_board_status(&self, project_identifier: &str, task_id: &str, status: PrimaryStatus, result: &mut ProjectCycleResult) -> bool {
        if self.config.dry_run {
            result.writes += 1;
            result.phase1 += 1;
            return true;
        }
        match self.board.update_task_status(task_id, map_primary_to_board(status).as_str()).await {
            Ok(()) => {
                result.writes += 1;
                result.phase1 += 1;
                true
            }
            Err(e) => {
                self.log_adapter_error(project_identifier, &e);
                result.errors += 1;
                result.transient_failure |= e.is_transient();
                false
            }
        }
    }

    async fn phase2_board_to_primary(&self, project: &Project, recently_updated: &HashSet<String>, result: &mut ProjectCycleResult) {
        let Some(board_id) = project.board_id.clone() else { return };

        let issues = self.store.list_issues_for_project(project.identifier.clone()).await.unwrap_or_default();
        let by_task_id: HashMap<String, Issue> = issues.into_iter().filter_map(|i| i.board_task_id.clone().map(|id| (id, i))).collect();

        let tasks = match self.board.list_tasks(&board_id).await {
            Ok(t) => t,
            Err(e) => {
                self.log_adapter_error(&project.identifier, &e);
                result.errors += 1;
                result.transient_failure |= e.is_transient();
                return;
            }
        };

        for task in tasks {
            let Some(stored) = by_task_id.get(&task.task_id) else { continue };
            if recently_updated.contains(&stored.identifier) {
                continue;
            }
            result.entities += 1;

            let Some(board_status) = BoardStatus::parse(&task.status) else {
                result.errors += 1;
                continue;
            };
            let mapped = map_board_to_primary(board_status, stored.status);
            if mapped == stored.status {
                continue;
            }

            if self.config.dry_run {
                result.writes += 1;
                info!(project = %project.identifier, identifier = %stored.identifier, phase = "2", from = %stored.status, to = %mapped, outcome = "dry_run", "sync decision");
                continue;
            }

            match self.primary.update_issue_status(&stored.identifier, mapped).await {
                Ok(()) => {
                    result.writes += 1;
                    result.phase2 += 1;
                    let mut updated = stored.clone();
                    updated.status = mapped;
                    updated.board_status = Some(task.status.clone());
                    updated.board_modified_at = task.updated_at_ms();
                    updated.primary_modified_at = self.clock.epoch_ms();
                    let _ = self.store.upsert_issue(updated).await;
                    info!(project = %project.identifier, identifier = %stored.identifier, phase = "2", from = %stored.status, to = %mapped, outcome = "written", "sync decision");
                }
                Err(e) => {
                    self.log_adapter_error(&project.identifier, &e);
                    result.errors += 1;
                    result.transient_failure |= e.is_transient();
                }
            }
        }
    }

    async fn phase3a_primary_to_local(&self, project: &Project, path: &std::path::Path, primary_issues: &[triad_adapters::PrimaryIssue], result: &mut ProjectCycleResult) {
        for p in primary_issues {
            result.entities += 1;
            let Some(stored) = self.store.get_issue(project.identifier.clone(), p.identifier.clone()).await.ok().flatten() else { continue };

            if stored.local_id.is_none() {
                if self.config.dry_run {
                    result.writes += 1;
                    continue;
                }
                let priority = map_priority_to_local(p.priority);
                match self.local.create_issue(path, &p.title, p.issue_type.as_str(), priority).await {
                    Ok(created) => {
                        let mut updated = stored;
                        updated.local_id = Some(created.id);
                        updated.local_status = Some(map_primary_to_local(p.status).as_str().to_string());
                        let _ = self.store.upsert_issue(updated).await;
                        result.writes += 1;
                        result.phase3 += 1;
                    }
                    Err(e) => {
                        self.log_adapter_error(&project.identifier, &e);
                        result.errors += 1;
                        result.transient_failure |= e.is_transient();
                    }
                }
            } else {
                let desired = map_primary_to_local(p.status);
                if stored.local_status.as_deref() == Some(desired.as_str()) {
                    continue;
                }
                if self.config.dry_run {
                    result.writes += 1;
                    continue;
                }
                let Some(local_id) = stored.local_id.clone() else { continue };
                let outcome = match desired {
                    LocalStatus::Closed => self.local.close_issue(path, &local_id).await,
                    LocalStatus::Open => self.local.reopen_issue(path, &local_id).await,
                };
                match outcome {
                    Ok(()) => {
                        let mut updated = stored;
                        updated.local_status = Some(desired.as_str().to_string());
                        let _ = self.store.upsert_issue(updated).await;
                        result.writes += 1;
                        result.phase3 += 1;
                    }
                    Err(e) => {
                        self.log_adapter_error(&project.identifier, &e);
                        result.errors += 1;
                        result.transient_failure |= e.is_transient();
                    }
                }
            }
        }
    }

    async fn phase3b_local_to_primary(&self, project: &Project, path: &std::path::Path, recently_updated: &HashSet<String>, result: &mut ProjectCycleResult) {
        let local_issues = match self.local.list_issues(path).await {
            Ok(l) => l,
            Err(e) => {
                self.log_adapter_error(&project.identifier, &e);
                result.errors += 1;
                result.transient_failure |= e.is_transient();
                return;
            }
        };

        let stored_issues = self.store.list_issues_for_project(project.identifier.clone()).await.unwrap_or_default();
        let by_local_id: HashMap<String, Issue> = stored_issues.into_iter().filter_map(|i| i.local_id.clone().map(|id| (id, i))).collect();

        for l in local_issues {
            let Some(stored) = by_local_id.get(&l.id) else { continue };
            if recently_updated.contains(&stored.identifier) {
                continue;
            }
            result.entities += 1;

            let Some(local_status) = LocalStatus::parse(&l.status) else {
                result.errors += 1;
                continue;
            };
            let candidate = map_local_to_primary(local_status, stored.status);
            if candidate == stored.status {
                continue;
            }

            if self.config.dry_run {
                result.writes += 1;
                continue;
            }

            match self.primary.update_issue_status(&stored.identifier, candidate).await {
                Ok(()) => {
                    let mut updated = stored.clone();
                    updated.status = candidate;
                    updated.local_status = Some(local_status.as_str().to_string());
                    updated.primary_modified_at = self.clock.epoch_ms();
                    let _ = self.store.upsert_issue(updated).await;
                    result.writes += 1;
                    result.phase3 += 1;
                }
                Err(e) => {
                    self.log_adapter_error(&project.identifier, &e);
                    result.errors += 1;
                    result.transient_failure |= e.is_transient();
                }
            }
        }
    }
}

fn watermark_key(project_identifier: &str) -> String {
    format!("watermark:{project_identifier}")
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
