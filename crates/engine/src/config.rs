// SPDX-License-Identifier: MIT

//! Orchestrator-level configuration. `triad-daemon` is responsible for loading
//! these values from the environment and validating them before startup; this
//! crate only consumes the resolved struct.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// When set, writes are suppressed and decisions are logged as if executed.
    pub dry_run: bool,
    /// Drop Primary projects with zero observed issues from the active set.
    pub skip_empty_projects: bool,
    /// Restrict sync to these Primary project identifiers. Empty means "all".
    pub project_allowlist: HashSet<String>,
    /// Filesystem root scanned for per-project `<identifier>/.local/` markers.
    /// `None` disables Phase 3a/3b entirely (no filesystem_path is ever resolved).
    pub stacks_dir: Option<PathBuf>,
    /// Use `modified_after` watermarks to restrict Primary issue listings.
    pub incremental_sync: bool,
    /// Per-project fanout inside a cycle. `None` disables parallelism (phases for
    /// different projects still run sequentially).
    pub max_workers: Option<usize>,
    /// Per-adapter-call timeout.
    pub request_timeout: Duration,
    /// Overall cycle deadline; default is 10x `request_timeout`.
    pub cycle_deadline: Duration,
    /// Fatal-error threshold: unreachable adapter for this many consecutive
    /// cycles marks the cycle fatal rather than merely degraded.
    pub max_consecutive_cycle_failures: u32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        let request_timeout = Duration::from_secs(30);
        Self {
            dry_run: false,
            skip_empty_projects: false,
            project_allowlist: HashSet::new(),
            stacks_dir: None,
            incremental_sync: false,
            max_workers: None,
            cycle_deadline: request_timeout * 10,
            request_timeout,
            max_consecutive_cycle_failures: 10,
        }
    }
}

impl OrchestratorConfig {
    pub fn is_active_project(&self, identifier: &str) -> bool {
        self.project_allowlist.is_empty() || self.project_allowlist.contains(identifier)
    }
}
