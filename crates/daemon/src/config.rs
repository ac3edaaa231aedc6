// SPDX-License-Identifier: MIT

//! Centralized environment variable access and the resolved [`Config`] struct.
//!
//! Every value the daemon needs comes from the environment, read once at startup.
//! Missing `PRIMARY_API_URL`/`PRIMARY_TOKEN`/`BOARD_API_URL`/`BOARD_TOKEN` is a
//! fatal startup error; everything else has a default.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PRIMARY_API_URL is required")]
    MissingPrimaryApiUrl,
    #[error("PRIMARY_TOKEN is required")]
    MissingPrimaryToken,
    #[error("BOARD_API_URL is required")]
    MissingBoardApiUrl,
    #[error("BOARD_TOKEN is required")]
    MissingBoardToken,
    #[error("{name} has an invalid value {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub primary_api_url: String,
    pub primary_token: String,
    pub board_api_url: String,
    pub board_token: String,
    pub local_cli_path: PathBuf,
    pub stacks_dir: Option<PathBuf>,
    pub sync_interval: Duration,
    pub incremental_sync: bool,
    pub parallel_sync: bool,
    pub max_workers: usize,
    pub dry_run: bool,
    pub skip_empty_projects: bool,
    pub health_port: u16,
    pub project_allowlist: HashSet<String>,
    pub state_db_path: PathBuf,
    pub request_timeout: Duration,
}

const DEFAULT_LOCAL_CLI_PATH: &str = "bd";
const DEFAULT_SYNC_INTERVAL_MS: u64 = 30_000;
const DEFAULT_MAX_WORKERS: usize = 4;
const DEFAULT_HEALTH_PORT: u16 = 8080;
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

impl Config {
    /// Load and validate configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let primary_api_url = non_empty_var("PRIMARY_API_URL").ok_or(ConfigError::MissingPrimaryApiUrl)?;
        let primary_token = non_empty_var("PRIMARY_TOKEN").ok_or(ConfigError::MissingPrimaryToken)?;
        let board_api_url = non_empty_var("BOARD_API_URL").ok_or(ConfigError::MissingBoardApiUrl)?;
        let board_token = non_empty_var("BOARD_TOKEN").ok_or(ConfigError::MissingBoardToken)?;

        let local_cli_path = non_empty_var("LOCAL_CLI_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCAL_CLI_PATH));
        let stacks_dir = non_empty_var("STACKS_DIR").map(PathBuf::from);

        let sync_interval = duration_ms_var("SYNC_INTERVAL_MS", DEFAULT_SYNC_INTERVAL_MS)?;
        let incremental_sync = bool_var("INCREMENTAL_SYNC", false)?;
        let parallel_sync = bool_var("PARALLEL_SYNC", false)?;
        let max_workers = usize_var("MAX_WORKERS", DEFAULT_MAX_WORKERS)?;
        let dry_run = bool_var("DRY_RUN", false)?;
        let skip_empty_projects = bool_var("SKIP_EMPTY_PROJECTS", false)?;
        let health_port = u16_var("HEALTH_PORT", DEFAULT_HEALTH_PORT)?;

        let project_allowlist = non_empty_var("PROJECT_ALLOWLIST")
            .map(|raw| raw.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        let state_db_path = non_empty_var("STATE_DB_PATH").map(PathBuf::from).unwrap_or_else(|| {
            let root = stacks_dir.clone().unwrap_or_else(|| PathBuf::from("."));
            root.join("logs").join("sync-state.db")
        });

        Ok(Self {
            primary_api_url,
            primary_token,
            board_api_url,
            board_token,
            local_cli_path,
            stacks_dir,
            sync_interval,
            incremental_sync,
            parallel_sync,
            max_workers,
            dry_run,
            skip_empty_projects,
            health_port,
            project_allowlist,
            state_db_path,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// An [`OrchestratorConfig`](triad_engine::OrchestratorConfig) derived from this config.
    pub fn orchestrator_config(&self) -> triad_engine::OrchestratorConfig {
        triad_engine::OrchestratorConfig {
            dry_run: self.dry_run,
            skip_empty_projects: self.skip_empty_projects,
            project_allowlist: self.project_allowlist.clone(),
            stacks_dir: self.stacks_dir.clone(),
            incremental_sync: self.incremental_sync,
            max_workers: if self.parallel_sync { Some(self.max_workers) } else { None },
            request_timeout: self.request_timeout,
            cycle_deadline: self.request_timeout * 10,
            max_consecutive_cycle_failures: 10,
        }
    }

    /// A copy of this config with secrets redacted, suitable for `triadd config show`.
    pub fn redacted(&self) -> RedactedConfig {
        RedactedConfig {
            primary_api_url: self.primary_api_url.clone(),
            primary_token: redact(&self.primary_token),
            board_api_url: self.board_api_url.clone(),
            board_token: redact(&self.board_token),
            local_cli_path: self.local_cli_path.clone(),
            stacks_dir: self.stacks_dir.clone(),
            sync_interval_ms: self.sync_interval.as_millis() as u64,
            incremental_sync: self.incremental_sync,
            parallel_sync: self.parallel_sync,
            max_workers: self.max_workers,
            dry_run: self.dry_run,
            skip_empty_projects: self.skip_empty_projects,
            health_port: self.health_port,
            project_allowlist: self.project_allowlist.iter().cloned().collect(),
            state_db_path: self.state_db_path.clone(),
        }
    }
}

fn redact(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "<redacted>".to_string()
    }
}

/// [`Config`] with `primary_token`/`board_token` replaced by a fixed placeholder,
/// safe to print or log.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RedactedConfig {
    pub primary_api_url: String,
    pub primary_token: String,
    pub board_api_url: String,
    pub board_token: String,
    pub local_cli_path: PathBuf,
    pub stacks_dir: Option<PathBuf>,
    pub sync_interval_ms: u64,
    pub incremental_sync: bool,
    pub parallel_sync: bool,
    pub max_workers: usize,
    pub dry_run: bool,
    pub skip_empty_projects: bool,
    pub health_port: u16,
    pub project_allowlist: Vec<String>,
    pub state_db_path: PathBuf,
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn bool_var(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match non_empty_var(name) {
        None => Ok(default),
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue { name, value: raw }),
        },
    }
}

fn usize_var(name: &'static str, default: usize) -> Result<usize, ConfigError> {
    match non_empty_var(name) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue { name, value: raw }),
    }
}

fn u16_var(name: &'static str, default: u16) -> Result<u16, ConfigError> {
    match non_empty_var(name) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue { name, value: raw }),
    }
}

fn duration_ms_var(name: &'static str, default_ms: u64) -> Result<Duration, ConfigError> {
    match non_empty_var(name) {
        None => Ok(Duration::from_millis(default_ms)),
        Some(raw) => raw
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
