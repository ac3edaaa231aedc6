// SPDX-License-Identifier: MIT

//! Assembles a [`Config`] into a runnable [`Daemon`]: the state store, the three
//! concrete adapters, the orchestrator, the scheduler, the health server, and the
//! provisioning consumer, all wired together the way `triadd run` needs them.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;
use triad_adapters::{CliLocalAdapter, HttpBoardAdapter, HttpPrimaryAdapter};
use triad_core::SystemClock;
use triad_engine::{event_channel, HealthState, Orchestrator, Scheduler, StoreHandle};
use triad_storage::Store;

use crate::config::Config;
use crate::error::DaemonError;

/// The concrete orchestrator this daemon runs: one HTTP adapter per remote
/// backend, a CLI adapter for Local, and the system wall clock.
pub type ConfiguredOrchestrator = Orchestrator<HttpPrimaryAdapter, HttpBoardAdapter, CliLocalAdapter, SystemClock>;
pub type ConfiguredScheduler = Scheduler<HttpPrimaryAdapter, HttpBoardAdapter, CliLocalAdapter, SystemClock>;

/// A fully wired daemon, ready to run the scheduler and (optionally) the health
/// server until `cancel` fires.
pub struct Daemon {
    scheduler: ConfiguredScheduler,
    health: HealthState,
    health_port: u16,
    cancel: CancellationToken,
    provisioning: tokio::task::JoinHandle<()>,
}

impl Daemon {
    /// Build every component from `config`. The only fallible steps are opening
    /// the state store and constructing the HTTP adapters (a malformed base URL);
    /// both are startup errors.
    pub fn build(config: &Config, cancel: CancellationToken) -> Result<Self, DaemonError> {
        let store = Store::open(&config.state_db_path)?;
        let store = StoreHandle::new(store);

        let primary = HttpPrimaryAdapter::new(config.primary_api_url.clone(), config.primary_token.clone(), config.request_timeout)?;
        let board = HttpBoardAdapter::new(config.board_api_url.clone(), config.board_token.clone(), config.request_timeout)?;
        let local = CliLocalAdapter::new(config.local_cli_path.clone());

        let health = HealthState::new();
        let (events, rx) = event_channel();

        let provisioning = tokio::spawn(crate::provisioning::drain(rx, store.clone(), cancel.clone()));

        let orchestrator = ConfiguredOrchestrator::new(primary, board, local, store, SystemClock, config.orchestrator_config(), health.clone(), events);
        let interval = config.sync_interval.max(MIN_SYNC_INTERVAL);
        let scheduler = Scheduler::new(orchestrator, interval, cancel.clone());

        Ok(Self { scheduler, health, health_port: config.health_port, cancel, provisioning })
    }

    pub fn health(&self) -> HealthState {
        self.health.clone()
    }

    /// Run exactly one cycle to completion and return its summary. Used by
    /// `triadd cycle`.
    pub async fn run_once(&self) -> triad_engine::HealthReport {
        self.scheduler.run_once().await;
        self.health.report()
    }

    /// Run the scheduler (and, unless `health_port` is `0`, the `/health` server)
    /// until `cancel` fires, then join the provisioning consumer. Used by
    /// `triadd run`.
    pub async fn run(self) -> Result<(), DaemonError> {
        let health_task: Option<tokio::task::JoinHandle<std::io::Result<()>>> = if self.health_port != 0 {
            let health = self.health.clone();
            let cancel = self.cancel.clone();
            let port = self.health_port;
            Some(tokio::spawn(async move { crate::health_server::serve(port, health, cancel).await }))
        } else {
            info!("HEALTH_PORT=0, health endpoint disabled");
            None
        };

        self.scheduler.run().await;

        if let Some(task) = health_task {
            if let Ok(Err(e)) = task.await {
                return Err(DaemonError::Health(e));
            }
        }

        let _ = self.provisioning.await;
        Ok(())
    }
}

/// Install a `SIGINT`/`SIGTERM` (Unix) or Ctrl-C (everywhere else) listener that
/// fires `cancel` once, the way a graceful-shutdown daemon is expected to.
pub async fn wait_for_shutdown_signal(cancel: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(_) => return,
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("shutdown signal received");
    cancel.cancel();
}

/// Minimum interval clamp so a misconfigured `SYNC_INTERVAL_MS=0` cannot spin the
/// scheduler into a busy loop.
pub const MIN_SYNC_INTERVAL: Duration = Duration::from_millis(100);
