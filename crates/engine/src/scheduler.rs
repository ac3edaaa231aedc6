// SPDX-License-Identifier: MIT

//! Periodic, single-flight runner for the [`Orchestrator`](crate::orchestrator::Orchestrator).
//!
//! A tick that arrives while the previous cycle is still running is skipped (logged),
//! never queued — reconciliation decisions depend on the prior cycle's writes, so two
//! cycles for the same projects must never overlap.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::health::CycleSummary;
use crate::orchestrator::Orchestrator;

/// Drives one `Orchestrator` on a fixed interval until cancelled.
pub struct Scheduler<P, B, L, C> {
    orchestrator: Mutex<Orchestrator<P, B, L, C>>,
    interval: Duration,
    cancel: CancellationToken,
}

impl<P, B, L, C> Scheduler<P, B, L, C>
where
    P: triad_adapters::PrimaryAdapter,
    B: triad_adapters::BoardAdapter,
    L: triad_adapters::LocalAdapter,
    C: triad_core::Clock,
{
    pub fn new(orchestrator: Orchestrator<P, B, L, C>, interval: Duration, cancel: CancellationToken) -> Self {
        Self { orchestrator: Mutex::new(orchestrator), interval, cancel }
    }

    /// Run one cycle immediately, bypassing the interval. Used by the CLI's `cycle`
    /// subcommand and by the first tick of [`Self::run`].
    pub async fn run_once(&self) -> CycleSummary {
        self.orchestrator.lock().await.run_cycle().await
    }

    /// Run cycles on the configured interval until `cancel` fires. A tick that finds
    /// a cycle still in flight is skipped rather than queued.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.orchestrator.try_lock() {
                        Ok(mut guard) => {
                            let summary = guard.run_cycle().await;
                            info!(writes = summary.writes_succeeded, errors = summary.errors, "scheduled cycle finished");
                        }
                        Err(_) => {
                            warn!("previous cycle still running, skipping this tick");
                        }
                    }
                }
                _ = self.cancel.cancelled() => {
                    info!("shutdown requested, waiting for in-flight cycle to finish");
                    let grace = self.interval * 2;
                    if tokio::time::timeout(grace, self.orchestrator.lock()).await.is_err() {
                        warn!(grace_secs = grace.as_secs(), "in-flight cycle did not finish within the shutdown grace period");
                    }
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
