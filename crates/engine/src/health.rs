// SPDX-License-Identifier: MIT

//! Shared health state, updated at the end of every cycle and read by the
//! `/health` HTTP handler in `triad-daemon`. The handler only ever reads this; it
//! never blocks on the orchestrator.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Error rate above which a completed cycle is `degraded` rather than `healthy`.
pub const ERROR_RATE_DEGRADED_THRESHOLD: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Summary of one completed (or aborted) cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleSummary {
    pub started_at: i64,
    pub duration_ms: i64,
    pub phase1_count: u64,
    pub phase2_count: u64,
    pub phase3_count: u64,
    pub errors: u64,
    pub entities_considered: u64,
    pub writes_succeeded: u64,
    pub completed: bool,
}

impl CycleSummary {
    pub fn error_rate(&self) -> f64 {
        if self.entities_considered == 0 {
            0.0
        } else {
            self.errors as f64 / self.entities_considered as f64
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Inner {
    last_cycle: Option<CycleSummary>,
    consecutive_cycles_with_no_writes: u32,
}

/// Shared, lock-protected health state. Cheap to clone; every clone refers to the
/// same underlying state.
#[derive(Clone, Default)]
pub struct HealthState(Arc<Mutex<Inner>>);

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed cycle's summary and update the rolling no-writes streak
    /// used by the `unhealthy` rule (zero successful writes over 3 consecutive cycles).
    pub fn record_cycle(&self, summary: CycleSummary) {
        let mut inner = self.0.lock();
        if summary.completed && summary.writes_succeeded == 0 {
            inner.consecutive_cycles_with_no_writes += 1;
        } else {
            inner.consecutive_cycles_with_no_writes = 0;
        }
        inner.last_cycle = Some(summary);
    }

    pub fn last_cycle(&self) -> Option<CycleSummary> {
        self.0.lock().last_cycle.clone()
    }

    pub fn status(&self) -> Status {
        let inner = self.0.lock();
        let Some(last) = &inner.last_cycle else {
            return Status::Unhealthy;
        };
        if !last.completed {
            return Status::Unhealthy;
        }
        if inner.consecutive_cycles_with_no_writes >= 3 {
            return Status::Unhealthy;
        }
        if last.error_rate() > ERROR_RATE_DEGRADED_THRESHOLD {
            return Status::Degraded;
        }
        Status::Healthy
    }
}

/// The full `/health` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: Status,
    pub last_cycle: Option<CycleSummary>,
}

impl HealthState {
    pub fn report(&self) -> HealthReport {
        HealthReport { status: self.status(), last_cycle: self.last_cycle() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(completed: bool, errors: u64, entities: u64, writes: u64) -> CycleSummary {
        CycleSummary { entities_considered: entities, errors, writes_succeeded: writes, completed, ..Default::default() }
    }

    #[test]
    fn no_cycle_yet_is_unhealthy() {
        assert_eq!(HealthState::new().status(), Status::Unhealthy);
    }

    #[test]
    fn completed_clean_cycle_is_healthy() {
        let health = HealthState::new();
        health.record_cycle(summary(true, 0, 10, 10));
        assert_eq!(health.status(), Status::Healthy);
    }

    #[test]
    fn incomplete_cycle_is_unhealthy() {
        let health = HealthState::new();
        health.record_cycle(summary(false, 0, 10, 0));
        assert_eq!(health.status(), Status::Unhealthy);
    }

    #[test]
    fn high_error_rate_is_degraded() {
        let health = HealthState::new();
        health.record_cycle(summary(true, 2, 10, 8));
        assert_eq!(health.status(), Status::Degraded);
    }

    #[test]
    fn three_consecutive_zero_write_cycles_is_unhealthy() {
        let health = HealthState::new();
        health.record_cycle(summary(true, 0, 10, 0));
        health.record_cycle(summary(true, 0, 10, 0));
        assert_eq!(health.status(), Status::Healthy);
        health.record_cycle(summary(true, 0, 10, 0));
        assert_eq!(health.status(), Status::Unhealthy);
    }

    #[test]
    fn a_write_resets_the_no_write_streak() {
        let health = HealthState::new();
        health.record_cycle(summary(true, 0, 10, 0));
        health.record_cycle(summary(true, 0, 10, 0));
        health.record_cycle(summary(true, 0, 10, 1));
        health.record_cycle(summary(true, 0, 10, 0));
        health.record_cycle(summary(true, 0, 10, 0));
        assert_eq!(health.status(), Status::Healthy);
    }
}
