// SPDX-License-Identifier: MIT

//! Per-project exponential backoff after repeated transient failures.
//!
//! This is operational back-pressure state, not durable sync state: it lives only
//! in the orchestrator's memory and resets on restart, deliberately — a restarted
//! daemon gets a clean slate rather than inheriting a stale backoff schedule.

use std::collections::HashMap;
use std::time::{Duration, Instant};

const BACKOFF_SCHEDULE: [Duration; 3] = [Duration::from_secs(60), Duration::from_secs(5 * 60), Duration::from_secs(15 * 60)];

#[derive(Debug, Clone, Copy, Default)]
struct ProjectFailures {
    consecutive_failed_cycles: u32,
    next_attempt_at: Option<Instant>,
}

/// Tracks consecutive per-cycle failures for each project and computes when the
/// project may next be attempted after three consecutive failures trigger backoff.
#[derive(Debug, Default)]
pub struct BackoffTracker {
    projects: HashMap<String, ProjectFailures>,
}

impl BackoffTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `project_identifier` is currently within its backoff window and
    /// should be skipped for this tick.
    pub fn is_backing_off(&self, project_identifier: &str, now: Instant) -> bool {
        self.projects.get(project_identifier).and_then(|p| p.next_attempt_at).is_some_and(|at| now < at)
    }

    /// Record that a cycle's handling of this project had at least one transient
    /// adapter failure. After the third consecutive failed cycle, schedule backoff.
    pub fn record_failure(&mut self, project_identifier: &str, now: Instant) {
        let entry = self.projects.entry(project_identifier.to_string()).or_default();
        entry.consecutive_failed_cycles += 1;
        if entry.consecutive_failed_cycles >= 3 {
            let step = (entry.consecutive_failed_cycles - 3).min(BACKOFF_SCHEDULE.len() as u32 - 1) as usize;
            entry.next_attempt_at = Some(now + BACKOFF_SCHEDULE[step]);
        }
    }

    /// Record a cycle that completed this project's phases without a transient
    /// failure, clearing its failure streak and any pending backoff.
    pub fn record_success(&mut self, project_identifier: &str) {
        self.projects.remove(project_identifier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fewer_than_three_failures_does_not_back_off() {
        let mut tracker = BackoffTracker::new();
        let now = Instant::now();
        tracker.record_failure("ENG", now);
        tracker.record_failure("ENG", now);
        assert!(!tracker.is_backing_off("ENG", now));
    }

    #[test]
    fn third_consecutive_failure_triggers_one_minute_backoff() {
        let mut tracker = BackoffTracker::new();
        let now = Instant::now();
        tracker.record_failure("ENG", now);
        tracker.record_failure("ENG", now);
        tracker.record_failure("ENG", now);
        assert!(tracker.is_backing_off("ENG", now));
        assert!(!tracker.is_backing_off("ENG", now + Duration::from_secs(61)));
    }

    #[test]
    fn success_clears_the_streak() {
        let mut tracker = BackoffTracker::new();
        let now = Instant::now();
        tracker.record_failure("ENG", now);
        tracker.record_failure("ENG", now);
        tracker.record_failure("ENG", now);
        tracker.record_success("ENG");
        assert!(!tracker.is_backing_off("ENG", now));
    }

    #[test]
    fn unrelated_projects_do_not_share_backoff_state() {
        let mut tracker = BackoffTracker::new();
        let now = Instant::now();
        tracker.record_failure("ENG", now);
        tracker.record_failure("ENG", now);
        tracker.record_failure("ENG", now);
        assert!(!tracker.is_backing_off("OTHER", now));
    }
}
