use super::*;
use std::time::Duration as StdDuration;
use triad_adapters::{FakeBoardAdapter, FakeLocalAdapter, FakePrimaryAdapter};
use triad_core::FakeClock;
use triad_storage::Store;

use crate::config::OrchestratorConfig;
use crate::event;
use crate::health::HealthState;
use crate::store_handle::StoreHandle;

fn scheduler(cancel: CancellationToken) -> Scheduler<FakePrimaryAdapter, FakeBoardAdapter, FakeLocalAdapter, FakeClock> {
    let store = StoreHandle::new(Store::open_in_memory().unwrap());
    let (events, _rx) = event::channel();
    let orchestrator = Orchestrator::new(
        FakePrimaryAdapter::new(),
        FakeBoardAdapter::new(),
        FakeLocalAdapter::new(),
        store,
        FakeClock::new(),
        OrchestratorConfig::default(),
        HealthState::new(),
        events,
    );
    Scheduler::new(orchestrator, StdDuration::from_millis(10), cancel)
}

#[tokio::test]
async fn run_once_completes_a_cycle_with_no_projects() {
    let sched = scheduler(CancellationToken::new());
    let summary = sched.run_once().await;
    assert!(summary.completed);
    assert_eq!(summary.entities_considered, 0);
}

#[tokio::test]
async fn run_stops_promptly_after_cancellation() {
    let cancel = CancellationToken::new();
    let sched = scheduler(cancel.clone());

    let handle = tokio::spawn(async move {
        sched.run().await;
    });

    cancel.cancel();
    tokio::time::timeout(StdDuration::from_secs(1), handle).await.expect("scheduler did not stop after cancellation").unwrap();
}
