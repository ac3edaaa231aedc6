// SPDX-License-Identifier: MIT

//! Best-effort agent-provisioning event sink.
//!
//! The orchestrator never blocks sync on agent provisioning: it emits events onto a
//! bounded queue and moves on. The queue is a plain `VecDeque` behind a lock rather
//! than a `tokio::mpsc` channel, because the drop-oldest backpressure policy needs
//! the producer side to evict the head of the queue itself — a bounded `mpsc`
//! channel only ever lets the *receiver* do that. When the queue is already at
//! [`QUEUE_CAPACITY`], `emit` pops the oldest queued event before pushing the new
//! one and increments the drop counter. No consumer ships in this crate —
//! `triad-daemon` drains the queue with a sink that writes the per-project
//! sidecar file.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

pub const QUEUE_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningEvent {
    ProjectCreated { project_identifier: String },
    IssueChanged { project_identifier: String, issue_identifier: String },
}

struct Shared {
    queue: Mutex<VecDeque<ProvisioningEvent>>,
    notify: Notify,
    dropped: AtomicU64,
    senders: AtomicUsize,
}

/// The sending half, cloned into the orchestrator. `emit` never blocks: a full
/// queue evicts its oldest entry to make room for the new one.
pub struct EventSink(Arc<Shared>);

impl Clone for EventSink {
    fn clone(&self) -> Self {
        self.0.senders.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(&self.0))
    }
}

impl Drop for EventSink {
    fn drop(&mut self) {
        if self.0.senders.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.notify.notify_one();
        }
    }
}

impl EventSink {
    pub fn dropped_count(&self) -> u64 {
        self.0.dropped.load(Ordering::Relaxed)
    }

    /// Push `event` onto the queue. When the queue is already at [`QUEUE_CAPACITY`],
    /// the oldest queued event is evicted first so the policy is genuinely
    /// drop-oldest rather than drop-newest.
    pub fn emit(&self, event: ProvisioningEvent) {
        let mut queue = self.0.queue.lock();
        if queue.len() >= QUEUE_CAPACITY {
            let evicted = queue.pop_front();
            self.0.dropped.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(dropped_total = self.dropped_count(), ?evicted, "agent provisioning event queue full, dropping oldest");
        }
        queue.push_back(event);
        drop(queue);
        self.0.notify.notify_one();
    }
}

/// The receiving half. Exactly one is handed to whatever consumer a deployment
/// wires up; `triad-daemon`'s provisioning consumer is the only one in this
/// workspace.
pub struct EventReceiver(Arc<Shared>);

/// Returned by [`EventReceiver::try_recv`] when the queue is currently empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TryRecvError;

impl EventReceiver {
    /// Wait for the next event, or return `None` once every [`EventSink`] clone has
    /// been dropped and the queue has drained — mirroring `mpsc::Receiver::recv`'s
    /// closed-channel semantics. Cancel-safe: cancelling this future before it
    /// resolves never removes an event from the queue.
    pub async fn recv(&mut self) -> Option<ProvisioningEvent> {
        loop {
            let notified = self.0.notify.notified();
            if let Some(event) = self.0.queue.lock().pop_front() {
                return Some(event);
            }
            if self.0.senders.load(Ordering::SeqCst) == 0 {
                return None;
            }
            notified.await;
        }
    }

    /// Pop the next event without waiting.
    pub fn try_recv(&mut self) -> Result<ProvisioningEvent, TryRecvError> {
        self.0.queue.lock().pop_front().ok_or(TryRecvError)
    }
}

/// Create a bounded channel pair: an [`EventSink`] for the orchestrator and an
/// [`EventReceiver`] for whatever consumer a deployment wires up.
pub fn channel() -> (EventSink, EventReceiver) {
    let shared = Arc::new(Shared {
        queue: Mutex::new(VecDeque::with_capacity(QUEUE_CAPACITY)),
        notify: Notify::new(),
        dropped: AtomicU64::new(0),
        senders: AtomicUsize::new(1),
    });
    (EventSink(Arc::clone(&shared)), EventReceiver(shared))
}
