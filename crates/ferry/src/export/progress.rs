//! Per-task progress reporters and the pool that renders them.
//!
//! Each export task owns exactly one [`ProgressReporter`] and is its only
//! writer; the [`ProgressPool`] polls every reporter on a timer and hands
//! snapshots to a [`ProgressSink`] for rendering. The pool's loop exits once
//! every reporter is finished, which the engine guarantees by force-finishing
//! reporters on every task exit path (including panics).

use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Fixed tick total for one export task: search, clone, large-file fetch,
/// create, push.
pub const TASK_TICKS: u64 = 5;

/// Default render poll interval.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug)]
struct ReporterState {
    current: u64,
    label: String,
}

/// Read-only view of a reporter, taken under its lock.
#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    /// Project name the reporter was registered under.
    pub name: String,
    /// Ticks completed so far.
    pub current: u64,
    /// Fixed tick total.
    pub total: u64,
    /// Current status label.
    pub label: String,
    /// True once `current == total`; never regresses.
    pub finished: bool,
}

/// A named tick counter with a mutable status label.
///
/// Cheap to clone; all clones share state. Mutated only by the owning export
/// task, read by the pool's render loop.
#[derive(Clone)]
pub struct ProgressReporter {
    name: Arc<str>,
    total: u64,
    state: Arc<Mutex<ReporterState>>,
}

impl ProgressReporter {
    fn new(name: &str, total: u64) -> Self {
        Self {
            name: Arc::from(name),
            total,
            state: Arc::new(Mutex::new(ReporterState {
                current: 0,
                label: String::new(),
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ReporterState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Advance the counter by one tick, saturating at the total.
    pub fn tick(&self) {
        let mut state = self.lock();
        state.current = (state.current + 1).min(self.total);
    }

    /// Replace the status label.
    pub fn set_label(&self, label: &str) {
        self.lock().label = label.to_string();
    }

    /// Set the counter to the total and the label in one step, so a reader
    /// never observes "finished" alongside a stale label.
    pub fn finish_with_label(&self, label: &str) {
        let mut state = self.lock();
        state.current = self.total;
        state.label = label.to_string();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.lock().current == self.total
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        let state = self.lock();
        ProgressSnapshot {
            name: self.name.to_string(),
            current: state.current,
            total: self.total,
            label: state.label.clone(),
            finished: state.current == self.total,
        }
    }
}

/// Rendering protocol for a run's progress.
///
/// `render` is called on every poll with a snapshot of every reporter, in
/// registration order; `done` is called exactly once after the last poll.
/// Implementations must not block: the pool is a side-effecting consumer and
/// must never delay producer tasks.
pub trait ProgressSink: Send + Sync {
    fn render(&self, snapshots: &[ProgressSnapshot]);

    fn done(&self, _snapshots: &[ProgressSnapshot]) {}
}

/// Sink that renders nothing. For tests and quiet modes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn render(&self, _snapshots: &[ProgressSnapshot]) {}
}

/// Owns all reporters for one run and drives their periodic refresh.
pub struct ProgressPool {
    reporters: Mutex<Vec<ProgressReporter>>,
    poll_interval: Duration,
}

impl ProgressPool {
    #[must_use]
    pub fn new() -> Self {
        Self::with_poll_interval(POLL_INTERVAL)
    }

    #[must_use]
    pub fn with_poll_interval(poll_interval: Duration) -> Self {
        Self {
            reporters: Mutex::new(Vec::new()),
            poll_interval,
        }
    }

    /// Register a new reporter with the fixed per-task tick total.
    ///
    /// Registration happens during single-threaded run setup, before any
    /// task starts.
    pub fn register(&self, name: &str) -> ProgressReporter {
        let reporter = ProgressReporter::new(name, TASK_TICKS);
        self.reporters
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(reporter.clone());
        reporter
    }

    /// Snapshot every registered reporter, in registration order.
    #[must_use]
    pub fn snapshots(&self) -> Vec<ProgressSnapshot> {
        self.reporters
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(ProgressReporter::snapshot)
            .collect()
    }

    /// Render loop: poll on a timer until every reporter is finished, then
    /// render a final frame and exit. A pool with no reporters exits on the
    /// first poll.
    pub async fn run(self: Arc<Self>, sink: Arc<dyn ProgressSink>) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        loop {
            ticker.tick().await;
            let snapshots = self.snapshots();
            sink.render(&snapshots);
            if snapshots.iter().all(|s| s.finished) {
                sink.done(&snapshots);
                return;
            }
        }
    }
}

impl Default for ProgressPool {
    fn default() -> Self {
        Self::new()
    }
}
