//! The multi-project export pipeline.
//!
//! One [`task::ExportTask`] per project runs a two-phase pipeline (fetch
//! from the source platform, push to the destination platform) while
//! reporting ticks to its [`progress::ProgressReporter`]. The
//! [`engine::Exporter`] fans the tasks out concurrently, alongside one
//! [`progress::ProgressPool`] render loop, and collects per-project
//! outcomes with failure isolation.

pub mod engine;
pub mod progress;
pub mod task;
mod types;

#[cfg(test)]
pub(crate) mod testkit;

pub use engine::{ExportOptions, Exporter};
pub use progress::{
    NullSink, ProgressPool, ProgressReporter, ProgressSink, ProgressSnapshot, TASK_TICKS,
};
pub use types::{ConflictPolicy, ExportError, ExportSummary, Phase, ProjectOutcome, TaskOutcome};
