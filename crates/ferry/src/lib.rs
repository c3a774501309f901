//! Ferry - exports repositories from GitLab to GitHub.
//!
//! A run takes a batch of project names, locates each one on the source
//! platform, clones it (including git-lfs content), creates the
//! corresponding repository on the destination platform, and pushes the
//! clone there. Projects are exported concurrently with per-project progress
//! reporting and failure isolation: one project failing never aborts the
//! rest of the batch.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ferry::{ExportOptions, Exporter, GitCli, GithubClient, GitlabClient, NullSink};
//!
//! let source = Arc::new(GitlabClient::new("gitlab.com", gitlab_token)?);
//! let destination = Arc::new(GithubClient::new(github_token)?);
//! let exporter = Exporter::new(source, destination, Arc::new(GitCli::new()), ExportOptions::default());
//!
//! let summary = exporter.run(&projects, Arc::new(NullSink)).await?;
//! for outcome in &summary.outcomes {
//!     println!("{}: {:?}", outcome.project, outcome.outcome);
//! }
//! ```

pub mod export;
pub mod github;
pub mod gitlab;
pub mod http;
pub mod platform;
pub mod vcs;

pub use export::{
    ConflictPolicy, ExportError, ExportOptions, ExportSummary, Exporter, NullSink, Phase,
    ProgressPool, ProgressReporter, ProgressSink, ProgressSnapshot, ProjectOutcome, TASK_TICKS,
    TaskOutcome,
};
pub use github::GithubClient;
pub use gitlab::GitlabClient;
pub use platform::{PlatformClient, PlatformError, short_error_message};
pub use vcs::{GitCli, Vcs, VcsError, WorkingCopy};
