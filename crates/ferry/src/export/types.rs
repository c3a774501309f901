//! Result and policy types for export runs.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::platform::PlatformError;
use crate::vcs::VcsError;

/// Strategy for handling a destination repository name collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Leave the existing destination repository alone and skip the project.
    Skip,
    /// Delete the existing destination repository, then create it afresh.
    Overwrite,
    /// Treat the collision as a fatal error for the project.
    #[default]
    Fail,
}

impl ConflictPolicy {
    pub const ALL: [ConflictPolicy; 3] = [Self::Skip, Self::Overwrite, Self::Fail];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Overwrite => "overwrite",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip" => Ok(Self::Skip),
            "overwrite" => Ok(Self::Overwrite),
            "fail" => Ok(Self::Fail),
            other => Err(format!(
                "unknown conflict policy '{other}' (expected skip, overwrite or fail)"
            )),
        }
    }
}

/// Which phase of the pipeline an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Searching, cloning and fetching large files from the source.
    Fetch,
    /// Creating the destination repository and pushing to it.
    Push,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => f.write_str("fetch"),
            Self::Push => f.write_str("push"),
        }
    }
}

/// Errors that can end an export task (or, for setup errors, a whole run).
#[derive(Debug, Error)]
pub enum ExportError {
    /// The source platform has no project with the requested name.
    #[error("no project found for '{0}'")]
    ProjectNotFound(String),

    /// Several projects match the requested name and none matches exactly.
    #[error("{candidates} projects match '{name}' and none exactly")]
    ProjectAmbiguous { name: String, candidates: usize },

    /// A clone URL that cannot carry inline credentials.
    #[error("cannot build an authenticated URL from '{url}'")]
    InvalidUrl { url: String },

    /// A platform API error (authentication, conflict, network, ...).
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// A version-control error (clone, large-file fetch, remote, push).
    #[error(transparent)]
    Vcs(#[from] VcsError),

    /// Filesystem error while managing the temporary working root.
    #[error("working directory error: {0}")]
    Io(#[from] std::io::Error),

    /// A task died outside its own error handling (panic).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Terminal state of one export task.
#[derive(Debug)]
pub enum TaskOutcome {
    /// Fetched, created and pushed. `overwrote` records whether an existing
    /// destination repository was deleted and recreated on the way.
    Succeeded { overwrote: bool },
    /// Destination name collision under the skip policy.
    Skipped,
    /// The task aborted; nothing already done is rolled back.
    Failed { phase: Phase, error: ExportError },
}

impl TaskOutcome {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Outcome of one project within a run.
#[derive(Debug)]
pub struct ProjectOutcome {
    /// Source project name.
    pub project: String,
    /// How the task ended.
    pub outcome: TaskOutcome,
}

/// Aggregated result of an export run, one entry per project in completion
/// order (nondeterministic across projects).
#[derive(Debug, Default)]
pub struct ExportSummary {
    pub outcomes: Vec<ProjectOutcome>,
}

impl ExportSummary {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, TaskOutcome::Succeeded { .. }))
            .count()
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, TaskOutcome::Skipped))
            .count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.outcome.is_failure()).count()
    }

    /// True when at least one project failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }
}
