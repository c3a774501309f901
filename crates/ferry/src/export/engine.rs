//! The export orchestrator.
//!
//! Builds one export task per project plus one progress-pool render task,
//! launches them all concurrently, and waits for everything to finish. A
//! failure in one task never cancels or blocks the others; the run returns
//! an aggregated per-project summary instead of the first error.

use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinSet;

use super::progress::{ProgressPool, ProgressSink};
use super::task::ExportTask;
use super::types::{
    ConflictPolicy, ExportError, ExportSummary, Phase, ProjectOutcome, TaskOutcome,
};
use crate::platform::PlatformClient;
use crate::vcs::Vcs;

/// Options for an export run.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Behavior when the destination repository name already exists.
    pub conflict_policy: ConflictPolicy,
    /// Prefix prepended to every destination repository name.
    pub prefix: String,
    /// Parent directory for the temporary working root. Defaults to the
    /// system temp directory.
    pub tmp_dir: Option<PathBuf>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            conflict_policy: ConflictPolicy::default(),
            prefix: "github_".to_string(),
            tmp_dir: None,
        }
    }
}

/// Orchestrator for a batch of project exports.
pub struct Exporter {
    source: Arc<dyn PlatformClient>,
    destination: Arc<dyn PlatformClient>,
    vcs: Arc<dyn Vcs>,
    options: ExportOptions,
}

impl Exporter {
    pub fn new(
        source: Arc<dyn PlatformClient>,
        destination: Arc<dyn PlatformClient>,
        vcs: Arc<dyn Vcs>,
        options: ExportOptions,
    ) -> Self {
        Self {
            source,
            destination,
            vcs,
            options,
        }
    }

    /// Export every named project, rendering progress through `sink`.
    ///
    /// Per-project failures are folded into the returned summary; only setup
    /// failures (temporary root, destination authentication) abort the run
    /// itself. The temporary working root is removed on every exit path.
    pub async fn run(
        &self,
        projects: &[String],
        sink: Arc<dyn ProgressSink>,
    ) -> Result<ExportSummary, ExportError> {
        let work_root = match &self.options.tmp_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                tempfile::Builder::new().prefix("ferry-").tempdir_in(dir)?
            }
            None => tempfile::Builder::new().prefix("ferry-").tempdir()?,
        };

        // Resolved once, shared immutably by every task. A bad destination
        // credential fails the run before any clone starts.
        let destination_login = self.destination.current_user().await?.login;
        tracing::debug!(login = %destination_login, "resolved destination user");

        let pool = Arc::new(ProgressPool::new());
        let mut tasks = Vec::with_capacity(projects.len());
        for project in projects {
            let reporter = pool.register(project);
            tasks.push((
                reporter.clone(),
                ExportTask {
                    source: Arc::clone(&self.source),
                    destination: Arc::clone(&self.destination),
                    vcs: Arc::clone(&self.vcs),
                    reporter,
                    project: project.clone(),
                    destination_name: format!("{}{}", self.options.prefix, project),
                    destination_login: destination_login.clone(),
                    policy: self.options.conflict_policy,
                    work_root: work_root.path().to_path_buf(),
                },
            ));
        }

        let pool_task = tokio::spawn(Arc::clone(&pool).run(sink));

        let mut set = JoinSet::new();
        for (reporter, task) in tasks {
            let project = task.project.clone();
            set.spawn(async move {
                match AssertUnwindSafe(task.run()).catch_unwind().await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        // The panicking task skipped its own reporter
                        // cleanup; the pool still needs the reporter
                        // finished to terminate.
                        let phase = if reporter.snapshot().current < 3 {
                            Phase::Fetch
                        } else {
                            Phase::Push
                        };
                        reporter.finish_with_label("FAILED: task panicked");
                        ProjectOutcome {
                            project,
                            outcome: TaskOutcome::Failed {
                                phase,
                                error: ExportError::Internal("task panicked".to_string()),
                            },
                        }
                    }
                }
            });
        }

        let mut summary = ExportSummary::default();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(outcome) => summary.outcomes.push(outcome),
                Err(join_error) => {
                    tracing::warn!(error = %join_error, "export task abandoned");
                }
            }
        }

        if pool_task.await.is_err() {
            tracing::warn!("progress render task panicked");
        }

        Ok(summary)
    }
}
