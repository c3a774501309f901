//! Integration tests for export runs.
//!
//! These drive the public API end to end against in-memory platform and VCS
//! implementations, and are timeout-guarded so a progress pool that never
//! terminates or a task deadlock shows up as a failure rather than a hang.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use ferry::platform::{self, CreateRepoOptions, SourceProject, UserIdentity};
use ferry::vcs::VcsError;
use ferry::{
    ConflictPolicy, ExportOptions, ExportSummary, Exporter, NullSink, Phase, PlatformClient,
    PlatformError, TaskOutcome, Vcs, WorkingCopy,
};

/// Maximum time any export run should take in tests.
const RUN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<String>>>);

impl Recorder {
    fn note(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn count(&self, prefix: &str) -> usize {
        self.entries().iter().filter(|e| e.starts_with(prefix)).count()
    }
}

struct FakeGitlab {
    projects: Vec<SourceProject>,
    recorder: Recorder,
}

#[async_trait]
impl PlatformClient for FakeGitlab {
    fn host(&self) -> &str {
        "gitlab.example.com"
    }

    fn token(&self) -> &str {
        "glpat-secret"
    }

    async fn current_user(&self) -> platform::Result<UserIdentity> {
        Ok(UserIdentity {
            login: "mia".to_string(),
            name: None,
        })
    }

    async fn search_projects(&self, name: &str) -> platform::Result<Vec<SourceProject>> {
        self.recorder.note(format!("search:{name}"));
        Ok(self
            .projects
            .iter()
            .filter(|p| p.name.contains(name))
            .cloned()
            .collect())
    }

    async fn list_projects(&self) -> platform::Result<Vec<SourceProject>> {
        Ok(self.projects.clone())
    }

    async fn create_repo(&self, _: &str, _: &CreateRepoOptions) -> platform::Result<()> {
        unreachable!("the source platform never creates repositories in an export")
    }

    async fn delete_repo(&self, _: &str, _: &str) -> platform::Result<()> {
        unreachable!("the source platform never deletes repositories in an export")
    }
}

struct FakeGithub {
    existing: Mutex<HashSet<String>>,
    recorder: Recorder,
}

#[async_trait]
impl PlatformClient for FakeGithub {
    fn host(&self) -> &str {
        "github.example.com"
    }

    fn token(&self) -> &str {
        "ghp-secret"
    }

    async fn current_user(&self) -> platform::Result<UserIdentity> {
        Ok(UserIdentity {
            login: "octocat".to_string(),
            name: None,
        })
    }

    async fn search_projects(&self, _: &str) -> platform::Result<Vec<SourceProject>> {
        Ok(Vec::new())
    }

    async fn list_projects(&self) -> platform::Result<Vec<SourceProject>> {
        Ok(Vec::new())
    }

    async fn create_repo(&self, name: &str, _: &CreateRepoOptions) -> platform::Result<()> {
        self.recorder.note(format!("create:{name}"));
        let mut existing = self.existing.lock().unwrap();
        if existing.contains(name) {
            return Err(PlatformError::conflict(name));
        }
        existing.insert(name.to_string());
        Ok(())
    }

    async fn delete_repo(&self, owner: &str, name: &str) -> platform::Result<()> {
        self.recorder.note(format!("delete:{owner}/{name}"));
        if self.existing.lock().unwrap().remove(name) {
            Ok(())
        } else {
            Err(PlatformError::not_found(format!("{owner}/{name}")))
        }
    }
}

struct FakeVcs {
    recorder: Recorder,
}

#[async_trait]
impl Vcs for FakeVcs {
    async fn clone_repo(&self, _url: &str, dest: &Path) -> Result<Box<dyn WorkingCopy>, VcsError> {
        let name = dest.file_name().unwrap().to_string_lossy().to_string();
        self.recorder.note(format!("clone:{name}"));
        Ok(Box::new(FakeWorkingCopy {
            path: dest.to_path_buf(),
            recorder: self.recorder.clone(),
        }))
    }
}

struct FakeWorkingCopy {
    path: PathBuf,
    recorder: Recorder,
}

#[async_trait]
impl WorkingCopy for FakeWorkingCopy {
    fn path(&self) -> &Path {
        &self.path
    }

    async fn fetch_lfs_all(&self) -> Result<(), VcsError> {
        self.recorder.note("lfs");
        Ok(())
    }

    async fn add_remote(&mut self, name: &str, _url: &str) -> Result<(), VcsError> {
        self.recorder.note(format!("remote:{name}"));
        Ok(())
    }

    async fn push(&self, remote: &str) -> Result<(), VcsError> {
        self.recorder.note(format!("push:{remote}"));
        Ok(())
    }
}

fn project(name: &str) -> SourceProject {
    SourceProject {
        id: 1,
        name: name.to_string(),
        owner_login: "mia".to_string(),
        http_url_to_repo: format!("https://gitlab.example.com/mia/{name}.git"),
        description: Some(format!("The {name} project")),
    }
}

struct Fixture {
    exporter: Exporter,
    recorder: Recorder,
    github: Arc<FakeGithub>,
}

fn fixture(
    source_projects: &[&str],
    existing_dest: &[&str],
    policy: ConflictPolicy,
) -> Fixture {
    let recorder = Recorder::default();
    let gitlab = Arc::new(FakeGitlab {
        projects: source_projects.iter().map(|n| project(n)).collect(),
        recorder: recorder.clone(),
    });
    let github = Arc::new(FakeGithub {
        existing: Mutex::new(existing_dest.iter().map(|s| s.to_string()).collect()),
        recorder: recorder.clone(),
    });
    let vcs = Arc::new(FakeVcs {
        recorder: recorder.clone(),
    });

    let exporter = Exporter::new(
        gitlab,
        Arc::clone(&github) as Arc<dyn PlatformClient>,
        vcs,
        ExportOptions {
            conflict_policy: policy,
            ..ExportOptions::default()
        },
    );

    Fixture {
        exporter,
        recorder,
        github,
    }
}

async fn run(fixture: &Fixture, projects: &[&str]) -> ExportSummary {
    let projects: Vec<String> = projects.iter().map(|s| s.to_string()).collect();
    tokio::time::timeout(RUN_TIMEOUT, fixture.exporter.run(&projects, Arc::new(NullSink)))
        .await
        .expect("export run must not hang")
        .expect("export run setup must succeed")
}

fn outcome_of<'a>(summary: &'a ExportSummary, name: &str) -> &'a TaskOutcome {
    &summary
        .outcomes
        .iter()
        .find(|o| o.project == name)
        .expect("outcome present")
        .outcome
}

#[tokio::test]
async fn alpha_exports_cleanly_under_fail_policy() {
    let fixture = fixture(&["alpha"], &[], ConflictPolicy::Fail);
    let summary = run(&fixture, &["alpha"]).await;

    assert_eq!(summary.succeeded(), 1);
    assert!(matches!(
        outcome_of(&summary, "alpha"),
        TaskOutcome::Succeeded { overwrote: false }
    ));
    assert!(fixture.github.existing.lock().unwrap().contains("github_alpha"));
    assert_eq!(
        fixture.recorder.entries(),
        vec![
            "search:alpha",
            "clone:alpha",
            "lfs",
            "create:github_alpha",
            "remote:github_alpha",
            "push:github_alpha",
        ]
    );
}

#[tokio::test]
async fn beta_is_skipped_when_destination_exists() {
    let fixture = fixture(&["beta"], &["github_beta"], ConflictPolicy::Skip);
    let summary = run(&fixture, &["beta"]).await;

    assert_eq!(summary.skipped(), 1);
    assert!(matches!(outcome_of(&summary, "beta"), TaskOutcome::Skipped));
    assert_eq!(fixture.recorder.count("delete:"), 0);
    assert_eq!(fixture.recorder.count("push:"), 0);
}

#[tokio::test]
async fn two_skip_runs_in_a_row_are_idempotent() {
    let fixture = fixture(&["beta"], &["github_beta"], ConflictPolicy::Skip);

    let first = run(&fixture, &["beta"]).await;
    let second = run(&fixture, &["beta"]).await;

    assert!(matches!(outcome_of(&first, "beta"), TaskOutcome::Skipped));
    assert!(matches!(outcome_of(&second, "beta"), TaskOutcome::Skipped));
    // One create attempt per run, both conflicting; nothing overwritten.
    assert_eq!(fixture.recorder.count("create:"), 2);
    assert_eq!(fixture.recorder.count("delete:"), 0);
    assert_eq!(fixture.github.existing.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn overwrite_replaces_the_destination_repository() {
    let fixture = fixture(&["beta"], &["github_beta"], ConflictPolicy::Overwrite);
    let summary = run(&fixture, &["beta"]).await;

    assert!(matches!(
        outcome_of(&summary, "beta"),
        TaskOutcome::Succeeded { overwrote: true }
    ));
    assert_eq!(fixture.recorder.count("delete:octocat/github_beta"), 1);
    assert_eq!(fixture.recorder.count("create:github_beta"), 2);
    assert_eq!(fixture.recorder.count("push:github_beta"), 1);
}

#[tokio::test]
async fn gamma_failure_leaves_delta_untouched() {
    let fixture = fixture(&["delta"], &[], ConflictPolicy::Fail);
    let summary = run(&fixture, &["gamma", "delta"]).await;

    assert_eq!(summary.outcomes.len(), 2);
    match outcome_of(&summary, "gamma") {
        TaskOutcome::Failed { phase, error } => {
            assert_eq!(*phase, Phase::Fetch);
            assert!(error.to_string().contains("gamma"));
        }
        other => panic!("expected gamma to fail, got {other:?}"),
    }
    assert!(matches!(
        outcome_of(&summary, "delta"),
        TaskOutcome::Succeeded { .. }
    ));
    assert_eq!(summary.succeeded(), 1);
    assert_eq!(summary.failed(), 1);
    assert!(summary.has_failures());
}

#[tokio::test]
async fn a_large_batch_fans_out_and_every_task_terminates() {
    let names: Vec<String> = (0..24).map(|i| format!("repo{i}")).collect();
    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();

    let fixture = fixture(&name_refs, &[], ConflictPolicy::Fail);
    let summary = run(&fixture, &name_refs).await;

    assert_eq!(summary.outcomes.len(), 24);
    assert_eq!(summary.succeeded(), 24);
    assert_eq!(fixture.recorder.count("push:"), 24);
}
