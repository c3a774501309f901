//! Ferry CLI - export GitLab projects to GitHub.

mod config;
mod progress;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use console::{Term, style};
use tracing_subscriber::EnvFilter;

use ferry::{
    ConflictPolicy, ExportOptions, ExportSummary, Exporter, GitCli, GithubClient, GitlabClient,
    NullSink, ProgressSink, TaskOutcome, short_error_message,
};

use crate::progress::ProgressRenderer;

#[derive(Parser)]
#[command(name = "ferry")]
#[command(version)]
#[command(about = "Export GitLab projects to GitHub")]
#[command(
    long_about = "Ferry exports projects from a GitLab instance to GitHub: each project is \
looked up on GitLab, cloned locally (including git-lfs content), created \
under your GitHub account, and pushed there. Projects are exported \
concurrently; one project failing never aborts the rest of the batch."
)]
#[command(after_long_help = r#"EXAMPLES
    Export two projects, failing on destination name collisions:
        $ ferry alpha beta

    Re-run an export, skipping projects that already made it across:
        $ ferry --on-conflict skip alpha beta

    Replace existing destination repositories:
        $ ferry --on-conflict overwrite alpha

    Export without the default "github_" name prefix:
        $ ferry --prefix "" alpha

CONFIGURATION
    Ferry reads configuration from:
      1. ~/.config/ferry/config.toml (or $XDG_CONFIG_HOME/ferry/config.toml)
      2. ./ferry.toml
      3. Environment variables (FERRY_* prefix, e.g., FERRY_GITHUB_TOKEN)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    FERRY_GITLAB_TOKEN    GitLab personal access token (required)
    FERRY_GITLAB_HOST     GitLab host (default: gitlab.com)
    FERRY_GITHUB_TOKEN    GitHub personal access token (required)
"#)]
struct Cli {
    /// Project name(s) to export - can specify multiple
    #[arg(required = true)]
    projects: Vec<String>,

    /// What to do when the destination repository name already exists
    #[arg(short = 'c', long, value_name = "POLICY", default_value_t = ConflictPolicy::Fail)]
    on_conflict: ConflictPolicy,

    /// Prefix prepended to every destination repository name
    #[arg(short = 'p', long, default_value = "github_")]
    prefix: String,

    /// Directory to clone into (defaults to the system temp directory)
    #[arg(long, value_name = "DIR")]
    tmp_dir: Option<PathBuf>,

    /// Machine-readable one-line-per-project output; implies skip-on-conflict
    #[arg(long)]
    porcelain: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let interactive = Term::stdout().is_term() && !cli.porcelain;

    // Initialize tracing for non-interactive mode (structured logging).
    // Logs go to stderr so porcelain stdout stays machine-readable.
    if !interactive {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("ferry=info,ferry_cli=info"));

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    // Load configuration (config file -> env vars -> defaults)
    let config = config::Config::load();

    let gitlab_token = config.gitlab_token().ok_or(
        "GitLab token not configured. Set FERRY_GITLAB_TOKEN or [gitlab].token in the config file.",
    )?;
    let github_token = config.github_token().ok_or(
        "GitHub token not configured. Set FERRY_GITHUB_TOKEN or [github].token in the config file.",
    )?;

    let source = Arc::new(GitlabClient::new(&config.gitlab_host(), &gitlab_token)?);
    let destination = Arc::new(GithubClient::new(&github_token)?);

    // Porcelain consumers parse one line per project; a colliding name is a
    // skip line there, never a fatal error.
    let conflict_policy = if cli.porcelain {
        ConflictPolicy::Skip
    } else {
        cli.on_conflict
    };

    let exporter = Exporter::new(
        source,
        destination,
        Arc::new(GitCli::new()),
        ExportOptions {
            conflict_policy,
            prefix: cli.prefix,
            tmp_dir: cli.tmp_dir,
        },
    );

    let sink: Arc<dyn ProgressSink> = if cli.porcelain {
        Arc::new(NullSink)
    } else {
        Arc::new(ProgressRenderer::new())
    };

    let summary = exporter.run(&cli.projects, sink).await?;

    if cli.porcelain {
        print_porcelain(&summary);
    } else {
        print_summary(&summary);
    }

    if summary.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}

/// One tab-separated line per project: `ok`, `skip`, or `fail` plus context.
fn print_porcelain(summary: &ExportSummary) {
    for outcome in &summary.outcomes {
        match &outcome.outcome {
            TaskOutcome::Succeeded { .. } => println!("ok\t{}", outcome.project),
            TaskOutcome::Skipped => println!("skip\t{}", outcome.project),
            TaskOutcome::Failed { phase, error } => println!(
                "fail\t{}\t{}\t{}",
                outcome.project,
                phase,
                short_error_message(error)
            ),
        }
    }
}

fn print_summary(summary: &ExportSummary) {
    for outcome in &summary.outcomes {
        match &outcome.outcome {
            TaskOutcome::Succeeded { overwrote: false } => {
                println!("{} {} exported", style("✓").green(), outcome.project);
            }
            TaskOutcome::Succeeded { overwrote: true } => {
                println!(
                    "{} {} exported (existing destination repository overwritten)",
                    style("✓").green(),
                    outcome.project
                );
            }
            TaskOutcome::Skipped => {
                println!(
                    "{} {} skipped: destination repository already exists",
                    style("→").yellow(),
                    outcome.project
                );
            }
            TaskOutcome::Failed { phase, error } => {
                println!(
                    "{} {} failed during {}: {}",
                    style("✗").red(),
                    outcome.project,
                    phase,
                    error
                );
            }
        }
    }

    let failed = summary.failed();
    if failed > 0 {
        println!(
            "\n{} of {} projects failed; re-run them after fixing the cause.",
            failed,
            summary.outcomes.len()
        );
    }
}
