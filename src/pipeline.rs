//! End-to-end flows behind the CLI commands.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::bound::{BoundedDiff, Bounder};
use crate::commit::{ActionOutcome, ActionPolicy, DecisionSource, run_action, stage_pending};
use crate::config::Settings;
use crate::error::PipelineError;
use crate::git::{self, VcsActions};
use crate::llm::CompletionClient;
use crate::orchestrator::{OrchestrationReport, Orchestrator, TaskOptions};
use crate::prompt::build_commit_prompt;
use crate::report::Reporter;

/// How a generate run ended.
#[derive(Debug)]
pub enum RunSummary {
    /// The selected diff was empty; no model call was made.
    NothingToDescribe,
    Completed {
        report: OrchestrationReport,
        /// `None` when the commit-message task failed.
        action: Option<ActionOutcome>,
    },
}

fn bounded_diff(repo: &Path, settings: &Settings) -> Result<(BoundedDiff, bool), PipelineError> {
    let diff = git::fetch(repo, settings.scope)?;
    let empty = diff.is_empty();
    let bounder = Bounder::new(&settings.bound_metric(), settings.diff_limit())?;
    debug!("Bounding {} diff with {:?}", diff.scope, bounder);
    Ok((bounder.bound(diff), empty))
}

/// The commit prompt's user instruction for the current diff. No model call.
///
/// An empty diff still renders; truncation is reported like a generate run.
pub fn render_commit_prompt<R: Reporter>(
    repo: &Path,
    settings: &Settings,
    reporter: &mut R,
) -> Result<String, PipelineError> {
    let (diff, _) = bounded_diff(repo, settings)?;
    if let Some(truncation) = diff.truncation() {
        reporter.truncation(truncation);
    }
    Ok(build_commit_prompt(&diff).user)
}

/// Stage on request, generate message and review, then commit and push.
///
/// Nothing is committed unless the commit-message task succeeded. An interrupt
/// while the completions are in flight ends the run with
/// [`PipelineError::Interrupted`] before any git mutation.
pub async fn run_generate<R: Reporter>(
    repo: &Path,
    settings: &Settings,
    policy: &ActionPolicy,
    client: Arc<dyn CompletionClient>,
    decisions: &dyn DecisionSource,
    vcs: &dyn VcsActions,
    reporter: &mut R,
) -> Result<RunSummary, PipelineError> {
    let listing = git::list_changes(repo)?;
    reporter.changes(&listing);
    if stage_pending(&listing, decisions, vcs)? {
        debug!("Staged pending changes");
    }

    let (diff, empty) = bounded_diff(repo, settings)?;
    if empty {
        reporter.nothing_to_describe();
        return Ok(RunSummary::NothingToDescribe);
    }
    if let Some(truncation) = diff.truncation() {
        reporter.truncation(truncation);
    }

    let mut orchestrator = Orchestrator::new(client, TaskOptions::from(settings));
    let report = tokio::select! {
        report = orchestrator.run(&diff, &mut *reporter) => report,
        _ = interrupted() => return Err(PipelineError::Interrupted),
    };

    let action = match report.commit_message() {
        Some(message) => {
            let outcome = run_action(message, policy, decisions, vcs)?;
            reporter.action(&outcome);
            Some(outcome)
        }
        None => {
            warn!("No commit message generated; skipping commit");
            None
        }
    };

    Ok(RunSummary::Completed { report, action })
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
