//! Commit/push action: turns a generated message and a decision into git
//! operations.
//!
//! Push is only ever attempted after a successful commit. Every git failure is
//! fatal and returned verbatim; nothing is retried or rolled back.

use tracing::debug;

use crate::error::ActionError;
use crate::git::{ChangeListing, CommitMode, VcsActions};

use super::decision::{CommitDecision, DecisionSource};

/// Flags that bypass interactive confirmation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionPolicy {
    /// Commit without asking.
    pub force_commit: bool,
    /// Push after committing without asking.
    pub force_push: bool,
}

/// What the action step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Committed { edited: bool, pushed: bool },
    Skipped,
    InvalidDecision(String),
}

/// Resolve the decision, commit, and optionally push.
pub fn run_action(
    message: &str,
    policy: &ActionPolicy,
    decisions: &dyn DecisionSource,
    vcs: &dyn VcsActions,
) -> Result<ActionOutcome, ActionError> {
    let decision = if policy.force_commit {
        CommitDecision::Commit
    } else {
        decisions.choose_commit(message)?
    };
    debug!("Commit decision: {:?}", decision);

    let mode = match decision {
        CommitDecision::Commit => CommitMode::Direct,
        CommitDecision::CommitWithEdit => CommitMode::Edit,
        CommitDecision::Skip => return Ok(ActionOutcome::Skipped),
        CommitDecision::Invalid(answer) => return Ok(ActionOutcome::InvalidDecision(answer)),
    };

    vcs.commit(message, mode)?;

    let pushed = if policy.force_push || decisions.confirm_push()? {
        vcs.push()?;
        true
    } else {
        false
    };

    Ok(ActionOutcome::Committed {
        edited: mode == CommitMode::Edit,
        pushed,
    })
}

/// Offer to stage unstaged and untracked paths. Returns whether staging ran.
pub fn stage_pending(
    listing: &ChangeListing,
    decisions: &dyn DecisionSource,
    vcs: &dyn VcsActions,
) -> Result<bool, ActionError> {
    if !listing.has_pending() {
        return Ok(false);
    }

    if decisions.confirm_stage(&listing.pending())? {
        vcs.stage_all()?;
        Ok(true)
    } else {
        Ok(false)
    }
}
