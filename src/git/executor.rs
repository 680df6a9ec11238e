//! Mutating git operations: stage, commit and push.
//!
//! All operations use `std::process::Command` to shell out to the system `git`
//! binary, inheriting the user's existing git config, hooks, editor, SSH agent
//! and credential store.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::error::ActionError;

use super::git_output;

/// How a commit is finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    /// `git commit -m <message>`.
    Direct,
    /// `git commit -e -m <message>`: the message is pre-filled and the
    /// user's editor is opened before the commit is recorded.
    Edit,
}

impl CommitMode {
    /// Arguments passed to `git` for a commit with `message`.
    pub fn git_args(self, message: &str) -> Vec<&str> {
        match self {
            CommitMode::Direct => vec!["commit", "-m", message],
            CommitMode::Edit => vec!["commit", "-e", "-m", message],
        }
    }
}

/// The mutating version-control operations the commit step depends on.
pub trait VcsActions {
    /// Stage every change in the working tree (`git add -A`).
    fn stage_all(&self) -> Result<(), ActionError>;

    /// Record a commit with the given message.
    fn commit(&self, message: &str, mode: CommitMode) -> Result<(), ActionError>;

    /// Push the current branch to its upstream.
    fn push(&self) -> Result<(), ActionError>;
}

/// [`VcsActions`] backed by the `git` binary.
#[derive(Debug, Clone)]
pub struct GitCli {
    repo: PathBuf,
}

impl GitCli {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self { repo: repo.into() }
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }
}

impl VcsActions for GitCli {
    fn stage_all(&self) -> Result<(), ActionError> {
        let output = run_git(&self.repo, &["add", "-A"], "add")?;
        check_output(&output).map_err(ActionError::StageFailed)
    }

    fn commit(&self, message: &str, mode: CommitMode) -> Result<(), ActionError> {
        let args = mode.git_args(message);

        match mode {
            CommitMode::Direct => {
                let output = run_git(&self.repo, &args, "commit")?;
                check_output(&output).map_err(ActionError::CommitFailed)
            }
            CommitMode::Edit => {
                // The editor needs the terminal, so stdio is inherited rather
                // than captured.
                let status = Command::new("git")
                    .arg("-C")
                    .arg(&self.repo)
                    .args(&args)
                    .status()
                    .map_err(|source| ActionError::SpawnFailed {
                        operation: "commit".to_string(),
                        source,
                    })?;

                if status.success() {
                    Ok(())
                } else {
                    Err(ActionError::CommitFailed(format!(
                        "git commit -e exited with {}",
                        status
                            .code()
                            .map_or("a signal".to_string(), |c| format!("code {c}"))
                    )))
                }
            }
        }
    }

    fn push(&self) -> Result<(), ActionError> {
        let output = run_git(&self.repo, &["push"], "push")?;
        check_output(&output).map_err(ActionError::PushFailed)
    }
}

/// Run a git command, mapping spawn failures to [`ActionError::SpawnFailed`].
fn run_git(repo: &Path, args: &[&str], operation: &str) -> Result<Output, ActionError> {
    git_output(repo, args).map_err(|source| ActionError::SpawnFailed {
        operation: operation.to_string(),
        source,
    })
}

/// Turn a non-zero exit into its trimmed stderr (stdout if stderr is empty).
fn check_output(output: &Output) -> Result<(), String> {
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let detail = if stderr.trim().is_empty() {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    } else {
        stderr.trim().to_string()
    };

    Err(detail)
}
