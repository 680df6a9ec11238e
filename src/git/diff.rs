//! Diff text collection from the `git` binary.

use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::error::DiffError;

use super::git_output;

/// Which comparison the diff represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DiffScope {
    /// Working tree (staged and unstaged edits) against HEAD.
    WorkingTree,
    /// Index against HEAD.
    #[default]
    Staged,
}

impl DiffScope {
    /// Arguments passed to `git` for this scope.
    pub fn git_args(self) -> &'static [&'static str] {
        match self {
            DiffScope::WorkingTree => &["diff", "HEAD"],
            DiffScope::Staged => &["diff", "HEAD", "--staged"],
        }
    }
}

impl fmt::Display for DiffScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffScope::WorkingTree => write!(f, "working tree"),
            DiffScope::Staged => write!(f, "staged"),
        }
    }
}

/// Unified diff text for one scope, produced fresh on every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff {
    pub text: String,
    pub scope: DiffScope,
}

impl Diff {
    pub fn new(text: impl Into<String>, scope: DiffScope) -> Self {
        Self {
            text: text.into(),
            scope,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Check that the `git` binary is available.
pub fn check_git_installed() -> Result<(), DiffError> {
    which::which("git").map(|_| ()).map_err(|_| DiffError::GitNotInstalled)
}

/// Fetch the diff for `scope` from the repository at `repo_path`.
///
/// An empty diff is returned as empty text. A failing `git` invocation
/// (not a repository, no HEAD yet) is reported as [`DiffError::Unavailable`].
pub fn fetch(repo_path: &Path, scope: DiffScope) -> Result<Diff, DiffError> {
    let args = scope.git_args();
    let output = git_output(repo_path, args).map_err(DiffError::SpawnFailed)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DiffError::Unavailable {
            operation: args.join(" "),
            stderr: stderr.trim().to_string(),
        });
    }

    let text = String::from_utf8_lossy(&output.stdout).into_owned();
    debug!("Fetched {} diff: {} bytes", scope, text.len());

    Ok(Diff::new(text, scope))
}
