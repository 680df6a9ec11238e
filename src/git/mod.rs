//! Git collaborators: diff queries, change listings and mutating operations.
//!
//! Diff text and mutations shell out to the system `git` binary so the user's
//! config, hooks, editor and credential store apply. Change listings read the
//! repository status through git2.

pub mod diff;
pub mod executor;
pub mod status;

use std::path::Path;
use std::process::{Command, Output};

pub use diff::{Diff, DiffScope, check_git_installed, fetch};
pub use executor::{CommitMode, GitCli, VcsActions};
pub use status::{ChangeListing, list_changes};

/// Run `git -C <repo> <args>` and capture its output.
pub(crate) fn git_output(repo: &Path, args: &[&str]) -> std::io::Result<Output> {
    Command::new("git").arg("-C").arg(repo).args(args).output()
}
