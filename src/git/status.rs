//! Staged, unstaged and untracked path listings.

use std::path::Path;

use git2::{Repository, Status, StatusOptions};

use crate::error::DiffError;

/// Paths with pending changes, grouped the way `git status` groups them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeListing {
    /// Paths whose index entry differs from HEAD.
    pub staged: Vec<String>,
    /// Tracked paths whose working-tree content differs from the index.
    pub unstaged: Vec<String>,
    /// Untracked, non-ignored paths.
    pub untracked: Vec<String>,
}

impl ChangeListing {
    /// Whether anything would be picked up by `git add -A`.
    pub fn has_pending(&self) -> bool {
        !self.unstaged.is_empty() || !self.untracked.is_empty()
    }

    /// Unstaged and untracked paths in one list.
    pub fn pending(&self) -> Vec<String> {
        self.unstaged
            .iter()
            .chain(self.untracked.iter())
            .cloned()
            .collect()
    }
}

fn staged_mask() -> Status {
    Status::INDEX_NEW
        | Status::INDEX_MODIFIED
        | Status::INDEX_DELETED
        | Status::INDEX_RENAMED
        | Status::INDEX_TYPECHANGE
}

fn unstaged_mask() -> Status {
    Status::WT_MODIFIED | Status::WT_DELETED | Status::WT_RENAMED | Status::WT_TYPECHANGE
}

/// List staged, unstaged and untracked paths in the repository at `repo_path`.
pub fn list_changes(repo_path: &Path) -> Result<ChangeListing, DiffError> {
    let repo = Repository::discover(repo_path).map_err(DiffError::OpenRepository)?;

    let mut opts = StatusOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false);

    let statuses = repo.statuses(Some(&mut opts)).map_err(DiffError::Status)?;

    let staged = staged_mask();
    let unstaged = unstaged_mask();
    let mut listing = ChangeListing::default();
    for entry in statuses.iter() {
        let Some(path) = entry.path() else {
            continue;
        };
        let status = entry.status();

        if status.intersects(staged) {
            listing.staged.push(path.to_string());
        }
        if status.intersects(unstaged) {
            listing.unstaged.push(path.to_string());
        }
        if status.contains(Status::WT_NEW) {
            listing.untracked.push(path.to_string());
        }
    }

    listing.staged.sort();
    listing.unstaged.sort();
    listing.untracked.sort();

    Ok(listing)
}
