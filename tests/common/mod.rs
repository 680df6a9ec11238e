//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use git2::{IndexAddOption, Oid, Repository, Signature};

use diffscribe::bound::Truncation;
use diffscribe::commit::ActionOutcome;
use diffscribe::error::{ActionError, CompletionError};
use diffscribe::git::{ChangeListing, CommitMode, GitCli, VcsActions};
use diffscribe::llm::{CompletionClient, CompletionRequest};
use diffscribe::orchestrator::{OutcomeSink, TaskKind, TaskOutcome};
use diffscribe::prompt::REVIEW_SYSTEM;
use diffscribe::report::Reporter;

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    ///
    /// `user.name`/`user.email` are set locally so the git CLI can commit.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        {
            let mut config = repo.config().expect("Failed to open repo config");
            config
                .set_str("user.name", "Test User")
                .expect("Failed to set user.name");
            config
                .set_str("user.email", "test@example.com")
                .expect("Failed to set user.email");
            config
                .set_bool("commit.gpgsign", false)
                .expect("Failed to disable signing");
        }
        Self { dir, repo }
    }

    /// New repository with one committed file, so `HEAD` exists.
    pub fn with_initial_commit() -> Self {
        let repo = Self::new();
        repo.write("README.md", "# test\n");
        repo.stage("README.md");
        repo.commit("chore: initial commit");
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the repository root.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&path, content).expect("Failed to write test file");
    }

    /// Add one path to the index.
    pub fn stage(&self, relative: &str) {
        let mut index = self.repo.index().expect("Failed to get index");
        index
            .add_path(Path::new(relative))
            .expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Add every change to the index.
    pub fn stage_all(&self) {
        let mut index = self.repo.index().expect("Failed to get index");
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .expect("Failed to add all");
        index.write().expect("Failed to write index");
    }

    /// Commit the current index. Returns the commit OID.
    pub fn commit(&self, message: &str) -> Oid {
        let sig = Signature::now("Test User", "test@example.com")
            .expect("Failed to create signature");
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Full message of the commit at `HEAD`.
    pub fn head_message(&self) -> String {
        let head = self
            .repo
            .head()
            .expect("No HEAD")
            .peel_to_commit()
            .expect("HEAD is not a commit");
        head.message().unwrap_or("").to_string()
    }

    /// Number of commits reachable from `HEAD`.
    pub fn commit_count(&self) -> usize {
        let mut walk = self.repo.revwalk().expect("Failed to create revwalk");
        if walk.push_head().is_err() {
            return 0;
        }
        walk.count()
    }

    /// Attach a bare `origin` remote and set the current branch to track it.
    pub fn add_bare_remote(&self) -> tempfile::TempDir {
        let remote_dir = tempfile::tempdir().expect("Failed to create remote dir");
        Repository::init_bare(remote_dir.path()).expect("Failed to init bare repo");

        let url = remote_dir.path().to_str().expect("Non-UTF-8 temp path");
        self.repo
            .remote("origin", url)
            .expect("Failed to add remote");

        let head = self.repo.head().expect("No HEAD");
        let branch = head.shorthand().expect("Detached HEAD").to_string();
        let status = std::process::Command::new("git")
            .arg("-C")
            .arg(self.dir.path())
            .args(["push", "-u", "origin", &branch])
            .output()
            .expect("Failed to run git push");
        assert!(status.status.success(), "initial push failed: {:?}", status);

        remote_dir
    }

    pub fn cli(&self) -> GitCli {
        GitCli::new(self.dir.path())
    }
}

/// Completion client with canned replies per persona.
pub struct CannedClient {
    pub commit: Result<String, String>,
    pub review: Result<String, String>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl CannedClient {
    pub fn new(commit: Result<&str, &str>, review: Result<&str, &str>) -> Self {
        Self {
            commit: commit.map(str::to_string).map_err(str::to_string),
            review: review.map(str::to_string).map_err(str::to_string),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("poisoned").len()
    }
}

#[async_trait]
impl CompletionClient for CannedClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        self.requests
            .lock()
            .expect("poisoned")
            .push(request.clone());

        let reply = if request.system == REVIEW_SYSTEM {
            &self.review
        } else {
            &self.commit
        };
        reply.clone().map_err(|message| CompletionError::Api {
            status: 500,
            message,
        })
    }
}

/// Everything a run reported, in order.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub events: Vec<String>,
    pub truncations: Vec<Truncation>,
    pub actions: Vec<ActionOutcome>,
    pub outcome_kinds: Vec<(TaskKind, bool)>,
}

impl OutcomeSink for RecordingReporter {
    fn report(&mut self, outcome: &TaskOutcome) {
        self.outcome_kinds
            .push((outcome.kind(), outcome.is_failure()));
        self.events.push(format!("outcome:{}", outcome.kind()));
    }
}

impl Reporter for RecordingReporter {
    fn changes(&mut self, listing: &ChangeListing) {
        self.events.push(format!(
            "changes:{}/{}/{}",
            listing.staged.len(),
            listing.unstaged.len(),
            listing.untracked.len()
        ));
    }

    fn truncation(&mut self, truncation: &Truncation) {
        self.events.push("truncation".to_string());
        self.truncations.push(truncation.clone());
    }

    fn nothing_to_describe(&mut self) {
        self.events.push("nothing".to_string());
    }

    fn action(&mut self, outcome: &ActionOutcome) {
        self.events.push("action".to_string());
        self.actions.push(outcome.clone());
    }
}

/// VcsActions that records calls without touching git.
#[derive(Debug, Default)]
pub struct RecordingVcs {
    pub calls: RefCell<Vec<String>>,
}

impl VcsActions for RecordingVcs {
    fn stage_all(&self) -> Result<(), ActionError> {
        self.calls.borrow_mut().push("add".to_string());
        Ok(())
    }

    fn commit(&self, message: &str, mode: CommitMode) -> Result<(), ActionError> {
        let tag = match mode {
            CommitMode::Direct => "commit",
            CommitMode::Edit => "commit-edit",
        };
        self.calls.borrow_mut().push(format!("{}:{}", tag, message));
        Ok(())
    }

    fn push(&self) -> Result<(), ActionError> {
        self.calls.borrow_mut().push("push".to_string());
        Ok(())
    }
}
