//! Integration tests for diff queries and git mutations against temp repos.
//!
//! Tests here set `GIT_EDITOR`, which every git child process inherits, so the
//! whole file runs serially.

mod common;

use std::sync::Arc;

use serial_test::serial;

use diffscribe::commit::{ActionOutcome, ActionPolicy, ScriptedDecisions};
use diffscribe::error::{ActionError, DiffError};
use diffscribe::git::{CommitMode, DiffScope, VcsActions, fetch, list_changes};
use diffscribe::{RunSummary, Settings, run_generate};

use common::{CannedClient, RecordingReporter, TestRepo};

#[test]
#[serial]
fn test_fetch_staged_excludes_unstaged_edits() {
    let repo = TestRepo::with_initial_commit();
    repo.write("a.txt", "staged\n");
    repo.stage("a.txt");
    repo.write("README.md", "# test\nnot staged\n");

    let staged = fetch(repo.path(), DiffScope::Staged).unwrap();
    assert!(staged.text.contains("+staged"));
    assert!(!staged.text.contains("+not staged"));

    let working = fetch(repo.path(), DiffScope::WorkingTree).unwrap();
    assert!(working.text.contains("+staged"));
    assert!(working.text.contains("+not staged"));
}

#[test]
#[serial]
fn test_fetch_clean_repo_is_empty_not_error() {
    let repo = TestRepo::with_initial_commit();
    let diff = fetch(repo.path(), DiffScope::Staged).unwrap();
    assert!(diff.is_empty());
}

#[test]
#[serial]
fn test_fetch_without_head_is_unavailable() {
    let repo = TestRepo::new();
    repo.write("a.txt", "x\n");
    repo.stage("a.txt");

    match fetch(repo.path(), DiffScope::Staged) {
        Err(DiffError::Unavailable { operation, stderr }) => {
            assert_eq!(operation, "diff HEAD --staged");
            assert!(!stderr.is_empty());
        }
        other => panic!("Expected Unavailable, got: {:?}", other),
    }
}

#[test]
#[serial]
fn test_stage_all_then_listing_is_all_staged() {
    let repo = TestRepo::with_initial_commit();
    repo.write("README.md", "# changed\n");
    repo.write("new/file.rs", "fn main() {}\n");

    let before = list_changes(repo.path()).unwrap();
    assert_eq!(before.unstaged, vec!["README.md"]);
    assert_eq!(before.untracked, vec!["new/file.rs"]);

    repo.cli().stage_all().unwrap();

    let after = list_changes(repo.path()).unwrap();
    assert_eq!(after.staged, vec!["README.md", "new/file.rs"]);
    assert!(!after.has_pending());
}

#[test]
#[serial]
fn test_edit_mode_commit_runs_editor() {
    let repo = TestRepo::with_initial_commit();
    repo.write("a.txt", "x\n");
    repo.stage("a.txt");

    temp_env::with_var("GIT_EDITOR", Some("true"), || {
        repo.cli()
            .commit("feat: edited message", CommitMode::Edit)
            .unwrap();
    });

    assert_eq!(repo.commit_count(), 2);
    assert_eq!(repo.head_message().trim(), "feat: edited message");
}

#[test]
#[serial]
fn test_edit_mode_editor_failure_is_commit_failed() {
    let repo = TestRepo::with_initial_commit();
    repo.write("a.txt", "x\n");
    repo.stage("a.txt");

    let result = temp_env::with_var("GIT_EDITOR", Some("false"), || {
        repo.cli().commit("feat: never lands", CommitMode::Edit)
    });

    assert!(matches!(result, Err(ActionError::CommitFailed(_))));
    assert_eq!(repo.commit_count(), 1);
}

#[test]
#[serial]
fn test_push_reaches_tracking_remote() {
    let repo = TestRepo::with_initial_commit();
    let remote = repo.add_bare_remote();
    repo.write("a.txt", "x\n");
    repo.stage("a.txt");

    let cli = repo.cli();
    cli.commit("chore: push me", CommitMode::Direct).unwrap();
    cli.push().unwrap();

    let head = repo.repo.head().unwrap();
    let branch = head.shorthand().unwrap();
    let bare = git2::Repository::open_bare(remote.path()).unwrap();
    let pushed = bare
        .find_reference(&format!("refs/heads/{}", branch))
        .unwrap()
        .target();
    assert_eq!(pushed, head.target());
}

#[test]
#[serial]
fn test_generate_with_edit_decision_commits_through_editor() {
    let repo = TestRepo::with_initial_commit();
    repo.write("src/lib.rs", "pub fn one() -> u8 { 1 }\n");
    repo.stage("src/lib.rs");

    let client = Arc::new(CannedClient::new(Ok("feat: add one"), Ok("")));

    let summary = temp_env::with_var("GIT_EDITOR", Some("true"), || {
        tokio_test::block_on(run_generate(
            repo.path(),
            &Settings::default(),
            &ActionPolicy::default(),
            client,
            &ScriptedDecisions::answering("e"),
            &repo.cli(),
            &mut RecordingReporter::default(),
        ))
    })
    .unwrap();

    assert!(matches!(
        summary,
        RunSummary::Completed {
            action: Some(ActionOutcome::Committed {
                edited: true,
                pushed: false
            }),
            ..
        }
    ));
    assert_eq!(repo.head_message().trim(), "feat: add one");
}
