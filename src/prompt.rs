//! Prompt construction for the commit-message and review completions.
//!
//! Both builders are pure functions of the bounded diff: no I/O, no clock, no
//! randomness. The same diff always yields byte-identical prompts.

use crate::bound::BoundedDiff;
use crate::commit::message::{CommitType, MAX_SUMMARY_CHARS};

/// System instruction for the commit-message persona.
pub const COMMIT_SYSTEM: &str = "This is a code revision assistant. It's tasked to create commit messages from code diffs.";

/// System instruction for the issue-review persona.
pub const REVIEW_SYSTEM: &str = "This assistant checks for potential issues in code changes. Please find the issues in the following code diffs.";

/// Sentence introducing the diff in the commit prompt.
pub const COMMIT_INTRO: &str = "I have a code change with the following diffs:";

/// The question that asks the model to draft a commit message.
pub const COMMIT_REQUEST: &str = "What should be the commit message for this change?";

/// Sentence introducing the diff in the review prompt.
pub const REVIEW_INTRO: &str =
    "Please find errors or significant design flaws in the following code diffs:";

/// Instruction telling the reviewer to answer with nothing when the diff is fine.
pub const REVIEW_EMPTY_INSTRUCTION: &str = "Return blank if nothing notable is found.";

/// A system + user instruction pair sent as one chat completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Render the closed commit-type set as `[build, chore, ...]`.
pub fn commit_type_list() -> String {
    let names: Vec<&str> = CommitType::ALL.iter().map(|t| t.as_str()).collect();
    format!("[{}]", names.join(", "))
}

fn commit_suffix() -> String {
    format!(
        "{COMMIT_REQUEST} Please categorize the commit type as one of the following: {types}. \
         The first line of the commit message should be of the format <commit type>: <commit message>, \
         where the length of commit message should be no more than {MAX_SUMMARY_CHARS} characters. \
         Feel free to add a few more bullet points with more details if relevant. \
         Put a blank line between the short message and the details.",
        types = commit_type_list(),
    )
}

fn review_suffix() -> String {
    format!(
        "Be succinct and don't mention generic tips like recommending adding comments or style nits. \
         If errors are found, please suggest a fix along with code for the fix. \
         Mention file names and line numbers where things are found. \
         Do not draft a commit message. {REVIEW_EMPTY_INSTRUCTION}"
    )
}

/// Build the prompt asking for a categorized, length-constrained commit message.
///
/// The user instruction is the intro sentence, the diff verbatim, then the
/// instruction suffix, each separated by a newline.
pub fn build_commit_prompt(diff: &BoundedDiff) -> Prompt {
    Prompt {
        system: COMMIT_SYSTEM.to_string(),
        user: format!("{COMMIT_INTRO}\n{}\n{}", diff.text(), commit_suffix()),
    }
}

/// Build the prompt asking for a terse defect report, or nothing.
pub fn build_review_prompt(diff: &BoundedDiff) -> Prompt {
    Prompt {
        system: REVIEW_SYSTEM.to_string(),
        user: format!("{REVIEW_INTRO}\n{}\n{}", diff.text(), review_suffix()),
    }
}
