//! The caller's choice about what to do with a generated message.

use dialoguer::{Confirm, Input};

use crate::error::ActionError;

/// What to do with a generated commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitDecision {
    /// Commit with the message as-is.
    Commit,
    /// Commit, but open the message in the editor first.
    CommitWithEdit,
    /// Leave the repository untouched.
    Skip,
    /// Unrecognized answer; handled like `Skip` and reported.
    Invalid(String),
}

impl CommitDecision {
    /// Interpret a `y/n/e` answer. Case and surrounding whitespace are ignored.
    pub fn from_answer(answer: &str) -> Self {
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => CommitDecision::Commit,
            "e" | "edit" => CommitDecision::CommitWithEdit,
            "n" | "no" => CommitDecision::Skip,
            _ => CommitDecision::Invalid(answer.trim().to_string()),
        }
    }
}

/// Supplies the interactive choices the pipeline needs.
///
/// The terminal implementation prompts the user; tests and forced flags supply
/// scripted answers so the pipeline runs without a terminal.
pub trait DecisionSource {
    /// Whether to stage unstaged and untracked paths before generating.
    fn confirm_stage(&self, paths: &[String]) -> Result<bool, ActionError>;

    /// What to do with the generated message.
    fn choose_commit(&self, message: &str) -> Result<CommitDecision, ActionError>;

    /// Whether to push after a successful commit.
    fn confirm_push(&self) -> Result<bool, ActionError>;
}

/// [`DecisionSource`] that asks on the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl DecisionSource for TerminalPrompter {
    fn confirm_stage(&self, _paths: &[String]) -> Result<bool, ActionError> {
        Confirm::new()
            .with_prompt("Do you want to stage these changes?")
            .default(false)
            .interact()
            .map_err(|_| ActionError::Cancelled)
    }

    fn choose_commit(&self, _message: &str) -> Result<CommitDecision, ActionError> {
        let answer: String = Input::new()
            .with_prompt("Do you want to commit changes? (y/n/e for edit)")
            .interact_text()
            .map_err(|_| ActionError::Cancelled)?;

        Ok(CommitDecision::from_answer(&answer))
    }

    fn confirm_push(&self) -> Result<bool, ActionError> {
        Confirm::new()
            .with_prompt("Push?")
            .default(false)
            .interact()
            .map_err(|_| ActionError::Cancelled)
    }
}

/// [`DecisionSource`] with fixed answers, for non-interactive runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedDecisions {
    pub stage: bool,
    pub commit: String,
    pub push: bool,
}

impl ScriptedDecisions {
    /// Answer the commit question with `answer`; decline staging and push.
    pub fn answering(answer: impl Into<String>) -> Self {
        Self {
            stage: false,
            commit: answer.into(),
            push: false,
        }
    }

    pub fn with_stage(mut self, stage: bool) -> Self {
        self.stage = stage;
        self
    }

    pub fn with_push(mut self, push: bool) -> Self {
        self.push = push;
        self
    }
}

impl DecisionSource for ScriptedDecisions {
    fn confirm_stage(&self, _paths: &[String]) -> Result<bool, ActionError> {
        Ok(self.stage)
    }

    fn choose_commit(&self, _message: &str) -> Result<CommitDecision, ActionError> {
        Ok(CommitDecision::from_answer(&self.commit))
    }

    fn confirm_push(&self) -> Result<bool, ActionError> {
        Ok(self.push)
    }
}
