//! Generated commit messages and the commit/push step.

pub mod action;
pub mod decision;
pub mod message;

pub use action::{ActionOutcome, ActionPolicy, run_action, stage_pending};
pub use decision::{CommitDecision, DecisionSource, ScriptedDecisions, TerminalPrompter};
pub use message::{CommitMessage, CommitType, MAX_SUMMARY_CHARS, MessageIssue};
