//! diffscribe - A CLI tool that writes commit messages from git diffs.
//!
//! # Overview
//!
//! diffscribe reads the staged (or working tree) diff, bounds it to a size the
//! model can take, and asks an OpenAI-compatible endpoint two things at once:
//! a conventional commit message and a short review of likely defects. The
//! message can then be committed, edited, and pushed.

pub mod bound;
pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod llm;
pub mod orchestrator;
pub mod pipeline;
pub mod prompt;
pub mod report;

// Re-export commonly used types
pub use bound::{BoundedDiff, Bounder, Metric, MetricKind, Truncation};
pub use commit::{ActionOutcome, ActionPolicy, CommitDecision, CommitMessage, CommitType};
pub use config::{ApiKey, Settings};
pub use error::{ActionError, BoundError, CompletionError, ConfigError, DiffError, PipelineError};
pub use git::{Diff, DiffScope};
pub use orchestrator::{OrchestrationReport, TaskKind, TaskOutcome};
pub use pipeline::{RunSummary, render_commit_prompt, run_generate};
