//! Error types for diffscribe modules using thiserror.

use thiserror::Error;

/// Errors from read-only git queries (diff text, change listings).
#[derive(Error, Debug)]
pub enum DiffError {
    #[error("git not found on PATH. Install git to use diffscribe")]
    GitNotInstalled,

    #[error("Failed to spawn git: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Diff unavailable: git {operation} failed: {stderr}")]
    Unavailable { operation: String, stderr: String },

    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to read repository status: {0}")]
    Status(#[source] git2::Error),
}

/// Errors from diff bounding.
#[derive(Error, Debug)]
pub enum BoundError {
    #[error("Failed to load tokenizer for model '{model}': {reason}")]
    Tokenizer { model: String, reason: String },
}

/// Errors from a single chat completion call.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Request to completion endpoint failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Completion endpoint returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Completion endpoint returned an unreadable body: {0}")]
    InvalidResponse(String),

    #[error("Completion endpoint returned no choices")]
    NoChoices,

    #[error("Completion timed out after {0} seconds")]
    Timeout(u64),

    #[error("Completion task ended without a result: {0}")]
    Aborted(String),

    #[error("All {attempts} attempts failed: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<CompletionError>,
    },
}

/// Errors from mutating git operations and the interactive decision step.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Failed to run git {operation}: {source}")]
    SpawnFailed {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git add failed: {0}")]
    StageFailed(String),

    #[error("git commit failed: {0}")]
    CommitFailed(String),

    #[error("git push failed: {0}")]
    PushFailed(String),

    #[error("Prompt cancelled")]
    Cancelled,
}

/// Errors from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is not set. Export it before generating commit messages")]
    MissingApiKey,
}

/// Errors that abort a generate run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Diff(#[from] DiffError),

    #[error(transparent)]
    Bound(#[from] BoundError),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("Interrupted before both completions finished; nothing was committed")]
    Interrupted,
}
