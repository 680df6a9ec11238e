//! Runs the commit-message and review completions concurrently.
//!
//! Both completions are spawned as tokio tasks. Each task sends a tagged
//! outcome over an mpsc channel as soon as it finishes, and the single
//! receiver hands outcomes to an [`OutcomeSink`] in arrival order. A failed,
//! timed out or panicked task never cancels its sibling.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::bound::BoundedDiff;
use crate::config::Settings;
use crate::error::CompletionError;
use crate::llm::retry::retry_with_backoff;
use crate::llm::{CompletionClient, CompletionRequest};
use crate::prompt::{build_commit_prompt, build_review_prompt};

/// Which of the two completions an outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    CommitMessage,
    Review,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::CommitMessage => "commit message",
            TaskKind::Review => "review",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one task. Replies are trimmed of surrounding whitespace.
#[derive(Debug)]
pub enum TaskOutcome {
    CommitMessageReady(String),
    ReviewReady(String),
    Failed {
        kind: TaskKind,
        cause: CompletionError,
    },
}

impl TaskOutcome {
    fn from_result(kind: TaskKind, result: Result<String, CompletionError>) -> Self {
        match (kind, result) {
            (TaskKind::CommitMessage, Ok(text)) => {
                TaskOutcome::CommitMessageReady(text.trim().to_string())
            }
            (TaskKind::Review, Ok(text)) => TaskOutcome::ReviewReady(text.trim().to_string()),
            (kind, Err(cause)) => TaskOutcome::Failed { kind, cause },
        }
    }

    pub fn kind(&self) -> TaskKind {
        match self {
            TaskOutcome::CommitMessageReady(_) => TaskKind::CommitMessage,
            TaskOutcome::ReviewReady(_) => TaskKind::Review,
            TaskOutcome::Failed { kind, .. } => *kind,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TaskOutcome::Failed { .. })
    }
}

/// Receives outcomes the moment they arrive.
pub trait OutcomeSink: Send {
    fn report(&mut self, outcome: &TaskOutcome);
}

/// Per-task request parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskOptions {
    pub max_tokens: u32,
    pub temperature: f32,
    /// Applied to every attempt separately.
    pub timeout: Option<Duration>,
    pub max_attempts: u32,
}

impl From<&Settings> for TaskOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout: settings.request_timeout,
            max_attempts: settings.max_attempts,
        }
    }
}

impl Default for TaskOptions {
    fn default() -> Self {
        TaskOptions::from(&Settings::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Idle,
    Running { pending: usize },
    Done,
}

/// Everything the two tasks produced, in arrival order.
#[derive(Debug, Default)]
pub struct OrchestrationReport {
    pub outcomes: Vec<TaskOutcome>,
}

impl OrchestrationReport {
    /// The generated commit message, if that task succeeded.
    pub fn commit_message(&self) -> Option<&str> {
        self.outcomes.iter().find_map(|o| match o {
            TaskOutcome::CommitMessageReady(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// The review text, if that task succeeded. May be empty.
    pub fn review(&self) -> Option<&str> {
        self.outcomes.iter().find_map(|o| match o {
            TaskOutcome::ReviewReady(text) => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (TaskKind, &CompletionError)> {
        self.outcomes.iter().filter_map(|o| match o {
            TaskOutcome::Failed { kind, cause } => Some((*kind, cause)),
            _ => None,
        })
    }
}

pub struct Orchestrator {
    client: Arc<dyn CompletionClient>,
    options: TaskOptions,
    state: OrchestratorState,
}

impl Orchestrator {
    pub fn new(client: Arc<dyn CompletionClient>, options: TaskOptions) -> Self {
        Self {
            client,
            options,
            state: OrchestratorState::Idle,
        }
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    /// Run both completions for `diff` and wait until each has resolved.
    pub async fn run(
        &mut self,
        diff: &BoundedDiff,
        sink: &mut dyn OutcomeSink,
    ) -> OrchestrationReport {
        let requests = [
            (TaskKind::CommitMessage, build_commit_prompt(diff)),
            (TaskKind::Review, build_review_prompt(diff)),
        ];

        let (tx, mut rx) = mpsc::unbounded_channel::<TaskOutcome>();
        let mut handles: Vec<(TaskKind, JoinHandle<()>)> = Vec::with_capacity(requests.len());

        for (kind, prompt) in requests {
            let request = CompletionRequest::from_prompt(
                prompt,
                self.options.max_tokens,
                self.options.temperature,
            );
            let client = Arc::clone(&self.client);
            let options = self.options.clone();
            let tx = tx.clone();

            debug!("Spawning {} task", kind);
            let handle = tokio::spawn(async move {
                let result = execute(client.as_ref(), &request, &options).await;
                // Receiver outlives every task; a send error means the run was dropped.
                let _ = tx.send(TaskOutcome::from_result(kind, result));
            });
            handles.push((kind, handle));
        }
        drop(tx);

        let total = handles.len();
        self.state = OrchestratorState::Running { pending: total };

        let mut report = OrchestrationReport {
            outcomes: Vec::with_capacity(total),
        };

        while let Some(outcome) = rx.recv().await {
            debug!("{} task resolved", outcome.kind());
            self.record(outcome, sink, &mut report, total);
        }

        // Channel closed: every sender is gone. Tasks that never reported died.
        for (kind, handle) in handles {
            if report.outcomes.iter().any(|o| o.kind() == kind) {
                continue;
            }
            let reason = match handle.await {
                Err(e) if e.is_panic() => "task panicked".to_string(),
                Err(e) => e.to_string(),
                Ok(()) => "task finished without reporting".to_string(),
            };
            warn!("{} task aborted: {}", kind, reason);
            let outcome = TaskOutcome::Failed {
                kind,
                cause: CompletionError::Aborted(reason),
            };
            self.record(outcome, sink, &mut report, total);
        }

        self.state = OrchestratorState::Done;
        report
    }

    fn record(
        &mut self,
        outcome: TaskOutcome,
        sink: &mut dyn OutcomeSink,
        report: &mut OrchestrationReport,
        total: usize,
    ) {
        sink.report(&outcome);
        report.outcomes.push(outcome);
        self.state = OrchestratorState::Running {
            pending: total.saturating_sub(report.outcomes.len()),
        };
    }
}

/// One completion with per-attempt timeout and optional retry.
async fn execute(
    client: &dyn CompletionClient,
    request: &CompletionRequest,
    options: &TaskOptions,
) -> Result<String, CompletionError> {
    retry_with_backoff(
        options.max_attempts,
        || async {
            match options.timeout {
                Some(limit) => match tokio::time::timeout(limit, client.complete(request)).await {
                    Ok(result) => result,
                    Err(_) => Err(CompletionError::Timeout(limit.as_secs())),
                },
                None => client.complete(request).await,
            }
        },
        |attempts, last| CompletionError::RetriesExhausted {
            attempts,
            last: Box::new(last),
        },
    )
    .await
}
