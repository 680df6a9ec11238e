//! User-facing output.
//!
//! The commit message goes to stdout so it can be piped. Everything else
//! (review findings, warnings, listings) goes to stderr.

use std::io::{self, Stderr, Stdout, Write};

use crate::bound::Truncation;
use crate::commit::{ActionOutcome, CommitMessage};
use crate::git::ChangeListing;
use crate::orchestrator::{OutcomeSink, TaskOutcome};

/// Everything the generate run shows the user.
pub trait Reporter: OutcomeSink {
    fn changes(&mut self, listing: &ChangeListing);
    fn truncation(&mut self, truncation: &Truncation);
    fn nothing_to_describe(&mut self);
    fn action(&mut self, outcome: &ActionOutcome);
}

/// [`Reporter`] writing to a pair of streams.
pub struct ConsoleReporter<O: Write + Send, E: Write + Send> {
    out: O,
    err: E,
}

impl ConsoleReporter<Stdout, Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write + Send, E: Write + Send> ConsoleReporter<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }

    // Terminal write failures are not actionable mid-run.
    fn out_line(&mut self, line: &str) {
        let _ = writeln!(self.out, "{}", line);
        let _ = self.out.flush();
    }

    fn err_line(&mut self, line: &str) {
        let _ = writeln!(self.err, "{}", line);
        let _ = self.err.flush();
    }

    fn paths(&mut self, heading: &str, paths: &[String]) {
        if paths.is_empty() {
            return;
        }
        self.err_line(heading);
        for path in paths {
            self.err_line(&format!("  {}", path));
        }
    }
}

impl<O: Write + Send, E: Write + Send> OutcomeSink for ConsoleReporter<O, E> {
    fn report(&mut self, outcome: &TaskOutcome) {
        match outcome {
            TaskOutcome::CommitMessageReady(text) => {
                self.out_line(&format!("Commit message:\n\n{}\n", text));
                for issue in CommitMessage::parse(text).issues() {
                    self.err_line(&format!("Warning: {}", issue));
                }
            }
            TaskOutcome::ReviewReady(text) if text.is_empty() => {}
            TaskOutcome::ReviewReady(text) => {
                self.err_line(&format!("Potential issues found:\n\n{}\n", text));
            }
            TaskOutcome::Failed { kind, cause } => {
                self.err_line(&format!("Warning: {} task failed: {}", kind, cause));
            }
        }
    }
}

impl<O: Write + Send, E: Write + Send> Reporter for ConsoleReporter<O, E> {
    fn changes(&mut self, listing: &ChangeListing) {
        self.paths("Staged changes:", &listing.staged);
        self.paths("Unstaged changes:", &listing.unstaged);
        self.paths("Untracked files:", &listing.untracked);
    }

    fn truncation(&mut self, truncation: &Truncation) {
        self.err_line(&format!("Warning: {}", truncation));
    }

    fn nothing_to_describe(&mut self) {
        self.err_line("No changes to describe. Stage something first.");
    }

    fn action(&mut self, outcome: &ActionOutcome) {
        match outcome {
            ActionOutcome::Committed { edited, pushed } => {
                let how = if *edited { "Committed (edited)" } else { "Committed" };
                let line = if *pushed {
                    format!("{} and pushed.", how)
                } else {
                    format!("{}.", how)
                };
                self.err_line(&line);
            }
            ActionOutcome::Skipped => self.err_line("Not committing."),
            ActionOutcome::InvalidDecision(answer) => {
                self.err_line(&format!("Invalid input '{}'. Not committing.", answer));
            }
        }
    }
}
