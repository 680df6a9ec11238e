//! Completion client and retry policy.

pub mod client;
pub mod retry;

pub use client::{CompletionClient, CompletionRequest, OpenAiClient};
pub use retry::retry_with_backoff;
