//! Run configuration: defaults, then environment, then CLI overrides.
//!
//! Environment variables:
//! - `OPENAI_API_KEY`: credential for the completion endpoint (required to generate)
//! - `DIFFSCRIBE_BASE_URL`: endpoint base URL (default `https://api.openai.com/v1`)
//! - `DIFFSCRIBE_MODEL`: model identifier (default `gpt-4`)
//! - `DIFFSCRIBE_TIMEOUT`: per-call timeout in seconds (unset or 0 disables it)
//! - `DIFFSCRIBE_DIFF_LIMIT`: diff limit under the selected metric

use std::env;
use std::fmt;
use std::time::Duration;

use tracing::warn;

use crate::bound::{Metric, MetricKind};
use crate::error::ConfigError;
use crate::git::DiffScope;

pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV_VAR: &str = "DIFFSCRIBE_BASE_URL";
pub const MODEL_ENV_VAR: &str = "DIFFSCRIBE_MODEL";
pub const TIMEOUT_ENV_VAR: &str = "DIFFSCRIBE_TIMEOUT";
pub const LIMIT_ENV_VAR: &str = "DIFFSCRIBE_DIFF_LIMIT";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_MAX_TOKENS: u32 = 2_000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Credential for the completion endpoint.
///
/// Debug output is redacted so the key never lands in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Read the key from `OPENAI_API_KEY`. Empty values count as missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var(API_KEY_ENV_VAR) {
            Ok(key) if !key.trim().is_empty() => Ok(Self(key.trim().to_string())),
            _ => Err(ConfigError::MissingApiKey),
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Everything a run needs besides the credential.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub scope: DiffScope,
    pub metric: MetricKind,
    /// Explicit limit; `None` uses the metric's default.
    pub limit: Option<usize>,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout: Option<Duration>,
    /// Total attempts per completion; 1 means no retry.
    pub max_attempts: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scope: DiffScope::default(),
            metric: MetricKind::default(),
            limit: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            request_timeout: None,
            max_attempts: 1,
        }
    }
}

impl Settings {
    /// Defaults overlaid with any `DIFFSCRIBE_*` environment variables.
    ///
    /// Invalid values are logged and ignored.
    pub fn from_env() -> Self {
        let mut settings = Settings::default();

        if let Some(url) = non_empty_var(BASE_URL_ENV_VAR) {
            settings.base_url = url;
        }
        if let Some(model) = non_empty_var(MODEL_ENV_VAR) {
            settings.model = model;
        }
        if let Some(secs) = parse_var::<u64>(TIMEOUT_ENV_VAR) {
            settings.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(limit) = parse_var::<usize>(LIMIT_ENV_VAR) {
            settings.limit = Some(limit);
        }

        settings
    }

    /// Effective diff limit under the selected metric.
    pub fn diff_limit(&self) -> usize {
        self.limit.unwrap_or_else(|| self.metric.default_limit())
    }

    /// The measuring strategy, bound to the configured model.
    pub fn bound_metric(&self) -> Metric {
        Metric::new(self.metric, &self.model)
    }

    /// Chat completions URL derived from the base URL.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = non_empty_var(name)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Invalid {} value '{}', using default", name, raw);
            None
        }
    }
}
