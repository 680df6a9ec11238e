//! Diff bounding: keep prompt input inside a model-safe budget.
//!
//! Two metrics are supported. `Chars` counts Unicode scalar values and keeps
//! an exact prefix. `Tokens` encodes with the target model's BPE, keeps the
//! leading `limit` tokens and decodes them back, stepping back to the nearest
//! prefix that decodes to valid UTF-8 and re-encodes within the limit.

use std::fmt;

use tiktoken_rs::CoreBPE;
use tracing::debug;

use crate::error::BoundError;
use crate::git::Diff;

/// Default limit for the token metric.
pub const DEFAULT_TOKEN_LIMIT: usize = 3_000;

/// Default limit for the character metric.
pub const DEFAULT_CHAR_LIMIT: usize = 6_000;

/// How diff length is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum MetricKind {
    Chars,
    #[default]
    Tokens,
}

impl MetricKind {
    pub fn default_limit(self) -> usize {
        match self {
            MetricKind::Chars => DEFAULT_CHAR_LIMIT,
            MetricKind::Tokens => DEFAULT_TOKEN_LIMIT,
        }
    }
}

/// A measuring strategy, bound to a model for token counting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metric {
    Chars,
    Tokens { model: String },
}

impl Metric {
    pub fn new(kind: MetricKind, model: &str) -> Self {
        match kind {
            MetricKind::Chars => Metric::Chars,
            MetricKind::Tokens => Metric::Tokens {
                model: model.to_string(),
            },
        }
    }

    pub fn kind(&self) -> MetricKind {
        match self {
            Metric::Chars => MetricKind::Chars,
            Metric::Tokens { .. } => MetricKind::Tokens,
        }
    }
}

/// Record of a truncation, displayed to the user as a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truncation {
    pub original_chars: usize,
    /// Token count before truncation; `None` under the character metric.
    pub original_tokens: Option<usize>,
    pub limit: usize,
}

impl fmt::Display for Truncation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.original_tokens {
            Some(tokens) => write!(
                f,
                "Diff at {} chars, {} tokens is too large, truncating to {} tokens.",
                self.original_chars, tokens, self.limit
            ),
            None => write!(
                f,
                "Diff at {} chars is too large, truncating to {} chars.",
                self.original_chars, self.limit
            ),
        }
    }
}

/// A diff that fits within the configured limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedDiff {
    text: String,
    truncation: Option<Truncation>,
}

impl BoundedDiff {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Present when the input was over the limit and got cut.
    pub fn truncation(&self) -> Option<&Truncation> {
        self.truncation.as_ref()
    }

    pub fn is_truncated(&self) -> bool {
        self.truncation.is_some()
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Bounds diffs with one metric, limit and (for tokens) tokenizer instance.
pub struct Bounder {
    limit: usize,
    encoder: Option<CoreBPE>,
}

impl fmt::Debug for Bounder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bounder")
            .field("limit", &self.limit)
            .field("tokens", &self.encoder.is_some())
            .finish()
    }
}

impl Bounder {
    /// Build a bounder, loading the model's tokenizer for the token metric.
    ///
    /// Unknown model names fall back to `cl100k_base`.
    pub fn new(metric: &Metric, limit: usize) -> Result<Self, BoundError> {
        let encoder = match metric {
            Metric::Chars => None,
            Metric::Tokens { model } => Some(load_encoder(model)?),
        };

        Ok(Self { limit, encoder })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Length of `text` under this bounder's metric.
    pub fn measure(&self, text: &str) -> usize {
        match &self.encoder {
            Some(bpe) => bpe.encode_ordinary(text).len(),
            None => text.chars().count(),
        }
    }

    /// Bound a diff. Text under the limit is returned unchanged.
    pub fn bound(&self, diff: Diff) -> BoundedDiff {
        self.bound_text(diff.text)
    }

    /// Bound raw text. Text under the limit is returned unchanged.
    pub fn bound_text(&self, text: String) -> BoundedDiff {
        let bounded = match &self.encoder {
            Some(bpe) => self.bound_tokens(bpe, text),
            None => self.bound_chars(text),
        };

        if let Some(truncation) = &bounded.truncation {
            debug!("{}", truncation);
        }

        bounded
    }

    fn bound_chars(&self, text: String) -> BoundedDiff {
        let original_chars = text.chars().count();
        if original_chars <= self.limit {
            return BoundedDiff {
                text,
                truncation: None,
            };
        }

        let truncated: String = text.chars().take(self.limit).collect();

        BoundedDiff {
            text: truncated,
            truncation: Some(Truncation {
                original_chars,
                original_tokens: None,
                limit: self.limit,
            }),
        }
    }

    fn bound_tokens(&self, bpe: &CoreBPE, text: String) -> BoundedDiff {
        let tokens = bpe.encode_ordinary(&text);
        if tokens.len() <= self.limit {
            return BoundedDiff {
                text,
                truncation: None,
            };
        }

        let truncation = Truncation {
            original_chars: text.chars().count(),
            original_tokens: Some(tokens.len()),
            limit: self.limit,
        };

        // A slice can end inside a multi-byte character, and a decoded prefix
        // can re-tokenize differently; step back until both hold.
        let mut end = self.limit;
        let mut truncated = String::new();
        while end > 0 {
            if let Ok(decoded) = bpe.decode(tokens[..end].to_vec()) {
                if bpe.encode_ordinary(&decoded).len() <= self.limit {
                    truncated = decoded;
                    break;
                }
            }
            end -= 1;
        }

        if end < self.limit {
            debug!(
                "Token slice stepped back from {} to {} to stay decodable",
                self.limit, end
            );
        }

        BoundedDiff {
            text: truncated,
            truncation: Some(truncation),
        }
    }
}

/// Bound `diff` to `limit` under `metric`.
pub fn bound(diff: Diff, limit: usize, metric: &Metric) -> Result<BoundedDiff, BoundError> {
    Ok(Bounder::new(metric, limit)?.bound(diff))
}

fn load_encoder(model: &str) -> Result<CoreBPE, BoundError> {
    match tiktoken_rs::get_bpe_from_model(model) {
        Ok(bpe) => Ok(bpe),
        Err(e) => {
            debug!("No tokenizer registered for '{}' ({}), using cl100k_base", model, e);
            tiktoken_rs::cl100k_base().map_err(|e| BoundError::Tokenizer {
                model: model.to_string(),
                reason: e.to_string(),
            })
        }
    }
}
