//! Commit types and header validation for generated messages.

use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;

/// Maximum length of the summary after `<type>: `.
pub const MAX_SUMMARY_CHARS: usize = 50;

/// Conventional commit types accepted in the first line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommitType {
    Build,
    Chore,
    Ci,
    Docs,
    Feat,
    Fix,
    Perf,
    Refactor,
    Revert,
    Style,
    Test,
}

impl CommitType {
    /// Every type, in the order they are listed to the model.
    pub const ALL: [CommitType; 11] = [
        CommitType::Build,
        CommitType::Chore,
        CommitType::Ci,
        CommitType::Docs,
        CommitType::Feat,
        CommitType::Fix,
        CommitType::Perf,
        CommitType::Refactor,
        CommitType::Revert,
        CommitType::Style,
        CommitType::Test,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommitType::Build => "build",
            CommitType::Chore => "chore",
            CommitType::Ci => "ci",
            CommitType::Docs => "docs",
            CommitType::Feat => "feat",
            CommitType::Fix => "fix",
            CommitType::Perf => "perf",
            CommitType::Refactor => "refactor",
            CommitType::Revert => "revert",
            CommitType::Style => "style",
            CommitType::Test => "test",
        }
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CommitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommitType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown commit type: {}", s))
    }
}

/// Something about a generated message that does not match the requested shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageIssue {
    /// First line is not `<type>: <summary>`.
    MalformedHeader,
    /// Type prefix is outside the closed set.
    UnknownType(String),
    /// Summary exceeds [`MAX_SUMMARY_CHARS`].
    SummaryTooLong(usize),
    /// Details follow the first line without a separating blank line.
    MissingBlankLine,
}

impl fmt::Display for MessageIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageIssue::MalformedHeader => {
                write!(f, "first line is not formatted as <type>: <summary>")
            }
            MessageIssue::UnknownType(t) => write!(f, "'{}' is not a known commit type", t),
            MessageIssue::SummaryTooLong(len) => write!(
                f,
                "summary is {} characters, over the {} character limit",
                len, MAX_SUMMARY_CHARS
            ),
            MessageIssue::MissingBlankLine => {
                write!(f, "details are not separated from the summary by a blank line")
            }
        }
    }
}

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)(?:\([^)]*\))?!?:\s+(.+)$").expect("valid header regex"));

/// A generated commit message split into header and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    pub header: String,
    pub body: Option<String>,
    pub commit_type: Option<CommitType>,
    pub summary: Option<String>,
    issues: Vec<MessageIssue>,
}

impl CommitMessage {
    /// Parse a model reply. Never fails: shape problems are collected as issues.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let mut lines = text.lines();
        let header = lines.next().unwrap_or("").trim().to_string();
        let rest: Vec<&str> = lines.collect();

        let mut issues = Vec::new();

        if rest.first().is_some_and(|l| !l.trim().is_empty()) {
            issues.push(MessageIssue::MissingBlankLine);
        }

        let body = {
            let joined = rest.join("\n");
            let trimmed = joined.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };

        let (commit_type, summary) = match HEADER_RE.captures(&header) {
            Some(caps) => {
                let type_str = caps.get(1).map_or("", |m| m.as_str());
                let summary = caps.get(2).map_or("", |m| m.as_str()).trim().to_string();

                let commit_type = type_str.parse::<CommitType>().ok();
                if commit_type.is_none() {
                    issues.push(MessageIssue::UnknownType(type_str.to_string()));
                }

                let len = summary.chars().count();
                if len > MAX_SUMMARY_CHARS {
                    issues.push(MessageIssue::SummaryTooLong(len));
                }

                (commit_type, Some(summary))
            }
            None => {
                issues.push(MessageIssue::MalformedHeader);
                (None, None)
            }
        };

        Self {
            header,
            body,
            commit_type,
            summary,
            issues,
        }
    }

    /// Shape problems found while parsing, in the order they were detected.
    pub fn issues(&self) -> &[MessageIssue] {
        &self.issues
    }

    pub fn is_well_formed(&self) -> bool {
        self.issues.is_empty()
    }
}
