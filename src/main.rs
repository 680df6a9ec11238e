//! diffscribe - CLI entry point.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use diffscribe::commit::{ActionPolicy, TerminalPrompter};
use diffscribe::git::{GitCli, check_git_installed};
use diffscribe::llm::OpenAiClient;
use diffscribe::report::ConsoleReporter;
use diffscribe::{
    ApiKey, DiffScope, MetricKind, RunSummary, Settings, render_commit_prompt, run_generate,
};

/// Generate commit messages and a quick review from your git diff.
#[derive(Parser, Debug)]
#[command(name = "diffscribe")]
#[command(about = "Generate commit messages and a quick review from your git diff")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    generate: GenerateArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a commit message, show the review, offer to commit (default)
    Generate(GenerateArgs),

    /// Print the commit prompt for the current diff without calling the model
    PrintPrompt(DiffArgs),
}

#[derive(Args, Debug, Default)]
struct GenerateArgs {
    /// Commit without asking
    #[arg(long)]
    commit: bool,

    /// Push after committing without asking
    #[arg(long)]
    push: bool,

    /// Per-call timeout in seconds (0 disables it)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Total attempts per completion
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=10))]
    retries: Option<u32>,

    #[command(flatten)]
    diff: DiffArgs,
}

#[derive(Args, Debug, Default)]
struct DiffArgs {
    /// Which changes to describe
    #[arg(long, value_enum)]
    scope: Option<DiffScope>,

    /// How to measure diff size
    #[arg(long, value_enum)]
    metric: Option<MetricKind>,

    /// Maximum diff size under the chosen metric
    #[arg(long, value_name = "N")]
    limit: Option<usize>,

    /// Model identifier
    #[arg(long)]
    model: Option<String>,

    /// Show debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Repository to describe (defaults to the current directory)
    #[arg(value_name = "REPO_PATH", value_parser = existing_path)]
    repo_path: Option<PathBuf>,
}

impl DiffArgs {
    fn repo(&self) -> PathBuf {
        self.repo_path.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    fn apply(&self, settings: &mut Settings) {
        if let Some(scope) = self.scope {
            settings.scope = scope;
        }
        if let Some(metric) = self.metric {
            settings.metric = metric;
        }
        if let Some(limit) = self.limit {
            settings.limit = Some(limit);
        }
        if let Some(model) = &self.model {
            settings.model = model.clone();
        }
    }
}

impl GenerateArgs {
    fn apply(&self, settings: &mut Settings) {
        self.diff.apply(settings);
        if let Some(secs) = self.timeout {
            settings.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(attempts) = self.retries {
            settings.max_attempts = attempts;
        }
    }

    fn policy(&self) -> ActionPolicy {
        ActionPolicy {
            force_commit: self.commit,
            force_push: self.push,
        }
    }
}

fn existing_path(raw: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw);
    if path.exists() {
        Ok(path)
    } else {
        Err(format!("path does not exist: {}", raw))
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            "diffscribe=debug,warn".into()
        } else {
            "warn".into()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::PrintPrompt(args)) => print_prompt(args),
        Some(Command::Generate(args)) => generate(args).await,
        None => generate(cli.generate).await,
    }
}

fn print_prompt(args: DiffArgs) -> Result<()> {
    init_tracing(args.verbose);
    check_git_installed().context("git is required")?;

    let mut settings = Settings::from_env();
    args.apply(&mut settings);

    let mut reporter = ConsoleReporter::stdio();
    let prompt = render_commit_prompt(&args.repo(), &settings, &mut reporter)
        .context("Failed to build commit prompt")?;
    println!("{}", prompt);
    Ok(())
}

async fn generate(args: GenerateArgs) -> Result<()> {
    init_tracing(args.diff.verbose);
    check_git_installed().context("git is required")?;

    let api_key = ApiKey::from_env()?;
    let mut settings = Settings::from_env();
    args.apply(&mut settings);

    let client = OpenAiClient::new(api_key, &settings)
        .context("Failed to set up the completion client")?;
    let repo = args.diff.repo();
    let vcs = GitCli::new(&repo);
    let mut reporter = ConsoleReporter::stdio();

    let summary = run_generate(
        &repo,
        &settings,
        &args.policy(),
        Arc::new(client),
        &TerminalPrompter,
        &vcs,
        &mut reporter,
    )
    .await?;

    if let RunSummary::Completed { action: None, .. } = summary {
        anyhow::bail!("No commit message was generated");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_action_flags() {
        let cli = Cli::try_parse_from(["diffscribe", "--commit", "--push", "."]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.generate.commit);
        assert!(cli.generate.push);
        assert_eq!(cli.generate.diff.repo(), PathBuf::from("."));
    }

    #[test]
    fn test_print_prompt_subcommand() {
        let cli = Cli::try_parse_from([
            "diffscribe",
            "print-prompt",
            "--scope",
            "working-tree",
            "--metric",
            "chars",
            "--limit",
            "100",
        ])
        .unwrap();

        match cli.command {
            Some(Command::PrintPrompt(args)) => {
                let mut settings = Settings::default();
                args.apply(&mut settings);
                assert_eq!(settings.scope, DiffScope::WorkingTree);
                assert_eq!(settings.metric, MetricKind::Chars);
                assert_eq!(settings.diff_limit(), 100);
            }
            other => panic!("Expected print-prompt, got: {:?}", other),
        }
    }

    #[test]
    fn test_missing_repo_path_is_rejected() {
        let result = Cli::try_parse_from(["diffscribe", "/definitely/not/a/real/path"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_generate_overrides() {
        let cli = Cli::try_parse_from([
            "diffscribe",
            "generate",
            "--timeout",
            "0",
            "--retries",
            "3",
            "--model",
            "gpt-4o",
        ])
        .unwrap();

        let Some(Command::Generate(args)) = cli.command else {
            panic!("Expected generate subcommand");
        };
        let mut settings = Settings {
            request_timeout: Some(Duration::from_secs(5)),
            ..Settings::default()
        };
        args.apply(&mut settings);
        assert_eq!(settings.request_timeout, None);
        assert_eq!(settings.max_attempts, 3);
        assert_eq!(settings.model, "gpt-4o");
    }
}
