//! contrib-checker command-line tool.
//!
//! Runs a contributor check against a local repository, or acts as the CI
//! entry point for GitHub Actions (`github`) and GitLab CI (`gitlab`).

mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use contrib_checker_core::config::DEFAULT_CONFIG_PATH;
use contrib_checker_core::platform::{self, GitHubPlatform, GitLabPlatform};
use contrib_checker_core::{CheckResult, ContributorChecker, Mode, RawCheckConfig};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// Check that git contributors are listed in CITATION.cff / codemeta.json.
#[derive(Parser, Debug)]
#[command(
    name = "contrib-checker",
    version,
    about = "Check that git contributors are credited in citation metadata",
    after_help = "Examples:\n  \
        contrib-checker\n  \
        contrib-checker --mode fail\n  \
        contrib-checker --ignore-emails bot@example.com --ignore-logins bot-user\n  \
        contrib-checker --from-sha abc123 --to-sha def456\n  \
        contrib-checker --repo-path /path/to/repo"
)]
struct Cli {
    /// Path to the repository root.
    #[arg(long, global = true, default_value = ".")]
    repo_path: PathBuf,

    /// warn: report only. fail: exit 1 when contributors are missing.
    #[arg(long, global = true, value_enum)]
    mode: Option<ModeArg>,

    /// Email address to ignore (repeatable).
    #[arg(long = "ignore-emails", global = true, value_name = "EMAIL")]
    ignore_emails: Vec<String>,

    /// Login to ignore (repeatable).
    #[arg(long = "ignore-logins", global = true, value_name = "LOGIN")]
    ignore_logins: Vec<String>,

    /// Start of the commit range (exclusive); requires --to-sha.
    #[arg(long)]
    from_sha: Option<String>,

    /// End of the commit range (inclusive); requires --from-sha.
    #[arg(long)]
    to_sha: Option<String>,

    /// YAML or TOML config file. Defaults to
    /// `.github/contrib-metadata-check.yml` in the repository, if present.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Deadline for reading history, in seconds (0 disables it).
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as a GitHub Actions step (PR mode when PR_* variables are set).
    Github,

    /// Run as a GitLab CI job (MR mode when CI_MERGE_REQUEST_* variables are set).
    Gitlab,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ModeArg {
    Warn,
    Fail,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Warn => Mode::Warn,
            ModeArg::Fail => Mode::Fail,
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}", output::failure(&format!("Error: {:#}", e)));
            ExitCode::FAILURE
        }
    }
}

/// Run the selected check; `Ok(success)` decides the exit code.
async fn run(cli: Cli) -> Result<bool> {
    let range = range_args(&cli)?;

    let (success, result) = match cli.command {
        None => {
            let checker = local_checker(&cli)?;
            match range {
                Some((from, to)) => {
                    debug!(%from, %to, "checking commit range");
                    checker.check_range_contributors(&from, &to, "specified range")
                }
                None => checker.check_all_contributors(),
            }
            .context("contributor check failed")?
        }
        Some(Commands::Github) => {
            let raw = GitHubPlatform::raw_config(&cli.repo_path, |name| std::env::var(name).ok())
                .context("failed to load GitHub configuration")?;
            let checker = checker_from(&cli, raw)?;
            let github = GitHubPlatform::from_env();
            platform::run(&github, &checker)
                .await
                .context("GitHub contributor check failed")?
        }
        Some(Commands::Gitlab) => {
            let raw = GitLabPlatform::raw_config(|name| std::env::var(name).ok());
            let checker = checker_from(&cli, raw)?;
            let gitlab = GitLabPlatform::from_env();
            platform::run(&gitlab, &checker)
                .await
                .context("GitLab contributor check failed")?
        }
    };

    print_report(&result);
    Ok(success)
}

fn print_report(result: &CheckResult) {
    println!("{}", output::render_report(result));
}

// ---------------------------------------------------------------------------
// Config helpers
// ---------------------------------------------------------------------------

/// `--from-sha`/`--to-sha` are all-or-nothing and local-only.
fn range_args(cli: &Cli) -> Result<Option<(String, String)>> {
    let range = match (&cli.from_sha, &cli.to_sha) {
        (Some(from), Some(to)) => Some((from.clone(), to.clone())),
        (None, None) => None,
        _ => anyhow::bail!("both --from-sha and --to-sha must be provided for range checking"),
    };
    if range.is_some() && cli.command.is_some() {
        anyhow::bail!("--from-sha/--to-sha cannot be combined with a platform subcommand");
    }
    Ok(range)
}

/// Defaults, then the config file, then command-line flags.
fn local_checker(cli: &Cli) -> Result<ContributorChecker> {
    let mut raw = RawCheckConfig::defaults();
    if let Some(path) = config_file(cli) {
        let file = RawCheckConfig::load_from_file(&path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?;
        raw = raw.merge(file);
    }
    checker_from(cli, raw)
}

fn config_file(cli: &Cli) -> Option<PathBuf> {
    if let Some(path) = &cli.config {
        return Some(path.clone());
    }
    let default = cli.repo_path.join(DEFAULT_CONFIG_PATH);
    default.is_file().then_some(default)
}

/// Overlay command-line flags on `raw` and build the checker.
fn checker_from(cli: &Cli, raw: RawCheckConfig) -> Result<ContributorChecker> {
    let raw = raw.merge(flag_layer(cli));
    let config = raw.validate().context("invalid configuration")?;
    Ok(ContributorChecker::new(&cli.repo_path, config, None))
}

fn flag_layer(cli: &Cli) -> RawCheckConfig {
    let mut layer = RawCheckConfig::default();
    if let Some(mode) = cli.mode {
        layer = layer.with_mode(mode.into());
    }
    if !cli.ignore_emails.is_empty() {
        layer = layer.with_ignore_emails(cli.ignore_emails.iter().cloned());
    }
    if !cli.ignore_logins.is_empty() {
        layer = layer.with_ignore_logins(cli.ignore_logins.iter().cloned());
    }
    if let Some(secs) = cli.timeout_secs {
        layer = layer.with_history_timeout_secs(secs);
    }
    layer
}
