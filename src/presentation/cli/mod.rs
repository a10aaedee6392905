pub mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::process::exit;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::domain::entities::migration_settings::{
    GitSettings, ProxySettings, DEFAULT_MAX_RETRIES,
};
use crate::presentation::ui::display::DisplayHelper;
use commands::{PullArgs, PullCommand, SyncArgs, SyncCommand};

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");
const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("GIT_HASH"),
    "\nbuilt:  ",
    env!("BUILD_DATE"),
    "\ntarget: ",
    env!("BUILD_TARGET"),
);

/// migrate-lfs - Migrate Git LFS content between organizations
#[derive(Parser)]
#[command(name = "migrate-lfs")]
#[command(about = "Clone repositories with their Git LFS objects and push them to a new organization")]
#[command(version = VERSION, long_version = LONG_VERSION)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every phase
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true, env = "GHMLFS_VERBOSE")]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "GHMLFS_NO_COLOR")]
    pub no_color: bool,

    /// Git executable to invoke
    #[arg(long, global = true, env = "GHMLFS_GIT", default_value = "git")]
    pub git: String,

    /// HTTP proxy passed to git (falls back to HTTP_PROXY)
    #[arg(long, global = true, env = "GHMLFS_HTTP_PROXY")]
    pub http_proxy: Option<String>,

    /// HTTPS proxy passed to git (falls back to HTTPS_PROXY)
    #[arg(long, global = true, env = "GHMLFS_HTTPS_PROXY")]
    pub https_proxy: Option<String>,

    /// Hosts that bypass the proxy (falls back to NO_PROXY)
    #[arg(long, global = true, env = "GHMLFS_NO_PROXY")]
    pub no_proxy: Option<String>,

    /// Retries for a failing git command
    #[arg(long, global = true, env = "GHMLFS_MAX_RETRIES", default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    /// Delay between retries (e.g. 500ms, 1s, 2m)
    #[arg(long, global = true, env = "GHMLFS_RETRY_DELAY", default_value = "1s", value_parser = parse_duration)]
    pub retry_delay: Duration,

    /// Time limit for a single repository, in seconds
    #[arg(long, global = true, env = "GHMLFS_JOB_TIMEOUT")]
    pub job_timeout: Option<u64>,
}

impl GlobalArgs {
    /// Proxy settings, falling back to the conventional environment variables
    pub fn proxy_settings(&self) -> ProxySettings {
        ProxySettings {
            http_proxy: with_env_fallback(&self.http_proxy, &["HTTP_PROXY", "http_proxy"]),
            https_proxy: with_env_fallback(&self.https_proxy, &["HTTPS_PROXY", "https_proxy"]),
            no_proxy: with_env_fallback(&self.no_proxy, &["NO_PROXY", "no_proxy"]),
        }
    }

    pub fn git_settings(&self) -> GitSettings {
        GitSettings::default()
            .with_executable(self.git.clone())
            .with_retries(self.max_retries, self.retry_delay)
            .with_proxy(self.proxy_settings())
    }

    pub fn job_timeout(&self) -> Option<Duration> {
        self.job_timeout
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn use_color(&self) -> bool {
        !self.no_color && std::env::var_os("NO_COLOR").is_none()
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clone repositories listed in the input file and fetch their LFS objects
    Pull(PullArgs),

    /// Push previously pulled repositories, with LFS objects, to a new organization
    Sync(SyncArgs),
}

/// Parse a duration such as `250ms`, `1s`, `2m` or a bare number of seconds
pub fn parse_duration(input: &str) -> std::result::Result<Duration, String> {
    let input = input.trim();
    let (digits, unit) = match input.find(|c: char| !c.is_ascii_digit()) {
        Some(index) => input.split_at(index),
        None => (input, "s"),
    };
    let value: u64 = digits
        .parse()
        .map_err(|_| format!("invalid duration '{}'", input))?;

    match unit.trim() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => value
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(|| format!("duration '{}' is too large", input)),
        other => Err(format!(
            "invalid duration unit '{}' (expected ms, s or m)",
            other
        )),
    }
}

fn with_env_fallback(value: &Option<String>, names: &[&str]) -> Option<String> {
    value
        .clone()
        .or_else(|| names.iter().find_map(|name| std::env::var(name).ok()))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Install the stderr log subscriber
///
/// `RUST_LOG` wins when set.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "migrate_lfs=debug" } else { "error" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A subscriber may already be installed when embedded.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Cancel `token` on Ctrl-C
fn install_interrupt_handler(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling remaining repositories");
            token.cancel();
        }
    });
}

pub struct CliApp {
    cli: Cli,
}

impl CliApp {
    pub fn new() -> Self {
        Self { cli: Cli::parse() }
    }

    pub async fn run(self) -> Result<()> {
        init_logging(self.cli.global.verbose);
        colored::control::set_override(self.cli.global.use_color());

        let cancel = CancellationToken::new();
        install_interrupt_handler(cancel.clone());

        match self.handle_command(cancel).await {
            Ok(_) => Ok(()),
            Err(e) => {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
                exit(1);
            }
        }
    }

    async fn handle_command(&self, cancel: CancellationToken) -> Result<()> {
        let global = &self.cli.global;
        let display = DisplayHelper::new(global.use_color());

        match &self.cli.command {
            Commands::Pull(args) => {
                PullCommand::new(display, global.verbose)
                    .execute(args, global, cancel)
                    .await
            }
            Commands::Sync(args) => {
                SyncCommand::new(display, global.verbose)
                    .execute(args, global, cancel)
                    .await
            }
        }
    }
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}
