use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::application::use_cases::PullRepositoriesUseCase;
use crate::domain::entities::migration_settings::PullSettings;
use crate::domain::value_objects::{credential::Credential, host_target::HostTarget};
use crate::infrastructure::scm::git_cli::GitCli;
use crate::presentation::cli::GlobalArgs;
use crate::presentation::ui::display::{ConsoleObserver, DisplayHelper};

/// Arguments of the pull phase
#[derive(Debug, Args)]
pub struct PullArgs {
    /// CSV file listing the repositories (Repository,GitAttributesPaths,CloneURL)
    #[arg(short = 'f', long = "file", env = "GHMLFS_FILE")]
    pub file: PathBuf,

    /// Access token used to authenticate clones
    #[arg(short, long, env = "GHMLFS_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Directory the repositories are cloned into
    #[arg(short = 'd', long, env = "GHMLFS_WORK_DIR")]
    pub work_dir: PathBuf,

    /// Number of repositories processed in parallel
    #[arg(short, long, env = "GHMLFS_WORKERS", default_value_t = 1)]
    pub workers: usize,

    /// GitHub Enterprise Server hostname
    #[arg(short = 'n', long, env = "GHMLFS_HOSTNAME")]
    pub hostname: Option<String>,
}

/// Handler for the pull command
pub struct PullCommand {
    display: DisplayHelper,
    verbose: bool,
}

impl PullCommand {
    pub fn new(display: DisplayHelper, verbose: bool) -> Self {
        Self { display, verbose }
    }

    pub async fn execute(
        &self,
        args: &PullArgs,
        global: &GlobalArgs,
        cancel: CancellationToken,
    ) -> Result<()> {
        // Build settings
        let host = HostTarget::from_option(args.hostname.as_deref())?;
        let settings = PullSettings::new(
            args.file.clone(),
            args.work_dir.clone(),
            Credential::new(args.token.as_str()),
        )
        .with_workers(args.workers)
        .with_job_timeout(global.job_timeout())
        .with_host(host.clone());

        self.display
            .print_banner("Pulling repositories", &host, &global.proxy_settings());

        // Execute the use case
        let observer = Arc::new(ConsoleObserver::new(self.display.clone(), self.verbose));
        let report = PullRepositoriesUseCase::new(settings, GitCli::new(global.git_settings()))
            .with_observer(observer)
            .with_cancellation(cancel.clone())
            .execute()
            .await?;

        self.display.print_report(&report, true);

        Ok(super::phase_status(&report, &cancel)?)
    }
}
