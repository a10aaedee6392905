use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::application::use_cases::SyncRepositoriesUseCase;
use crate::domain::entities::migration_settings::{SyncSettings, DEFAULT_SYNC_INPUT};
use crate::domain::value_objects::{credential::Credential, host_target::HostTarget};
use crate::infrastructure::scm::git_cli::GitCli;
use crate::presentation::cli::GlobalArgs;
use crate::presentation::ui::display::{ConsoleObserver, DisplayHelper};

/// Arguments of the sync phase
#[derive(Debug, Args)]
pub struct SyncArgs {
    /// CSV file listing the repositories
    #[arg(short, long, env = "GHMLFS_INPUT", default_value = DEFAULT_SYNC_INPUT)]
    pub input: PathBuf,

    /// Directory holding the pulled repositories
    #[arg(short = 'w', long, env = "GHMLFS_WORK_DIR")]
    pub work_dir: PathBuf,

    /// Destination organization
    #[arg(short = 'o', long, env = "GHMLFS_NEW_ORG")]
    pub new_org: String,

    /// Access token for the destination
    #[arg(short, long, env = "GHMLFS_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Number of repositories pushed in parallel
    #[arg(long, env = "GHMLFS_WORKERS", default_value_t = 1)]
    pub workers: usize,

    /// Destination GitHub Enterprise Server hostname (github.com when omitted)
    #[arg(short = 'n', long, env = "GHMLFS_HOSTNAME")]
    pub hostname: Option<String>,
}

/// Handler for the sync command
pub struct SyncCommand {
    display: DisplayHelper,
    verbose: bool,
}

impl SyncCommand {
    pub fn new(display: DisplayHelper, verbose: bool) -> Self {
        Self { display, verbose }
    }

    pub async fn execute(
        &self,
        args: &SyncArgs,
        global: &GlobalArgs,
        cancel: CancellationToken,
    ) -> Result<()> {
        let host = HostTarget::from_option(args.hostname.as_deref())?;
        let settings = SyncSettings::new(
            args.input.clone(),
            args.work_dir.clone(),
            args.new_org.trim(),
            Credential::new(args.token.as_str()),
        )
        .with_workers(args.workers)
        .with_job_timeout(global.job_timeout())
        .with_host(host.clone());

        self.display.print_banner(
            &format!("Syncing repositories to {}", args.new_org.trim()),
            &host,
            &global.proxy_settings(),
        );

        let observer = Arc::new(ConsoleObserver::new(self.display.clone(), self.verbose));
        let report = SyncRepositoriesUseCase::new(settings, GitCli::new(global.git_settings()))
            .with_observer(observer)
            .with_cancellation(cancel.clone())
            .execute()
            .await?;

        self.display.print_report(&report, false);

        Ok(super::phase_status(&report, &cancel)?)
    }
}
