use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::scm_interface::{VcsCommands, VcsError};
use crate::domain::entities::migration_settings::GitSettings;
use crate::infrastructure::process::{CommandExecutor, CommandExecutorError, ExecutionConfig};

/// Environment variable that stops git-lfs from downloading content on checkout.
const SKIP_SMUDGE_VAR: &str = "GIT_LFS_SKIP_SMUDGE";

/// Git implementation of [`VcsCommands`] backed by the `git` executable.
///
/// Failed commands are retried up to `max_retries` times with `retry_delay` between
/// attempts. Proxy settings are passed to every child process.
pub struct GitCli {
    settings: GitSettings,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new(GitSettings::default())
    }
}

impl GitCli {
    pub fn new(settings: GitSettings) -> Self {
        Self { settings }
    }

    fn base_config(&self) -> ExecutionConfig {
        ExecutionConfig::new().with_environment_variables(self.settings.proxy.environment())
    }

    /// Run a git command once. `label` names the command in errors and logs and must
    /// never include arguments, which may carry credentials.
    async fn run_once(
        &self,
        label: &str,
        args: &[OsString],
        config: &ExecutionConfig,
        cancel: &CancellationToken,
    ) -> Result<String, VcsError> {
        let result = CommandExecutor::execute(&self.settings.executable, args, config, cancel)
            .await
            .map_err(|e| match e {
                CommandExecutorError::Cancelled => VcsError::cancelled(label),
                CommandExecutorError::SpawnFailed(message)
                | CommandExecutorError::InvalidCommand(message) => VcsError::ExecutableNotFound {
                    executable: self.settings.executable.clone(),
                    message,
                },
                CommandExecutorError::TerminationFailed(message) => VcsError::IoError {
                    source: std::io::Error::new(std::io::ErrorKind::Other, message),
                },
            })?;

        if !result.success {
            return Err(VcsError::command_failed(
                label,
                result.exit_code,
                result.combined_output(),
            ));
        }

        debug!(
            command = label,
            elapsed_ms = result.execution_time_ms,
            "git command completed"
        );
        Ok(result.combined_output())
    }

    /// Run a git command, retrying failures that may be transient.
    ///
    /// `scratch_dir` is a directory the command creates itself; a failed attempt's
    /// leftovers there are removed before the next attempt.
    async fn run(
        &self,
        label: &str,
        args: Vec<OsString>,
        config: ExecutionConfig,
        scratch_dir: Option<&Path>,
        cancel: &CancellationToken,
    ) -> Result<String, VcsError> {
        let mut attempt = 0;
        loop {
            match self.run_once(label, &args, &config, cancel).await {
                Ok(output) => return Ok(output),
                Err(e) if e.is_retryable() && attempt < self.settings.max_retries => {
                    attempt += 1;
                    warn!(
                        command = label,
                        attempt,
                        max_retries = self.settings.max_retries,
                        "git command failed, retrying"
                    );
                    if let Some(dir) = scratch_dir {
                        remove_scratch_dir(dir).await?;
                    }
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(VcsError::cancelled(label)),
                        _ = tokio::time::sleep(self.settings.retry_delay) => {}
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn run_in(
        &self,
        label: &str,
        repo_dir: &Path,
        args: &[&str],
        cancel: &CancellationToken,
    ) -> Result<String, VcsError> {
        let config = self.base_config().with_working_directory(repo_dir);
        self.run(label, to_os_args(args), config, None, cancel).await
    }
}

async fn remove_scratch_dir(dir: &Path) -> Result<(), VcsError> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {
            debug!(path = %dir.display(), "removed partial clone before retry");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(VcsError::IoError { source }),
    }
}

fn to_os_args(args: &[&str]) -> Vec<OsString> {
    args.iter().map(OsString::from).collect()
}

#[async_trait]
impl VcsCommands for GitCli {
    async fn check_availability(&self) -> Result<String, VcsError> {
        self.run_once(
            "git --version",
            &to_os_args(&["--version"]),
            &self.base_config(),
            &CancellationToken::new(),
        )
        .await
    }

    async fn clone_without_smudge(
        &self,
        locator: &str,
        target_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<String, VcsError> {
        let args = vec![
            OsString::from("clone"),
            OsString::from(locator),
            target_dir.as_os_str().to_os_string(),
        ];
        let config = self
            .base_config()
            .with_environment_variable(SKIP_SMUDGE_VAR, "1");
        // Never clean up a directory that was there before the clone.
        let scratch_dir = tokio::fs::metadata(target_dir)
            .await
            .is_err()
            .then_some(target_dir);
        self.run("git clone", args, config, scratch_dir, cancel).await
    }

    async fn pull_all(
        &self,
        repo_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<String, VcsError> {
        self.run_in("git pull", repo_dir, &["pull", "--all"], cancel)
            .await
    }

    async fn lfs_pull(
        &self,
        repo_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<String, VcsError> {
        self.run_in("git lfs pull", repo_dir, &["lfs", "pull"], cancel)
            .await
    }

    async fn remote_remove(
        &self,
        repo_dir: &Path,
        remote: &str,
        cancel: &CancellationToken,
    ) -> Result<String, VcsError> {
        self.run_in("git remote remove", repo_dir, &["remote", "remove", remote], cancel)
            .await
    }

    async fn remote_add(
        &self,
        repo_dir: &Path,
        remote: &str,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<String, VcsError> {
        self.run_in("git remote add", repo_dir, &["remote", "add", remote, url], cancel)
            .await
    }

    async fn lfs_push_all(
        &self,
        repo_dir: &Path,
        remote: &str,
        cancel: &CancellationToken,
    ) -> Result<String, VcsError> {
        self.run_in("git lfs push", repo_dir, &["lfs", "push", "--all", remote], cancel)
            .await
    }

    async fn push_all(
        &self,
        repo_dir: &Path,
        remote: &str,
        cancel: &CancellationToken,
    ) -> Result<String, VcsError> {
        self.run_in("git push", repo_dir, &["push", "--all", remote], cancel)
            .await
    }
}
