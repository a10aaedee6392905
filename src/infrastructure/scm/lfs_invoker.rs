use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::scm_interface::{VcsCommands, VcsError};
use crate::domain::entities::repository_job::JobOutcome;
use crate::domain::value_objects::{clone_locator::AuthenticatedLocator, credential::Credential};

/// Remote that the sync phase replaces.
pub const ORIGIN_REMOTE: &str = "origin";

/// Failure of one materialize or retarget invocation.
///
/// Every `detail` has already been passed through credential redaction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvokerError {
    #[error("Failed to clone repository: {detail}")]
    CloneFailed { detail: String },

    #[error("Failed to pull updates: {detail}")]
    UpdateFailed { detail: String },

    #[error("Failed to pull LFS objects: {detail}")]
    LfsPullFailed { detail: String },

    #[error("Repository directory {} does not exist", path.display())]
    MissingRepository { path: PathBuf },

    #[error("Failed to remove remote '{remote}': {detail}")]
    RemoteRemoveFailed { remote: String, detail: String },

    #[error("Failed to add remote '{remote}': {detail}")]
    RemoteAddFailed { remote: String, detail: String },

    #[error("Failed to push LFS objects: {detail}")]
    LfsPushFailed { detail: String },

    #[error("Failed to push branches: {detail}")]
    PushFailed { detail: String },

    #[error("git is not available: {detail}")]
    Unavailable { detail: String },

    #[error("Operation cancelled")]
    Cancelled,
}

/// Removes a clone target on drop unless disarmed.
///
/// Covers both a failed clone and a clone future dropped by a timeout or
/// cancellation, where the killed process cannot clean up after itself.
struct PartialCloneGuard<'a> {
    path: &'a Path,
    armed: bool,
}

impl<'a> PartialCloneGuard<'a> {
    fn new(path: &'a Path) -> Self {
        Self { path, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PartialCloneGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_dir_all(self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed partial clone"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove partial clone"),
        }
    }
}

/// Drives the external version-control tool for one repository at a time.
///
/// All error text produced here is redacted with the configured credential, so
/// callers may log or display it freely.
pub struct LfsInvoker<C: VcsCommands> {
    commands: C,
    credential: Credential,
}

impl<C: VcsCommands> LfsInvoker<C> {
    pub fn new(commands: C, credential: Credential) -> Self {
        Self {
            commands,
            credential,
        }
    }

    fn redacted(&self, error: VcsError) -> String {
        self.credential.redact(&error.to_string())
    }

    fn wrap(
        &self,
        error: VcsError,
        build: impl FnOnce(String) -> InvokerError,
    ) -> InvokerError {
        if error.is_cancelled() {
            InvokerError::Cancelled
        } else {
            build(self.redacted(error))
        }
    }

    /// Check the tool starts; returns its version line.
    pub async fn preflight(&self) -> Result<String, InvokerError> {
        self.commands
            .check_availability()
            .await
            .map_err(|e| InvokerError::Unavailable {
                detail: self.redacted(e),
            })
    }

    /// Make `target_dir` hold an up-to-date clone with large-file content.
    ///
    /// An existing directory is refreshed in place and never re-cloned. A missing
    /// one is cloned with content download disabled, then content is pulled. A
    /// clone that does not complete leaves no directory behind.
    pub async fn materialize(
        &self,
        locator: &AuthenticatedLocator,
        target_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<JobOutcome, InvokerError> {
        let outcome = if tokio::fs::metadata(target_dir).await.is_ok() {
            debug!(path = %target_dir.display(), "repository exists, refreshing");
            self.commands
                .pull_all(target_dir, cancel)
                .await
                .map_err(|e| self.wrap(e, |detail| InvokerError::UpdateFailed { detail }))?;
            JobOutcome::Refreshed
        } else {
            debug!(path = %target_dir.display(), "cloning repository");
            let guard = PartialCloneGuard::new(target_dir);
            self.commands
                .clone_without_smudge(locator.expose(), target_dir, cancel)
                .await
                .map_err(|e| self.wrap(e, |detail| InvokerError::CloneFailed { detail }))?;
            guard.disarm();
            JobOutcome::Cloned
        };

        self.commands
            .lfs_pull(target_dir, cancel)
            .await
            .map_err(|e| self.wrap(e, |detail| InvokerError::LfsPullFailed { detail }))?;

        Ok(outcome)
    }

    /// Point `origin` of the clone in `repo_dir` at `target` and push everything.
    pub async fn retarget(
        &self,
        repo_dir: &Path,
        target: &AuthenticatedLocator,
        cancel: &CancellationToken,
    ) -> Result<JobOutcome, InvokerError> {
        if tokio::fs::metadata(repo_dir).await.is_err() {
            return Err(InvokerError::MissingRepository {
                path: repo_dir.to_path_buf(),
            });
        }

        self.commands
            .remote_remove(repo_dir, ORIGIN_REMOTE, cancel)
            .await
            .map_err(|e| {
                self.wrap(e, |detail| InvokerError::RemoteRemoveFailed {
                    remote: ORIGIN_REMOTE.to_string(),
                    detail,
                })
            })?;

        self.commands
            .remote_add(repo_dir, ORIGIN_REMOTE, target.expose(), cancel)
            .await
            .map_err(|e| {
                self.wrap(e, |detail| InvokerError::RemoteAddFailed {
                    remote: ORIGIN_REMOTE.to_string(),
                    detail,
                })
            })?;
        debug!(path = %repo_dir.display(), remote = %target, "remote retargeted");

        self.commands
            .lfs_push_all(repo_dir, ORIGIN_REMOTE, cancel)
            .await
            .map_err(|e| self.wrap(e, |detail| InvokerError::LfsPushFailed { detail }))?;

        self.commands
            .push_all(repo_dir, ORIGIN_REMOTE, cancel)
            .await
            .map_err(|e| self.wrap(e, |detail| InvokerError::PushFailed { detail }))?;

        Ok(JobOutcome::Retargeted)
    }
}
