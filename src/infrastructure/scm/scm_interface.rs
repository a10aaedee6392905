use async_trait::async_trait;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Low-level version-control commands used by the migration phases.
///
/// Implementations run the external tool and report its combined output on
/// success. Nothing here redacts credentials; callers own that.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VcsCommands: Send + Sync {
    /// Verify the tool can be started.
    async fn check_availability(&self) -> Result<String, VcsError>;

    /// Clone `locator` into `target_dir` without downloading large-file content.
    async fn clone_without_smudge(
        &self,
        locator: &str,
        target_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<String, VcsError>;

    /// Fetch and merge all remote changes into an existing clone.
    async fn pull_all(&self, repo_dir: &Path, cancel: &CancellationToken)
        -> Result<String, VcsError>;

    /// Download large-file content for the checked-out revision.
    async fn lfs_pull(&self, repo_dir: &Path, cancel: &CancellationToken)
        -> Result<String, VcsError>;

    async fn remote_remove(
        &self,
        repo_dir: &Path,
        remote: &str,
        cancel: &CancellationToken,
    ) -> Result<String, VcsError>;

    async fn remote_add(
        &self,
        repo_dir: &Path,
        remote: &str,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<String, VcsError>;

    /// Upload every large-file object reachable from any ref.
    async fn lfs_push_all(
        &self,
        repo_dir: &Path,
        remote: &str,
        cancel: &CancellationToken,
    ) -> Result<String, VcsError>;

    /// Push every branch to `remote`.
    async fn push_all(
        &self,
        repo_dir: &Path,
        remote: &str,
        cancel: &CancellationToken,
    ) -> Result<String, VcsError>;
}

/// Errors that can occur while running version-control commands
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    #[error("{command} failed with exit code {exit_code}: {output}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        output: String,
    },

    #[error("{executable} could not be started: {message}")]
    ExecutableNotFound { executable: String, message: String },

    #[error("{command} was cancelled")]
    Cancelled { command: String },

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl VcsError {
    pub fn command_failed(
        command: impl Into<String>,
        exit_code: i32,
        output: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            command: command.into(),
            exit_code,
            output: output.into(),
        }
    }

    pub fn cancelled(command: impl Into<String>) -> Self {
        Self::Cancelled {
            command: command.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Whether running the same command again may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::CommandFailed { .. })
    }
}
