//! Mock services for testing
//!
//! [`RecordingVcs`] implements `VcsCommands` without running any process. It
//! records every call, creates the target directory on clone, and can be told
//! to fail specific operations for specific repositories.

use async_trait::async_trait;
use migrate_lfs::infrastructure::scm::{VcsCommands, VcsError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// One recorded invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsCall {
    CheckAvailability,
    Clone { locator: String, target_dir: PathBuf },
    PullAll { repo_dir: PathBuf },
    LfsPull { repo_dir: PathBuf },
    RemoteRemove { repo_dir: PathBuf, remote: String },
    RemoteAdd { repo_dir: PathBuf, remote: String, url: String },
    LfsPushAll { repo_dir: PathBuf, remote: String },
    PushAll { repo_dir: PathBuf, remote: String },
}

impl VcsCall {
    /// Name of the repository directory the call touched
    pub fn repository(&self) -> Option<String> {
        let dir = match self {
            VcsCall::CheckAvailability => return None,
            VcsCall::Clone { target_dir, .. } => target_dir,
            VcsCall::PullAll { repo_dir }
            | VcsCall::LfsPull { repo_dir }
            | VcsCall::RemoteRemove { repo_dir, .. }
            | VcsCall::RemoteAdd { repo_dir, .. }
            | VcsCall::LfsPushAll { repo_dir, .. }
            | VcsCall::PushAll { repo_dir, .. } => repo_dir,
        };
        dir.file_name().map(|n| n.to_string_lossy().into_owned())
    }

    pub fn operation(&self) -> &'static str {
        match self {
            VcsCall::CheckAvailability => "version",
            VcsCall::Clone { .. } => "clone",
            VcsCall::PullAll { .. } => "pull",
            VcsCall::LfsPull { .. } => "lfs-pull",
            VcsCall::RemoteRemove { .. } => "remote-remove",
            VcsCall::RemoteAdd { .. } => "remote-add",
            VcsCall::LfsPushAll { .. } => "lfs-push",
            VcsCall::PushAll { .. } => "push",
        }
    }
}

#[derive(Default)]
struct RecordingState {
    calls: Mutex<Vec<VcsCall>>,
    failures: Mutex<HashMap<(String, String), String>>,
    unavailable: Mutex<bool>,
    delay: Mutex<Duration>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

/// Recording `VcsCommands` double; clones share state
#[derive(Clone, Default)]
pub struct RecordingVcs {
    state: Arc<RecordingState>,
}

impl RecordingVcs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `operation` fail for `repository` with `output`
    ///
    /// For `clone`, the placeholder `{locator}` in `output` is replaced with the
    /// locator that was passed in, the way git echoes the remote URL.
    pub fn fail_on(self, operation: &str, repository: &str, output: &str) -> Self {
        self.state
            .failures
            .lock()
            .unwrap()
            .insert((operation.to_string(), repository.to_string()), output.to_string());
        self
    }

    /// Make the availability check fail
    pub fn unavailable(self) -> Self {
        *self.state.unavailable.lock().unwrap() = true;
        self
    }

    /// Hold each clone and push for `delay`
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.state.delay.lock().unwrap() = delay;
        self
    }

    pub fn calls(&self) -> Vec<VcsCall> {
        self.state.calls.lock().unwrap().clone()
    }

    /// Recorded calls for one repository
    pub fn calls_for(&self, repository: &str) -> Vec<VcsCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.repository().as_deref() == Some(repository))
            .collect()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    /// Highest number of clones or pushes in flight at once
    pub fn peak_concurrency(&self) -> usize {
        self.state.peak.load(Ordering::SeqCst)
    }

    fn record(&self, call: VcsCall) -> Result<String, VcsError> {
        let operation = call.operation();
        let repository = call.repository().unwrap_or_default();
        let locator = match &call {
            VcsCall::Clone { locator, .. } => Some(locator.clone()),
            _ => None,
        };
        self.state.calls.lock().unwrap().push(call);

        let failure = self
            .state
            .failures
            .lock()
            .unwrap()
            .get(&(operation.to_string(), repository))
            .cloned();
        match failure {
            Some(output) => {
                let output = match locator {
                    Some(locator) => output.replace("{locator}", &locator),
                    None => output,
                };
                Err(VcsError::command_failed(format!("git {}", operation), 128, output))
            }
            None => Ok(String::new()),
        }
    }

    async fn hold(&self, cancel: &CancellationToken, command: &str) -> Result<(), VcsError> {
        let delay = *self.state.delay.lock().unwrap();
        let now = self.state.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.peak.fetch_max(now, Ordering::SeqCst);

        let result = if delay.is_zero() {
            Ok(())
        } else {
            tokio::select! {
                _ = cancel.cancelled() => Err(VcsError::cancelled(command)),
                _ = tokio::time::sleep(delay) => Ok(()),
            }
        };

        self.state.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[async_trait]
impl VcsCommands for RecordingVcs {
    async fn check_availability(&self) -> Result<String, VcsError> {
        self.state.calls.lock().unwrap().push(VcsCall::CheckAvailability);
        if *self.state.unavailable.lock().unwrap() {
            return Err(VcsError::ExecutableNotFound {
                executable: "git".to_string(),
                message: "No such file or directory".to_string(),
            });
        }
        Ok("git version 2.43.0".to_string())
    }

    async fn clone_without_smudge(
        &self,
        locator: &str,
        target_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<String, VcsError> {
        self.hold(cancel, "git clone").await?;
        let output = self.record(VcsCall::Clone {
            locator: locator.to_string(),
            target_dir: target_dir.to_path_buf(),
        })?;
        tokio::fs::create_dir_all(target_dir).await?;
        Ok(output)
    }

    async fn pull_all(
        &self,
        repo_dir: &Path,
        _cancel: &CancellationToken,
    ) -> Result<String, VcsError> {
        self.record(VcsCall::PullAll {
            repo_dir: repo_dir.to_path_buf(),
        })
    }

    async fn lfs_pull(
        &self,
        repo_dir: &Path,
        _cancel: &CancellationToken,
    ) -> Result<String, VcsError> {
        self.record(VcsCall::LfsPull {
            repo_dir: repo_dir.to_path_buf(),
        })
    }

    async fn remote_remove(
        &self,
        repo_dir: &Path,
        remote: &str,
        _cancel: &CancellationToken,
    ) -> Result<String, VcsError> {
        self.record(VcsCall::RemoteRemove {
            repo_dir: repo_dir.to_path_buf(),
            remote: remote.to_string(),
        })
    }

    async fn remote_add(
        &self,
        repo_dir: &Path,
        remote: &str,
        url: &str,
        _cancel: &CancellationToken,
    ) -> Result<String, VcsError> {
        self.record(VcsCall::RemoteAdd {
            repo_dir: repo_dir.to_path_buf(),
            remote: remote.to_string(),
            url: url.to_string(),
        })
    }

    async fn lfs_push_all(
        &self,
        repo_dir: &Path,
        remote: &str,
        cancel: &CancellationToken,
    ) -> Result<String, VcsError> {
        self.hold(cancel, "git lfs push").await?;
        self.record(VcsCall::LfsPushAll {
            repo_dir: repo_dir.to_path_buf(),
            remote: remote.to_string(),
        })
    }

    async fn push_all(
        &self,
        repo_dir: &Path,
        remote: &str,
        _cancel: &CancellationToken,
    ) -> Result<String, VcsError> {
        self.record(VcsCall::PushAll {
            repo_dir: repo_dir.to_path_buf(),
            remote: remote.to_string(),
        })
    }
}
