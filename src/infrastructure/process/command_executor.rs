use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use thiserror::Error;
use tokio::process::Command as TokioCommand;
use tokio_util::sync::CancellationToken;

/// Command executor errors
#[derive(Debug, Error)]
pub enum CommandExecutorError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Process spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Process termination failed: {0}")]
    TerminationFailed(String),

    #[error("Command cancelled")]
    Cancelled,
}

/// Configuration for command execution
#[derive(Debug, Clone, Default)]
pub struct ExecutionConfig {
    /// Working directory for command execution
    pub working_directory: Option<PathBuf>,

    /// Environment variables added on top of the inherited environment
    pub environment_variables: HashMap<String, String>,
}

impl ExecutionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_working_directory<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.working_directory = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn with_environment_variable(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.environment_variables.insert(key.into(), value.into());
        self
    }

    pub fn with_environment_variables<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.environment_variables.extend(vars);
        self
    }
}

/// Result of command execution
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Exit code of the process (-1 when killed by a signal)
    pub exit_code: i32,

    pub stdout: String,

    pub stderr: String,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,

    /// Whether the command was successful (exit code 0)
    pub success: bool,
}

impl ExecutionResult {
    pub fn new(exit_code: i32, stdout: String, stderr: String, execution_time_ms: u64) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            execution_time_ms,
            success: exit_code == 0,
        }
    }

    /// Stdout and stderr joined, trimmed.
    pub fn combined_output(&self) -> String {
        let stdout = self.stdout.trim();
        let stderr = self.stderr.trim();
        match (stdout.is_empty(), stderr.is_empty()) {
            (true, _) => stderr.to_string(),
            (false, true) => stdout.to_string(),
            (false, false) => format!("{}\n{}", stdout, stderr),
        }
    }
}

/// Command executor for running external processes.
///
/// Programs are started directly with an argument vector, never through a shell.
/// The child is killed when the execution future is dropped or `cancel` fires.
pub struct CommandExecutor;

impl CommandExecutor {
    pub async fn execute<S: AsRef<OsStr>>(
        program: &str,
        args: &[S],
        config: &ExecutionConfig,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult, CommandExecutorError> {
        if program.trim().is_empty() {
            return Err(CommandExecutorError::InvalidCommand(
                "Command is empty".to_string(),
            ));
        }
        if cancel.is_cancelled() {
            return Err(CommandExecutorError::Cancelled);
        }

        let start_time = Instant::now();

        let mut cmd = TokioCommand::new(program);
        cmd.args(args);

        if let Some(working_dir) = &config.working_directory {
            cmd.current_dir(working_dir);
        }
        for (key, value) in &config.environment_variables {
            cmd.env(key, value);
        }

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Arguments may carry credentials, so only the program name is reported.
        let child = cmd.spawn().map_err(|e| {
            CommandExecutorError::SpawnFailed(format!("Failed to spawn '{}': {}", program, e))
        })?;

        let output = tokio::select! {
            _ = cancel.cancelled() => return Err(CommandExecutorError::Cancelled),
            output = child.wait_with_output() => output.map_err(|e| {
                CommandExecutorError::TerminationFailed(format!("Failed to wait for process: {}", e))
            })?,
        };

        Ok(ExecutionResult::new(
            output.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
            start_time.elapsed().as_millis() as u64,
        ))
    }
}
