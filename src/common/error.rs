use std::path::PathBuf;
use thiserror::Error;

/// Run-fatal errors.
///
/// Only configuration, input and setup failures are represented here. Failures of a
/// single repository job are recorded by the worker pool and never become a
/// `MigrateError`, with the exception of [`MigrateError::JobsFailed`] and
/// [`MigrateError::Cancelled`], which the CLI raises after the summary has been printed.
#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("File system operation failed: {message}")]
    FileSystemError {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Invalid input file: {message}")]
    InputFormatError {
        message: String,
        path: Option<PathBuf>,
        line: Option<u64>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {field} - {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to process {failed} repositories")]
    JobsFailed { failed: usize },

    #[error("Operation cancelled, {unfinished} repositories did not complete")]
    Cancelled { unfinished: usize },

    #[error("Internal error: {message}")]
    InternalError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl MigrateError {
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_error_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ConfigError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn filesystem_error_with_source(
        message: impl Into<String>,
        path: Option<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystemError {
            message: message.into(),
            path,
            source: Some(source),
        }
    }

    pub fn input_format_error(
        message: impl Into<String>,
        path: Option<PathBuf>,
        line: Option<u64>,
    ) -> Self {
        Self::InputFormatError {
            message: message.into(),
            path,
            line,
            source: None,
        }
    }

    pub fn input_format_error_with_source(
        message: impl Into<String>,
        path: Option<PathBuf>,
        line: Option<u64>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::InputFormatError {
            message: message.into(),
            path,
            line,
            source: Some(Box::new(source)),
        }
    }

    pub fn validation_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn jobs_failed(failed: usize) -> Self {
        Self::JobsFailed { failed }
    }

    pub fn cancelled(unfinished: usize) -> Self {
        Self::Cancelled { unfinished }
    }

    pub fn internal_error_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::InternalError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether the error belongs to the configuration class (bad or missing settings).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ConfigError { .. } | Self::ValidationError { .. }
        )
    }
}

impl From<std::io::Error> for MigrateError {
    fn from(error: std::io::Error) -> Self {
        Self::filesystem_error_with_source("File system operation failed", None, error)
    }
}

impl From<validator::ValidationErrors> for MigrateError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors.field_errors();
        let mut names: Vec<&str> = fields.keys().map(|k| k.as_ref()).collect();
        names.sort_unstable();

        let field = names.join(", ");
        let message = names
            .iter()
            .filter_map(|name| fields.get(*name))
            .flat_map(|errs| errs.iter())
            .map(|err| {
                err.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string())
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::validation_error(field, message)
    }
}
