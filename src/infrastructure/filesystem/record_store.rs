use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs as async_fs;

use crate::common::error::MigrateError;
use crate::domain::entities::repository_job::RepositoryJob;

/// Columns every record must have: name, attribute paths (ignored), clone locator.
pub const RECORD_COLUMNS: usize = 3;

/// Record store related errors
#[derive(Debug, Error)]
pub enum RecordStoreError {
    #[error("Input file not found at path: {}", .0.display())]
    InputFileNotFound(PathBuf),

    #[error("Input file read failed: {0}")]
    ReadFailed(#[from] std::io::Error),

    #[error("Input file has no header row")]
    MissingHeader,

    #[error("Invalid record format at line {line}: expected 3 columns, got {found}")]
    ColumnCount { line: u64, found: usize },

    #[error("Malformed record at line {line}: {source}")]
    Malformed {
        line: u64,
        #[source]
        source: csv::Error,
    },
}

impl RecordStoreError {
    /// Line of the offending record, when known.
    pub fn line(&self) -> Option<u64> {
        match self {
            Self::ColumnCount { line, .. } | Self::Malformed { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Convert into a run-fatal error, attaching the input file path.
    pub fn into_migrate_error(self, path: Option<PathBuf>) -> MigrateError {
        let line = self.line();
        let message = self.to_string();
        match self {
            RecordStoreError::InputFileNotFound(missing) => {
                MigrateError::input_format_error(message, Some(missing), None)
            }
            RecordStoreError::ReadFailed(source) => {
                MigrateError::filesystem_error_with_source(message, path, source)
            }
            RecordStoreError::Malformed { source, .. } => {
                MigrateError::input_format_error_with_source(message, path, line, source)
            }
            RecordStoreError::MissingHeader | RecordStoreError::ColumnCount { .. } => {
                MigrateError::input_format_error(message, path, line)
            }
        }
    }
}

/// One input row, matched to the columns by position.
#[derive(Debug, Deserialize)]
struct InputRecord {
    repository: String,
    #[allow(dead_code)]
    git_attributes_paths: String,
    clone_url: String,
}

/// Loads repository records from the CSV input file.
///
/// The first row is a header and is skipped. Each following row must hold exactly
/// [`RECORD_COLUMNS`] columns; the first is the repository name and the third its
/// clone locator. Rows are returned in file order, duplicates included.
pub struct RecordStore;

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore {
    pub fn new() -> Self {
        Self
    }

    pub async fn load_jobs(&self, path: &Path) -> Result<Vec<RepositoryJob>, RecordStoreError> {
        let bytes = match async_fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RecordStoreError::InputFileNotFound(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };
        self.parse_jobs(bytes.as_slice())
    }

    pub fn parse_jobs<R: std::io::Read>(
        &self,
        reader: R,
    ) -> Result<Vec<RepositoryJob>, RecordStoreError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let header = csv_reader
            .headers()
            .map_err(|source| RecordStoreError::Malformed { line: 1, source })?;
        if header.is_empty() {
            return Err(RecordStoreError::MissingHeader);
        }

        let mut jobs = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(|source| {
                let line = source.position().map(|p| p.line()).unwrap_or_default();
                RecordStoreError::Malformed { line, source }
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            if record.len() != RECORD_COLUMNS {
                return Err(RecordStoreError::ColumnCount {
                    line,
                    found: record.len(),
                });
            }

            let row: InputRecord = record
                .deserialize(None)
                .map_err(|source| RecordStoreError::Malformed { line, source })?;
            jobs.push(RepositoryJob::new(row.repository, row.clone_url));
        }

        Ok(jobs)
    }
}

impl From<RecordStoreError> for MigrateError {
    fn from(error: RecordStoreError) -> Self {
        error.into_migrate_error(None)
    }
}
