pub mod pull;
pub mod sync;

pub use pull::*;
pub use sync::*;

use tokio_util::sync::CancellationToken;

use crate::application::use_cases::MigrationReport;
use crate::common::error::MigrateError;

/// Error to exit with once the summary of a phase has been printed
fn phase_status(report: &MigrationReport, cancel: &CancellationToken) -> Result<(), MigrateError> {
    if !report.has_failures() {
        return Ok(());
    }
    if cancel.is_cancelled() {
        return Err(MigrateError::cancelled(report.outcome.failed));
    }
    Err(MigrateError::jobs_failed(report.outcome.failed))
}
