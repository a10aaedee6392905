pub mod pull_repositories;
pub mod sync_repositories;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::application::services::{
    events::{PoolEvent, ProgressObserver},
    job_queue::{EnqueueReport, JobQueue},
    outcome::OutcomeSnapshot,
};
use crate::common::error::MigrateError;
use crate::common::result::MigrateResult;
use crate::infrastructure::filesystem::record_store::RecordStore;

pub use pull_repositories::{PullProcessor, PullRepositoriesUseCase};
pub use sync_repositories::{SyncProcessor, SyncRepositoriesUseCase};

/// フェーズ実行の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// 成功・失敗件数と所要時間
    pub outcome: OutcomeSnapshot,
    /// キュー投入の結果（重複の読み飛ばしを含む）
    pub enqueue: EnqueueReport,
    /// 作業ディレクトリ
    pub work_dir: PathBuf,
}

impl MigrationReport {
    pub fn has_failures(&self) -> bool {
        self.outcome.has_failures()
    }
}

/// 入力ファイルを読み込み、重複を除いたクローズ済みキューを作る
async fn load_job_queue(
    input_file: &Path,
    observer: &dyn ProgressObserver,
) -> MigrateResult<(Arc<JobQueue>, EnqueueReport)> {
    let jobs = RecordStore::new()
        .load_jobs(input_file)
        .await
        .map_err(|e| e.into_migrate_error(Some(input_file.to_path_buf())))?;

    let (queue, report) = JobQueue::populate(jobs)
        .map_err(|e| MigrateError::internal_error_with_source("Failed to build job queue", e))?;

    for name in &report.duplicates {
        debug!(repository = %name, "skipping duplicate repository");
        observer.on_event(&PoolEvent::DuplicateSkipped { name: name.clone() });
    }

    Ok((Arc::new(queue), report))
}
