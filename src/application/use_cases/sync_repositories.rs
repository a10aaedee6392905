use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use validator::Validate;

use super::{load_job_queue, MigrationReport};
use crate::application::services::{
    events::{NoopObserver, ProgressObserver},
    worker_pool::{JobError, JobProcessor, WorkerPool},
};
use crate::common::error::MigrateError;
use crate::common::result::MigrateResult;
use crate::domain::entities::{
    migration_settings::SyncSettings,
    repository_job::{JobOutcome, RepositoryJob},
};
use crate::infrastructure::scm::{lfs_invoker::LfsInvoker, scm_interface::VcsCommands};

/// syncフェーズの1ジョブ処理
///
/// pull済みのクローンのoriginを移行先組織へ付け替え、LFSオブジェクトと全ブランチを
/// プッシュする。
pub struct SyncProcessor<C: VcsCommands> {
    invoker: Arc<LfsInvoker<C>>,
    settings: Arc<SyncSettings>,
}

impl<C: VcsCommands> SyncProcessor<C> {
    pub fn new(invoker: Arc<LfsInvoker<C>>, settings: Arc<SyncSettings>) -> Self {
        Self { invoker, settings }
    }
}

#[async_trait]
impl<C: VcsCommands + 'static> JobProcessor for SyncProcessor<C> {
    async fn process(
        &self,
        job: &RepositoryJob,
        cancel: &CancellationToken,
    ) -> Result<JobOutcome, JobError> {
        let repo_dir = job
            .target_dir(&self.settings.work_dir)
            .ok_or_else(|| JobError::InvalidName {
                name: job.name().to_string(),
            })?;

        let target = self.settings.target_remote(job.name());
        debug!(repository = %job.name(), remote = %target, "retargeting repository");
        Ok(self.invoker.retarget(&repo_dir, &target, cancel).await?)
    }
}

/// クローン済みリポジトリを移行先組織へプッシュするユースケース
pub struct SyncRepositoriesUseCase<C: VcsCommands + 'static> {
    settings: Arc<SyncSettings>,
    invoker: Arc<LfsInvoker<C>>,
    observer: Arc<dyn ProgressObserver>,
    cancel: CancellationToken,
}

impl<C: VcsCommands + 'static> SyncRepositoriesUseCase<C> {
    pub fn new(settings: SyncSettings, commands: C) -> Self {
        let invoker = Arc::new(LfsInvoker::new(commands, settings.credential.clone()));
        Self {
            settings: Arc::new(settings),
            invoker,
            observer: Arc::new(NoopObserver),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// syncフェーズを実行
    pub async fn execute(&self) -> MigrateResult<MigrationReport> {
        // 1. 設定の検証
        self.settings.validate()?;

        // 2. 入力ファイルの読み込みとキューの構築
        let (queue, enqueue) =
            load_job_queue(&self.settings.input_file, self.observer.as_ref()).await?;

        // 3. gitの利用可否チェック（処理対象がある場合のみ）
        if enqueue.enqueued > 0 {
            let version = self.invoker.preflight().await.map_err(|e| {
                MigrateError::config_error_with_source("git is required to sync repositories", e)
            })?;
            debug!(%version, "git available");
        }

        // 4. ワーカープールで処理（作業ディレクトリは作成しない）
        info!(
            repositories = enqueue.enqueued,
            duplicates = enqueue.duplicates.len(),
            workers = self.settings.workers,
            target_org = %self.settings.target_org,
            host = %self.settings.host,
            "starting sync phase"
        );
        let processor = Arc::new(SyncProcessor::new(
            Arc::clone(&self.invoker),
            Arc::clone(&self.settings),
        ));
        let outcome = WorkerPool::new(self.settings.workers)
            .with_job_timeout(self.settings.job_timeout)
            .with_redaction(self.settings.credential.clone())
            .run(
                queue,
                processor,
                Arc::clone(&self.observer),
                self.cancel.clone(),
            )
            .await;
        info!(
            processed = outcome.processed,
            failed = outcome.failed,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "sync phase finished"
        );

        Ok(MigrationReport {
            outcome,
            enqueue,
            work_dir: self.settings.work_dir.clone(),
        })
    }
}
