use async_trait::async_trait;
use std::path::PathBuf;
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
use crate::common::result::{MigrateResult, ResultExt};
use crate::domain::entities::{
    migration_settings::PullSettings,
    repository_job::{JobOutcome, RepositoryJob},
};
use crate::domain::value_objects::credential::Credential;
use crate::infrastructure::scm::{lfs_invoker::LfsInvoker, scm_interface::VcsCommands};

/// pullフェーズの1ジョブ処理
///
/// クローン元を検証し、認証情報を埋め込んだURLで作業ディレクトリへ取得する。
pub struct PullProcessor<C: VcsCommands> {
    invoker: Arc<LfsInvoker<C>>,
    credential: Credential,
    work_dir: PathBuf,
}

impl<C: VcsCommands> PullProcessor<C> {
    pub fn new(invoker: Arc<LfsInvoker<C>>, credential: Credential, work_dir: PathBuf) -> Self {
        Self {
            invoker,
            credential,
            work_dir,
        }
    }
}

#[async_trait]
impl<C: VcsCommands + 'static> JobProcessor for PullProcessor<C> {
    async fn process(
        &self,
        job: &RepositoryJob,
        cancel: &CancellationToken,
    ) -> Result<JobOutcome, JobError> {
        // 1. クローン元の形式チェック（外部コマンドを呼ぶ前に判定）
        let locator = job
            .parse_locator()
            .map_err(|e| JobError::InvalidLocator {
                name: job.name().to_string(),
                detail: self.credential.redact(&e.to_string()),
            })?;

        // 2. 作業ディレクトリ内の配置先を決定
        let target_dir = job
            .target_dir(&self.work_dir)
            .ok_or_else(|| JobError::InvalidName {
                name: job.name().to_string(),
            })?;

        // 3. クローンまたは更新してLFSオブジェクトを取得
        let authenticated = locator.authenticate(&self.credential);
        debug!(repository = %job.name(), locator = %authenticated, "materializing repository");
        Ok(self
            .invoker
            .materialize(&authenticated, &target_dir, cancel)
            .await?)
    }
}

/// リポジトリ一覧をクローンしてLFSオブジェクトを取得するユースケース
pub struct PullRepositoriesUseCase<C: VcsCommands + 'static> {
    settings: PullSettings,
    invoker: Arc<LfsInvoker<C>>,
    observer: Arc<dyn ProgressObserver>,
    cancel: CancellationToken,
}

impl<C: VcsCommands + 'static> PullRepositoriesUseCase<C> {
    pub fn new(settings: PullSettings, commands: C) -> Self {
        let invoker = Arc::new(LfsInvoker::new(commands, settings.credential.clone()));
        Self {
            settings,
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

    /// pullフェーズを実行
    ///
    /// 設定・入力の不備はジョブ開始前にエラーとして返る。個々のジョブの失敗は
    /// 集計に含まれるだけで、エラーにはならない。
    pub async fn execute(&self) -> MigrateResult<MigrationReport> {
        // 1. 設定の検証
        self.settings.validate()?;

        // 2. 入力ファイルの読み込みとキューの構築
        let (queue, enqueue) =
            load_job_queue(&self.settings.input_file, self.observer.as_ref()).await?;

        // 3. 作業ディレクトリの作成
        let work_dir = self.settings.work_dir.clone();
        tokio::fs::create_dir_all(&work_dir)
            .await
            .with_filesystem_error("Failed to create working directory", Some(work_dir.clone()))?;

        // 4. gitの利用可否チェック（処理対象がある場合のみ）
        if enqueue.enqueued > 0 {
            let version = self.invoker.preflight().await.map_err(|e| {
                MigrateError::config_error_with_source("git is required to pull repositories", e)
            })?;
            debug!(%version, "git available");
        }

        // 5. ワーカープールで処理
        info!(
            repositories = enqueue.enqueued,
            duplicates = enqueue.duplicates.len(),
            workers = self.settings.workers,
            host = %self.settings.host,
            "starting pull phase"
        );
        let processor = Arc::new(PullProcessor::new(
            Arc::clone(&self.invoker),
            self.settings.credential.clone(),
            work_dir.clone(),
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
            "pull phase finished"
        );

        Ok(MigrationReport {
            outcome,
            enqueue,
            work_dir,
        })
    }
}
