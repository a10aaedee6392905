use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use super::events::{PoolEvent, ProgressObserver};
use super::job_queue::JobQueue;
use super::outcome::{OutcomeCounters, OutcomeSnapshot};
use crate::domain::entities::repository_job::{JobOutcome, RepositoryJob};
use crate::domain::value_objects::credential::Credential;
use crate::infrastructure::scm::lfs_invoker::InvokerError;

/// 1ジョブの失敗理由
///
/// 表示文字列は認証情報をマスク済みであること。
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Invalid clone URL format for {name}: {detail}")]
    InvalidLocator { name: String, detail: String },

    #[error("Invalid repository name '{name}'")]
    InvalidName { name: String },

    #[error(transparent)]
    Invoker(#[from] InvokerError),

    #[error("Job timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Job cancelled")]
    Cancelled,

    #[error("Job panicked: {0}")]
    Panicked(String),
}

/// 1ジョブ分の処理
#[async_trait]
pub trait JobProcessor: Send + Sync {
    async fn process(
        &self,
        job: &RepositoryJob,
        cancel: &CancellationToken,
    ) -> Result<JobOutcome, JobError>;
}

/// 固定数のワーカーでジョブキューを処理するプール
///
/// 各ジョブの失敗（エラー、タイムアウト、パニック）はそのジョブだけに閉じ、
/// 失敗件数として数えられる。[`WorkerPool::run`] は全ワーカーの終了を待ってから返る。
/// 失敗理由の文字列は、ログやイベントに出す前に認証情報をマスクする。
#[derive(Debug, Clone)]
pub struct WorkerPool {
    workers: usize,
    job_timeout: Option<Duration>,
    credential: Credential,
}

impl WorkerPool {
    /// `workers` が0の場合は1として扱う
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            job_timeout: None,
            credential: Credential::default(),
        }
    }

    pub fn with_job_timeout(mut self, job_timeout: Option<Duration>) -> Self {
        self.job_timeout = job_timeout;
        self
    }

    /// 失敗理由からマスクする認証情報
    pub fn with_redaction(mut self, credential: Credential) -> Self {
        self.credential = credential;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// キューが空になるまで処理し、集計を返す
    ///
    /// `cancel` 発火後に取り出されたジョブは実行せず失敗として数える。
    pub async fn run<P>(
        &self,
        queue: Arc<JobQueue>,
        processor: Arc<P>,
        observer: Arc<dyn ProgressObserver>,
        cancel: CancellationToken,
    ) -> OutcomeSnapshot
    where
        P: JobProcessor + 'static,
    {
        let start = Instant::now();
        let counters = Arc::new(OutcomeCounters::new());
        let mut tasks = JoinSet::new();

        for worker in 0..self.workers {
            tasks.spawn(worker_loop(
                worker,
                Arc::clone(&queue),
                Arc::clone(&processor),
                Arc::clone(&observer),
                Arc::clone(&counters),
                cancel.clone(),
                self.job_timeout,
                self.credential.clone(),
            ));
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "worker task terminated abnormally");
            }
        }

        let snapshot = counters.snapshot(start.elapsed());
        observer.on_event(&PoolEvent::PoolFinished {
            processed: snapshot.processed,
            failed: snapshot.failed,
        });
        snapshot
    }
}

async fn worker_loop<P>(
    worker: usize,
    queue: Arc<JobQueue>,
    processor: Arc<P>,
    observer: Arc<dyn ProgressObserver>,
    counters: Arc<OutcomeCounters>,
    cancel: CancellationToken,
    job_timeout: Option<Duration>,
    credential: Credential,
) where
    P: JobProcessor + 'static,
{
    debug!(worker, "worker started");
    while let Some(job) = queue.next().await {
        let name = job.name().to_string();
        observer.on_event(&PoolEvent::JobStarted {
            name: name.clone(),
            worker,
        });

        match run_job(processor.as_ref(), &job, job_timeout, &cancel).await {
            Ok(outcome) => {
                counters.record_success();
                debug!(worker, repository = %name, %outcome, "job succeeded");
                observer.on_event(&PoolEvent::JobSucceeded {
                    name,
                    worker,
                    outcome,
                });
            }
            Err(e) => {
                counters.record_failure();
                let message = credential.redact(&e.to_string());
                warn!(worker, repository = %name, error = %message, "job failed");
                observer.on_event(&PoolEvent::JobFailed {
                    name,
                    worker,
                    error: message,
                });
            }
        }
    }
    debug!(worker, "worker finished");
}

async fn run_job<P>(
    processor: &P,
    job: &RepositoryJob,
    job_timeout: Option<Duration>,
    cancel: &CancellationToken,
) -> Result<JobOutcome, JobError>
where
    P: JobProcessor + ?Sized,
{
    if cancel.is_cancelled() {
        return Err(JobError::Cancelled);
    }

    let guarded = async {
        match AssertUnwindSafe(processor.process(job, cancel))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(payload) => Err(JobError::Panicked(panic_message(payload.as_ref()))),
        }
    };

    let limited = async {
        match job_timeout {
            Some(limit) => match tokio::time::timeout(limit, guarded).await {
                Ok(result) => result,
                Err(_) => Err(JobError::Timeout { timeout: limit }),
            },
            None => guarded.await,
        }
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(JobError::Cancelled),
        result = limited => result,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
