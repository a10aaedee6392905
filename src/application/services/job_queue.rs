use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::{mpsc, Mutex as AsyncMutex};

use crate::domain::entities::repository_job::RepositoryJob;

/// JobQueue関連のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobQueueError {
    #[error("Job queue capacity {capacity} exceeded while enqueuing '{name}'")]
    CapacityExceeded { capacity: usize, name: String },

    #[error("Job queue receiver dropped while enqueuing '{name}'")]
    ReceiverDropped { name: String },
}

/// 登録済みジョブ名の集合
///
/// 確認と登録を1回のロックで行うため、同じ名前を2回受け付けることはない。
#[derive(Debug, Default)]
pub struct ProcessedSet {
    names: Mutex<HashSet<String>>,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 未登録なら登録して `true`、登録済みなら `false`
    pub fn insert_if_absent(&self, name: &str) -> bool {
        let mut names = match self.names.lock() {
            Ok(names) => names,
            Err(poisoned) => poisoned.into_inner(),
        };
        if names.contains(name) {
            false
        } else {
            names.insert(name.to_string())
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        match self.names.lock() {
            Ok(names) => names.contains(name),
            Err(poisoned) => poisoned.into_inner().contains(name),
        }
    }

    pub fn len(&self) -> usize {
        match self.names.lock() {
            Ok(names) => names.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 投入結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnqueueReport {
    /// キューに入ったジョブ数
    pub enqueued: usize,
    /// 重複として読み飛ばしたジョブ名（出現順）
    pub duplicates: Vec<String>,
}

/// キューへの投入側
///
/// [`JobQueueWriter::enqueue_all`] が自身を消費するため、キューのクローズは
/// 1回だけ、かつ全ジョブの投入後にしか起こらない。
pub struct JobQueueWriter {
    sender: mpsc::Sender<RepositoryJob>,
    seen: Arc<ProcessedSet>,
    capacity: usize,
}

impl JobQueueWriter {
    pub fn processed_set(&self) -> Arc<ProcessedSet> {
        Arc::clone(&self.seen)
    }

    /// 候補を順に投入してキューを閉じる
    ///
    /// 同じ名前の2件目以降は投入せず、`duplicates` に記録する。
    pub fn enqueue_all<I>(self, candidates: I) -> Result<EnqueueReport, JobQueueError>
    where
        I: IntoIterator<Item = RepositoryJob>,
    {
        let mut report = EnqueueReport::default();
        for job in candidates {
            if !self.seen.insert_if_absent(job.name()) {
                report.duplicates.push(job.name().to_string());
                continue;
            }
            let name = job.name().to_string();
            self.sender.try_send(job).map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => JobQueueError::CapacityExceeded {
                    capacity: self.capacity,
                    name,
                },
                mpsc::error::TrySendError::Closed(_) => JobQueueError::ReceiverDropped { name },
            })?;
            report.enqueued += 1;
        }
        // Dropping the sender here closes the queue.
        Ok(report)
    }
}

/// ワーカーが共有する有界ジョブキュー
///
/// 投入側がクローズした後も残りのジョブは取り出せ、空になると `None` を返す。
pub struct JobQueue {
    receiver: AsyncMutex<mpsc::Receiver<RepositoryJob>>,
    capacity: usize,
}

impl JobQueue {
    /// 容量 `capacity`（最低1）のキューを作成
    pub fn bounded(capacity: usize) -> (JobQueueWriter, JobQueue) {
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);
        let writer = JobQueueWriter {
            sender,
            seen: Arc::new(ProcessedSet::new()),
            capacity,
        };
        let queue = JobQueue {
            receiver: AsyncMutex::new(receiver),
            capacity,
        };
        (writer, queue)
    }

    /// 全候補を収められる容量でキューを作り、投入してクローズする
    pub fn populate(
        candidates: Vec<RepositoryJob>,
    ) -> Result<(JobQueue, EnqueueReport), JobQueueError> {
        let (writer, queue) = Self::bounded(candidates.len());
        let report = writer.enqueue_all(candidates)?;
        Ok((queue, report))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 次のジョブを取り出す。クローズ済みで空なら `None`
    pub async fn next(&self) -> Option<RepositoryJob> {
        self.receiver.lock().await.recv().await
    }
}
