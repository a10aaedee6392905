use std::sync::Mutex;

use crate::domain::entities::repository_job::JobOutcome;

/// ワーカープールの進行イベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolEvent {
    /// 同名のジョブが既に登録済みのため読み飛ばした
    DuplicateSkipped { name: String },
    JobStarted { name: String, worker: usize },
    JobSucceeded {
        name: String,
        worker: usize,
        outcome: JobOutcome,
    },
    /// `error` は認証情報をマスク済み
    JobFailed {
        name: String,
        worker: usize,
        error: String,
    },
    PoolFinished { processed: usize, failed: usize },
}

/// 進行イベントの受け手
///
/// ワーカーから並行して呼ばれるため、実装は短時間で返すこと。
pub trait ProgressObserver: Send + Sync {
    fn on_event(&self, event: &PoolEvent);
}

/// 何もしないオブザーバー
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_event(&self, _event: &PoolEvent) {}
}

/// 受け取ったイベントを順に保持するオブザーバー
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<PoolEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PoolEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// 失敗したジョブ名とエラー文
    pub fn failures(&self) -> Vec<(String, String)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                PoolEvent::JobFailed { name, error, .. } => Some((name, error)),
                _ => None,
            })
            .collect()
    }

    /// 読み飛ばした重複ジョブ名
    pub fn duplicates(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                PoolEvent::DuplicateSkipped { name } => Some(name),
                _ => None,
            })
            .collect()
    }
}

impl ProgressObserver for RecordingObserver {
    fn on_event(&self, event: &PoolEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}
