use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// 成功・失敗件数のカウンタ
///
/// 複数のワーカーから同時に更新される。値の確定はプール完了後に
/// [`OutcomeCounters::snapshot`] で取得する。
#[derive(Debug, Default)]
pub struct OutcomeCounters {
    processed: AtomicUsize,
    failed: AtomicUsize,
}

impl OutcomeCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self) {
        self.processed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self, elapsed: Duration) -> OutcomeSnapshot {
        OutcomeSnapshot {
            processed: self.processed(),
            failed: self.failed(),
            elapsed,
        }
    }
}

/// 実行結果の集計
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutcomeSnapshot {
    /// 成功したジョブ数
    pub processed: usize,
    /// 失敗したジョブ数
    pub failed: usize,
    /// 所要時間
    pub elapsed: Duration,
}

impl OutcomeSnapshot {
    pub fn total(&self) -> usize {
        self.processed + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
