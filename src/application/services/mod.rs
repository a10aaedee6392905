pub mod events;
pub mod job_queue;
pub mod outcome;
pub mod worker_pool;

pub use events::{NoopObserver, PoolEvent, ProgressObserver, RecordingObserver};
pub use job_queue::{EnqueueReport, JobQueue, JobQueueError, JobQueueWriter, ProcessedSet};
pub use outcome::{OutcomeCounters, OutcomeSnapshot};
pub use worker_pool::{JobError, JobProcessor, WorkerPool};
