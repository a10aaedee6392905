pub mod migration_settings;
pub mod repository_job;

pub use migration_settings::{GitSettings, ProxySettings, PullSettings, SyncSettings};
pub use repository_job::{JobOutcome, RepositoryJob};
