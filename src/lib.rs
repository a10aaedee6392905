//! # migrate-lfs - Git LFS migration tool
//!
//! `migrate-lfs` moves repositories that use Git LFS from one organization to
//! another. It runs in two phases:
//!
//! - **pull**: clone every repository listed in a CSV file into a working
//!   directory without LFS smudging, then fetch the LFS objects explicitly.
//!   Re-running the phase refreshes existing clones instead of cloning again.
//! - **sync**: point the `origin` remote of each pulled clone at the
//!   destination organization and push the LFS objects and all branches.
//!
//! Both phases run the repositories through a fixed-size worker pool. Each
//! repository name is processed at most once per run, a failing repository
//! never stops the others, and the run fails only after the summary has been
//! printed.
//!
//! ## Input
//!
//! ```text
//! Repository,GitAttributesPaths,CloneURL
//! frontend,.gitattributes,https://github.com/old-org/frontend.git
//! assets,.gitattributes,https://github.com/old-org/assets.git
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! migrate-lfs pull --file lfs-repos.csv --token "$TOKEN" --work-dir ./work --workers 4
//! migrate-lfs sync --input lfs-repos.csv --work-dir ./work --new-org new-org --token "$TOKEN"
//! ```
//!
//! ## Architecture
//!
//! - [`domain`]: settings, jobs and value objects such as the credential
//! - [`application`]: the job queue, worker pool and the two phase use cases
//! - [`infrastructure`]: CSV input, process execution and the git CLI
//! - [`presentation`]: CLI interface and console output
//! - [`common`]: shared error handling
//!
//! The access token is held in [`domain::value_objects::credential::Credential`],
//! which never prints its value. Every error message that may contain an
//! authenticated URL is redacted before it is reported.
//!
//! ## Using the Library
//!
//! ```rust,no_run
//! use migrate_lfs::application::use_cases::PullRepositoriesUseCase;
//! use migrate_lfs::domain::entities::migration_settings::PullSettings;
//! use migrate_lfs::domain::value_objects::credential::Credential;
//! use migrate_lfs::infrastructure::scm::git_cli::GitCli;
//!
//! # async fn example() -> migrate_lfs::Result<()> {
//! let settings = PullSettings::new("lfs-repos.csv", "work", Credential::new("token"))
//!     .with_workers(4);
//!
//! let report = PullRepositoriesUseCase::new(settings, GitCli::default())
//!     .execute()
//!     .await?;
//!
//! println!(
//!     "processed {}, failed {}",
//!     report.outcome.processed, report.outcome.failed
//! );
//! # Ok(())
//! # }
//! ```

#![deny(rustdoc::broken_intra_doc_links)]

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use crate::common::error::MigrateError;
pub use crate::common::result::MigrateResult as Result;
