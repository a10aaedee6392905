//! 入力ファイル読み込みの統合テスト

mod common;

use common::mock_services::RecordingVcs;
use common::test_fixtures::MigrationFixture;
use migrate_lfs::application::use_cases::PullRepositoriesUseCase;
use migrate_lfs::domain::entities::migration_settings::PullSettings;
use migrate_lfs::domain::value_objects::Credential;
use migrate_lfs::infrastructure::filesystem::{RecordStore, RecordStoreError};
use migrate_lfs::MigrateError;

#[tokio::test]
async fn test_load_jobs_from_file() {
    let fixture = MigrationFixture::new();
    let path = fixture.write_raw(
        "repos.csv",
        "Repository,GitAttributesPaths,CloneURL\r\n\
         alpha,.gitattributes,https://github.com/old/alpha.git\r\n\
         \"beta\",\"lfs/.gitattributes,other/.gitattributes\",https://github.com/old/beta.git\r\n",
    );

    let jobs = RecordStore::new().load_jobs(&path).await.unwrap();

    let names: Vec<&str> = jobs.iter().map(|job| job.name()).collect();
    assert_eq!(names, vec!["alpha", "beta"]);
    assert_eq!(jobs[1].clone_locator(), "https://github.com/old/beta.git");
}

#[tokio::test]
async fn test_load_jobs_missing_file() {
    let fixture = MigrationFixture::new();
    let err = RecordStore::new()
        .load_jobs(&fixture.path().join("absent.csv"))
        .await
        .unwrap_err();
    assert!(matches!(err, RecordStoreError::InputFileNotFound(_)));
}

#[tokio::test]
async fn test_malformed_row_aborts_whole_run() {
    let fixture = MigrationFixture::new();
    let input = fixture.write_raw(
        "repos.csv",
        "Repository,GitAttributesPaths,CloneURL\n\
         alpha,.gitattributes,https://github.com/old/alpha.git\n\
         beta,.gitattributes,https://github.com/old/beta.git,extra\n",
    );
    let vcs = RecordingVcs::new();

    let settings = PullSettings::new(input.clone(), fixture.work_dir(), Credential::new("tok"));
    let err = PullRepositoriesUseCase::new(settings, vcs.clone())
        .execute()
        .await
        .unwrap_err();

    match err {
        MigrateError::InputFormatError { line, path, .. } => {
            assert_eq!(line, Some(3));
            assert_eq!(path, Some(input));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // Nothing runs, not even for the valid row.
    assert!(vcs.calls().is_empty());
    assert!(!fixture.work_dir().exists());
}
