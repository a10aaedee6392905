use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::value_objects::clone_locator::{CloneLocator, CloneLocatorError};

/// 1リポジトリ分の処理単位
///
/// `name` はジョブの同一性キーであり、作業ディレクトリ配下のディレクトリ名にもなる。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryJob {
    name: String,
    clone_locator: String,
}

impl RepositoryJob {
    pub fn new(name: impl Into<String>, clone_locator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            clone_locator: clone_locator.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 入力ファイルに書かれたままのクローン元
    pub fn clone_locator(&self) -> &str {
        &self.clone_locator
    }

    /// クローン元を検証して解析
    pub fn parse_locator(&self) -> Result<CloneLocator, CloneLocatorError> {
        CloneLocator::parse(&self.clone_locator)
    }

    /// 作業ディレクトリ内のリポジトリディレクトリ
    ///
    /// 名前が作業ディレクトリの外を指す場合（区切り文字、`..` など）は `None`。
    pub fn target_dir(&self, work_dir: &Path) -> Option<PathBuf> {
        let name = self.name.as_str();
        let escapes = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\');
        if escapes {
            None
        } else {
            Some(work_dir.join(name))
        }
    }
}

impl fmt::Display for RepositoryJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// ジョブ成功時の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// 新規クローンしてLFSオブジェクトを取得した
    Cloned,
    /// 既存のクローンを更新した
    Refreshed,
    /// リモートを付け替えて全内容をプッシュした
    Retargeted,
}

impl JobOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            JobOutcome::Cloned => "cloned",
            JobOutcome::Refreshed => "updated",
            JobOutcome::Retargeted => "pushed",
        }
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_accessors() {
        let job = RepositoryJob::new("assets", "https://github.com/org/assets.git");
        assert_eq!(job.name(), "assets");
        assert_eq!(job.clone_locator(), "https://github.com/org/assets.git");
        assert_eq!(job.to_string(), "assets");
        assert!(job.parse_locator().is_ok());
    }

    #[test]
    fn test_target_dir_inside_work_dir() {
        let job = RepositoryJob::new("assets", "https://github.com/org/assets.git");
        let dir = job.target_dir(Path::new("/tmp/work")).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/work/assets"));
    }

    #[test]
    fn test_target_dir_rejects_escaping_names() {
        for name in ["", ".", "..", "../etc", "a/b", "a\\b"] {
            let job = RepositoryJob::new(name, "https://github.com/org/x.git");
            assert!(job.target_dir(Path::new("/tmp/work")).is_none(), "name: {name:?}");
        }
    }

    #[test]
    fn test_invalid_locator() {
        let job = RepositoryJob::new("bad", "github.com/org/bad.git");
        assert!(job.parse_locator().is_err());
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(JobOutcome::Cloned.to_string(), "cloned");
        assert_eq!(JobOutcome::Refreshed.to_string(), "updated");
        assert_eq!(JobOutcome::Retargeted.to_string(), "pushed");
    }
}
