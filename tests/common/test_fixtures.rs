//! Test fixtures for input files and working directories

use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const HEADER: &str = "Repository,GitAttributesPaths,CloneURL";

/// A temporary directory holding an input file and a working directory
pub struct MigrationFixture {
    pub temp_dir: TempDir,
}

impl MigrationFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn work_dir(&self) -> PathBuf {
        self.path().join("work")
    }

    /// Write an input file with the standard header and one row per `(name, locator)`
    pub fn write_input(&self, rows: &[(&str, &str)]) -> PathBuf {
        let mut content = String::from(HEADER);
        content.push('\n');
        for (name, locator) in rows {
            content.push_str(&format!("{},.gitattributes,{}\n", name, locator));
        }
        self.write_raw("lfs-repos.csv", &content)
    }

    /// Write an arbitrary file under the fixture directory
    pub fn write_raw(&self, file_name: &str, content: &str) -> PathBuf {
        let path = self.path().join(file_name);
        std::fs::write(&path, content).expect("Failed to write input file");
        path
    }

    /// Pretend `names` were already pulled into the working directory
    pub fn create_clones(&self, names: &[&str]) {
        for name in names {
            std::fs::create_dir_all(self.work_dir().join(name)).expect("Failed to create clone");
        }
    }
}

/// `https://github.com/<org>/<name>.git`
pub fn github_locator(org: &str, name: &str) -> String {
    format!("https://github.com/{}/{}.git", org, name)
}
