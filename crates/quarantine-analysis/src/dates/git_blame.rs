//! Marker dates from `git blame` of the marker's first line.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate};
use git2::Repository;
use quarantine_core::errors::SignalError;

use super::MarkerDateSource;

/// Blames the working-tree content of each file, so a marker that is not
/// committed yet blames to the zero commit and yields `None`.
pub struct GitBlameDates {
    repo: Mutex<Repository>,
    root: PathBuf,
    workdir: PathBuf,
}

impl GitBlameDates {
    /// Open the repository containing `root` (the scanned repository root).
    pub fn open(root: &Path) -> Result<Self, SignalError> {
        let repo = Repository::discover(root)
            .map_err(|e| SignalError::unavailable("git blame", e.message().to_string()))?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| SignalError::unavailable("git blame", "bare repository"))?
            .to_path_buf();
        let canonical = |p: &Path| std::fs::canonicalize(p).unwrap_or_else(|_| p.to_path_buf());
        Ok(Self {
            root: canonical(root),
            workdir: canonical(&workdir),
            repo: Mutex::new(repo),
        })
    }

    fn blame_line(&self, rel_path: &Path, line: u32) -> Result<Option<NaiveDate>, git2::Error> {
        let absolute = self.root.join(rel_path);
        let Ok(in_repo) = absolute.strip_prefix(&self.workdir) else {
            return Ok(None);
        };
        let Ok(content) = std::fs::read(&absolute) else {
            return Ok(None);
        };
        let Ok(repo) = self.repo.lock() else {
            return Ok(None);
        };

        let committed = repo.blame_file(in_repo, None)?;
        let current = committed.blame_buffer(&content)?;
        let Some(hunk) = current.get_line(line as usize) else {
            return Ok(None);
        };
        let id = hunk.final_commit_id();
        if id.is_zero() {
            return Ok(None);
        }
        let commit = repo.find_commit(id)?;
        let seconds = commit.author().when().seconds();
        Ok(DateTime::from_timestamp(seconds, 0).map(|dt| dt.date_naive()))
    }
}

impl MarkerDateSource for GitBlameDates {
    fn marker_date(&self, rel_path: &Path, line: u32) -> Option<NaiveDate> {
        match self.blame_line(rel_path, line) {
            Ok(date) => date,
            Err(e) => {
                tracing::debug!(
                    file = %rel_path.display(),
                    line,
                    error = %e.message(),
                    "git blame failed, marker age unknown"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_outside_repository_is_unavailable() {
        let dir = tempfile::TempDir::new().unwrap();
        // a fresh temp dir is not inside a git repository on CI machines
        if Repository::discover(dir.path()).is_err() {
            assert!(GitBlameDates::open(dir.path()).is_err());
        }
    }

    #[test]
    fn committed_line_has_commit_date_and_uncommitted_is_unknown() {
        let dir = tempfile::TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        std::fs::create_dir_all(dir.path().join("tests/net")).unwrap();
        std::fs::write(dir.path().join("tests/net/test_a.py"), "def test_a():\n    pass\n").unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new("tests/net/test_a.py")).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let when = git2::Time::new(1_700_000_000, 0);
        let sig = git2::Signature::new("Dev", "dev@example.com", &when).unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[]).unwrap();

        // prepend an uncommitted line
        std::fs::write(
            dir.path().join("tests/net/test_a.py"),
            "import pytest\ndef test_a():\n    pass\n",
        )
        .unwrap();

        let dates = GitBlameDates::open(dir.path()).unwrap();
        let rel = Path::new("tests/net/test_a.py");
        assert_eq!(
            dates.marker_date(rel, 2),
            NaiveDate::from_ymd_opt(2023, 11, 14)
        );
        assert_eq!(dates.marker_date(rel, 1), None);
        assert_eq!(dates.marker_date(Path::new("tests/missing.py"), 1), None);
    }
}
