//! Repository scanner: walk the tests root, parse and classify every
//! Python file in parallel, and flatten the result into an inventory.
//!
//! Files that cannot be read or parsed are recorded on the report and
//! skipped; they never abort the scan.

pub mod hasher;
pub mod types;

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use ignore::WalkBuilder;
use quarantine_core::errors::{ConfigError, ParseError, ScanError, ScanFileError};
use quarantine_core::QuarantineConfig;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::classifier::{classify_tree, qualified_name, ClassifiedTest, TeamResolver, TestRecord};
use crate::dates::{MarkerDateSource, NoDates};
use crate::marker::MarkerGrammar;
use crate::parsers::SourceTree;

use hasher::hash_content;
pub use types::{ScanReport, ScanStats, ScannedFile};

/// Classified tests of one file.
struct FileScan {
    rel_path: PathBuf,
    content_hash: u64,
    tests: Vec<ClassifiedTest>,
}

#[derive(Debug, Clone)]
pub struct Scanner {
    root: PathBuf,
    tests_root: String,
    excluded_dirs: Vec<String>,
    max_file_size: u64,
    threads: usize,
    grammar: MarkerGrammar,
    teams: TeamResolver,
}

impl Scanner {
    pub fn new(root: impl Into<PathBuf>, config: &QuarantineConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            root: root.into(),
            tests_root: config.scan.effective_tests_root().to_string(),
            excluded_dirs: config.scan.effective_excluded_dirs(),
            max_file_size: config.scan.effective_max_file_size(),
            threads: config.scan.effective_threads(),
            grammar: MarkerGrammar::from_config(&config.marker)?,
            teams: TeamResolver::from_config(config),
        })
    }

    /// Replace the excluded directory names.
    pub fn with_excluded_dirs(mut self, excluded_dirs: Vec<String>) -> Self {
        self.excluded_dirs = excluded_dirs;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scan the tests root. `dates` supplies marker dates and `today`
    /// anchors marker ages.
    pub fn scan(
        &self,
        dates: &dyn MarkerDateSource,
        today: NaiveDate,
    ) -> Result<ScanReport, ScanError> {
        let start = Instant::now();
        let tests_dir = self.root.join(&self.tests_root);
        if !tests_dir.is_dir() {
            return Err(ScanError::TestsRootMissing { path: tests_dir });
        }

        let (paths, mut errors) = self.collect_files(&tests_dir);
        debug!(files = paths.len(), root = %tests_dir.display(), "collected source files");

        let results = self.process_all(&paths);

        let mut report = ScanReport {
            root: self.root.clone(),
            ..Default::default()
        };
        for (path, result) in paths.iter().zip(results) {
            match result {
                Ok(scan) => self.append_file(&mut report, scan, dates, today),
                Err(err) => {
                    let rel = self.relative(path);
                    warn!(file = %rel.display(), error = %err, "skipping file");
                    errors.push(ScanFileError::new(rel, &err));
                }
            }
        }

        report.errors = errors;
        report.stats.files_scanned = report.files.len();
        report.stats.files_failed = report.errors.len();
        report.stats.tests = report.records.len();
        report.stats.quarantined = report.quarantined().count();
        report.stats.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            files = report.stats.files_scanned,
            failed = report.stats.files_failed,
            tests = report.stats.tests,
            quarantined = report.stats.quarantined,
            duration_ms = report.stats.duration_ms,
            "scan complete"
        );
        Ok(report)
    }

    /// Python files under `tests_dir` in path order. Walk errors are
    /// returned alongside.
    fn collect_files(&self, tests_dir: &Path) -> (Vec<PathBuf>, Vec<ScanFileError>) {
        let excluded = self.excluded_dirs.clone();
        let walker = WalkBuilder::new(tests_dir)
            .standard_filters(false)
            .follow_links(false)
            .filter_entry(move |entry| {
                entry.depth() == 0
                    || !excluded
                        .iter()
                        .any(|d| entry.file_name().to_str() == Some(d.as_str()))
            })
            .build();

        let mut files = Vec::new();
        let mut errors = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) => {
                    let is_file = entry.file_type().is_some_and(|t| t.is_file());
                    let is_python = entry.path().extension().is_some_and(|e| e == "py");
                    if is_file && is_python {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    let err = ScanError::IoError {
                        path: tests_dir.to_path_buf(),
                        source: std::io::Error::other(e.to_string()),
                    };
                    warn!(error = %err, "walk error");
                    errors.push(ScanFileError::new(self.relative(tests_dir), &err));
                }
            }
        }
        files.sort();
        (files, errors)
    }

    /// Parse and classify every file, in parallel, preserving input order.
    fn process_all(&self, paths: &[PathBuf]) -> Vec<Result<FileScan, ScanError>> {
        let run = || -> Vec<Result<FileScan, ScanError>> {
            paths.par_iter().map(|p| self.process_file(p)).collect()
        };
        if self.threads == 0 {
            return run();
        }
        match rayon::ThreadPoolBuilder::new().num_threads(self.threads).build() {
            Ok(pool) => pool.install(run),
            Err(e) => {
                warn!(threads = self.threads, error = %e, "thread pool unavailable, using global pool");
                run()
            }
        }
    }

    fn process_file(&self, path: &Path) -> Result<FileScan, ScanError> {
        let rel_path = self.relative(path);
        let io = |source: std::io::Error| ScanError::IoError {
            path: rel_path.clone(),
            source,
        };
        let size = std::fs::metadata(path).map_err(io)?.len();
        if size > self.max_file_size {
            return Err(ScanError::MaxFileSizeExceeded {
                path: rel_path.clone(),
                size,
                max: self.max_file_size,
            });
        }
        let bytes = std::fs::read(path).map_err(io)?;
        let content_hash = hash_content(&bytes);
        let text = String::from_utf8(bytes).map_err(|_| ParseError::InvalidUtf8 {
            path: rel_path.clone(),
        })?;
        let tree = SourceTree::parse(text).map_err(|e| e.with_path(&rel_path))?;
        let tests = classify_tree(&tree, &self.grammar);
        Ok(FileScan {
            rel_path,
            content_hash,
            tests,
        })
    }

    fn append_file(
        &self,
        report: &mut ScanReport,
        scan: FileScan,
        dates: &dyn MarkerDateSource,
        today: NaiveDate,
    ) {
        let rel = slash_path(&scan.rel_path);
        let team = self.teams.team_for_path(&rel);
        let mut quarantined_count = 0;
        for test in &scan.tests {
            let since = match &test.marker {
                Some(marker) => {
                    quarantined_count += 1;
                    dates.marker_date(&scan.rel_path, marker.line)
                }
                None => None,
            };
            report.records.push(TestRecord::new(
                test,
                qualified_name(&rel, &test.function),
                rel.clone(),
                team.clone(),
                since,
                today,
            ));
        }
        report.files.push(ScannedFile {
            path: scan.rel_path,
            content_hash: scan.content_hash,
            test_count: scan.tests.len(),
            quarantined_count,
        });
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root).unwrap_or(path).to_path_buf()
    }
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Scan `root` with default configuration, no marker dates and the given
/// excluded directory names.
pub fn scan_repository(root: &Path, excluded_dirs: &[String]) -> Result<Vec<TestRecord>, ScanError> {
    let scanner = Scanner::new(root, &QuarantineConfig::default())?
        .with_excluded_dirs(excluded_dirs.to_vec());
    Ok(scanner.scan(&NoDates, Utc::now().date_naive())?.records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slash_paths() {
        assert_eq!(slash_path(Path::new("tests/net/test_a.py")), "tests/net/test_a.py");
    }

    #[test]
    fn missing_tests_root() {
        let dir = tempfile::TempDir::new().unwrap();
        let scanner = Scanner::new(dir.path(), &QuarantineConfig::default()).unwrap();
        let err = scanner
            .scan(&NoDates, Utc::now().date_naive())
            .unwrap_err();
        assert!(matches!(err, ScanError::TestsRootMissing { .. }));
    }
}
