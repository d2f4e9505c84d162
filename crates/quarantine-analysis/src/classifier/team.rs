//! Team derivation from file paths and external test names.

use std::collections::BTreeMap;

use quarantine_core::config::QuarantineConfig;
use quarantine_core::constants::{
    DEFAULT_PRESERVED_TEAM_DIRS, DEFAULT_TESTS_ROOT, TEST_FUNCTION_PREFIX,
};

use super::naming::normalize_test_name;

/// Maps a path to the team owning it: the first directory below the tests
/// root, passed through the override table. Paths with no directory below
/// the tests root (or outside it) map to the unknown team. Preserved
/// directories keep their own name whatever the override table says.
#[derive(Debug, Clone)]
pub struct TeamResolver {
    tests_root: Vec<String>,
    overrides: BTreeMap<String, String>,
    preserved: Vec<String>,
    unknown_team: String,
}

impl Default for TeamResolver {
    fn default() -> Self {
        Self::from_config(&QuarantineConfig::default())
    }
}

impl TeamResolver {
    pub fn new(
        tests_root: &str,
        overrides: BTreeMap<String, String>,
        unknown_team: impl Into<String>,
    ) -> Self {
        let mut root: Vec<String> = split_path(tests_root).map(String::from).collect();
        if root.is_empty() {
            root.push(DEFAULT_TESTS_ROOT.to_string());
        }
        Self {
            tests_root: root,
            overrides,
            preserved: DEFAULT_PRESERVED_TEAM_DIRS
                .iter()
                .map(|d| d.to_string())
                .collect(),
            unknown_team: unknown_team.into(),
        }
    }

    pub fn from_config(config: &QuarantineConfig) -> Self {
        Self::new(
            config.scan.effective_tests_root(),
            config.teams.effective_overrides(),
            config.teams.effective_unknown_team(),
        )
        .with_preserved(config.teams.effective_preserve())
    }

    /// Replace the directory names the override table cannot remap.
    pub fn with_preserved(mut self, preserved: Vec<String>) -> Self {
        self.preserved = preserved;
        self
    }

    pub fn unknown_team(&self) -> &str {
        &self.unknown_team
    }

    /// Team for a repository-relative file path.
    pub fn team_for_path(&self, rel_path: &str) -> String {
        let segments: Vec<&str> = split_path(rel_path).collect();
        match self.directory_after_root(&segments) {
            // the component after the root must be a directory, not the file
            Some(i) if i + 1 < segments.len() => self.resolve(segments[i]),
            _ => self.unknown_team.clone(),
        }
    }

    /// Team for an external test name (pytest node id or dotted path).
    /// Dotted names carry no directory/module distinction, so a segment
    /// that looks like a test module is not taken as a team directory.
    pub fn team_for_test_name(&self, name: &str) -> String {
        let normalized = normalize_test_name(name);
        let segments: Vec<&str> = normalized.split('.').collect();
        match self.directory_after_root(&segments) {
            Some(i)
                if i + 1 < segments.len()
                    && !segments[i].starts_with(TEST_FUNCTION_PREFIX)
                    && segments[i] != "conftest" =>
            {
                self.resolve(segments[i])
            }
            _ => self.unknown_team.clone(),
        }
    }

    fn resolve(&self, directory: &str) -> String {
        if self.preserved.iter().any(|d| d == directory) {
            return directory.to_string();
        }
        self.overrides
            .get(directory)
            .cloned()
            .unwrap_or_else(|| directory.to_string())
    }

    /// Index of the segment right after the first occurrence of the tests root.
    fn directory_after_root(&self, segments: &[&str]) -> Option<usize> {
        let n = self.tests_root.len();
        if segments.len() <= n {
            return None;
        }
        (0..=segments.len() - n - 1)
            .find(|&i| {
                segments[i..i + n]
                    .iter()
                    .zip(&self.tests_root)
                    .all(|(a, b)| *a == b.as_str())
            })
            .map(|i| i + n)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
}
