//! Test identifiers: `path/to/test_file.py::TestClass::test_name`.

use std::fmt;
use std::path::{Path, PathBuf};

use quarantine_core::errors::MutationError;
use serde::Serialize;
use quarantine_core::types::SmallVec2;

use crate::discovery::FunctionNode;

/// Which function in a file an operation targets. A selector without a
/// class path matches the name at any nesting level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSelector {
    pub class_path: SmallVec2<String>,
    pub name: String,
}

impl FunctionSelector {
    /// Parse `test_x`, `TestA::test_x` or `TestA.test_x`.
    pub fn parse(selector: &str) -> Result<Self, MutationError> {
        let invalid = |message: &str| MutationError::InvalidTarget {
            target: selector.to_string(),
            message: message.to_string(),
        };
        let normalized = selector.trim().replace("::", ".");
        let mut parts: Vec<&str> = normalized.split('.').collect();
        let name = parts.pop().unwrap_or_default();
        if name.is_empty() || parts.iter().any(|p| p.is_empty()) {
            return Err(invalid("empty function or class name"));
        }
        Ok(Self {
            class_path: parts.into_iter().map(str::to_string).collect(),
            name: name.to_string(),
        })
    }

    pub fn matches(&self, function: &FunctionNode) -> bool {
        function.name == self.name
            && (self.class_path.is_empty() || function.class_path == self.class_path)
    }
}

impl fmt::Display for FunctionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for class in &self.class_path {
            write!(f, "{class}::")?;
        }
        f.write_str(&self.name)
    }
}

/// A file plus a function selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestTarget {
    pub file: PathBuf,
    pub selector: FunctionSelector,
}

impl TestTarget {
    /// Parse a pytest-style node id. Relative file paths are resolved
    /// against `root`. The file must exist and end in `.py`.
    pub fn parse(target: &str, root: &Path) -> Result<Self, MutationError> {
        let invalid = |message: String| MutationError::InvalidTarget {
            target: target.to_string(),
            message,
        };
        let target = target.trim();
        let Some((file, function)) = target.split_once("::") else {
            return Err(invalid("expected <file>.py::<function>".to_string()));
        };
        if !file.ends_with(".py") {
            return Err(invalid(format!("'{file}' is not a Python file")));
        }
        let path = Path::new(file);
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        };
        if !path.is_file() {
            return Err(invalid(format!("file not found: {}", path.display())));
        }
        let selector = FunctionSelector::parse(function).map_err(|_| {
            invalid("empty function or class name".to_string())
        })?;
        Ok(Self {
            file: path,
            selector,
        })
    }
}

impl fmt::Display for TestTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.file.display(), self.selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_forms() {
        let s = FunctionSelector::parse("test_x").unwrap();
        assert!(s.class_path.is_empty());
        assert_eq!(s.name, "test_x");

        let s = FunctionSelector::parse("TestA::TestB::test_x").unwrap();
        assert_eq!(s.class_path.as_slice(), ["TestA", "TestB"]);
        assert_eq!(s.to_string(), "TestA::TestB::test_x");

        assert_eq!(
            FunctionSelector::parse("TestA.test_x").unwrap(),
            FunctionSelector::parse("TestA::test_x").unwrap()
        );
        assert!(FunctionSelector::parse("").is_err());
        assert!(FunctionSelector::parse("TestA::").is_err());
    }

    #[test]
    fn target_validation() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("tests/net")).unwrap();
        std::fs::write(dir.path().join("tests/net/test_a.py"), "def test_a():\n    pass\n").unwrap();

        let t = TestTarget::parse("tests/net/test_a.py::test_a", dir.path()).unwrap();
        assert_eq!(t.file, dir.path().join("tests/net/test_a.py"));
        assert_eq!(t.selector.name, "test_a");

        for bad in [
            "tests/net/test_a.py",
            "tests/net/test_a.txt::test_a",
            "tests/net/missing.py::test_a",
            "tests/net/test_a.py::",
        ] {
            let err = TestTarget::parse(bad, dir.path()).unwrap_err();
            assert!(matches!(err, MutationError::InvalidTarget { .. }), "{bad}");
        }
    }
}
