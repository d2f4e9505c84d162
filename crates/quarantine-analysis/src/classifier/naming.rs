//! Qualified test names.

use crate::discovery::FunctionNode;

/// Dotted module path of a repository-relative file:
/// `tests/storage/test_x.py` → `tests.storage.test_x`, and
/// `tests/storage/__init__.py` → `tests.storage`.
pub fn module_path(rel_path: &str) -> String {
    let trimmed = rel_path.strip_suffix(".py").unwrap_or(rel_path);
    let mut parts: Vec<&str> = trimmed
        .split(['/', '\\'])
        .filter(|p| !p.is_empty() && *p != ".")
        .collect();
    if parts.last() == Some(&"__init__") {
        parts.pop();
    }
    parts.join(".")
}

/// Module path, enclosing classes and function name joined by dots.
pub fn qualified_name(rel_path: &str, function: &FunctionNode) -> String {
    let mut name = module_path(rel_path);
    for segment in function
        .class_path
        .iter()
        .chain(std::iter::once(&function.name))
    {
        if !name.is_empty() {
            name.push('.');
        }
        name.push_str(segment);
    }
    name
}

/// Normalize an externally supplied test name to the dotted form used by
/// `TestRecord::qualified_name`. Accepts pytest node ids
/// (`tests/a/test_x.py::TestA::test_b[param]`) and dotted names; a trailing
/// parametrization id is dropped.
pub fn normalize_test_name(name: &str) -> String {
    let name = name.trim();
    let name = name.find('[').map_or(name, |i| &name[..i]);
    name.replace("::", "/")
        .split(['/', '\\'])
        .map(|s| s.strip_suffix(".py").unwrap_or(s))
        .flat_map(|s| s.split('.'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::SourceTree;

    #[test]
    fn module_paths() {
        assert_eq!(module_path("tests/storage/test_x.py"), "tests.storage.test_x");
        assert_eq!(module_path("tests/storage/__init__.py"), "tests.storage");
        assert_eq!(module_path("./tests/test_y.py"), "tests.test_y");
    }

    #[test]
    fn qualified_names_include_classes() {
        let tree = SourceTree::parse("class TestA:\n    def test_b(self):\n        pass\n").unwrap();
        let functions = crate::discovery::discover(&tree);
        assert_eq!(
            qualified_name("tests/net/test_x.py", &functions[0]),
            "tests.net.test_x.TestA.test_b"
        );
    }

    #[test]
    fn normalizes_external_names() {
        assert_eq!(
            normalize_test_name("tests/net/test_x.py::TestA::test_b[ipv4-1.2]"),
            "tests.net.test_x.TestA.test_b"
        );
        assert_eq!(
            normalize_test_name("tests.net.test_x.TestA.test_b"),
            "tests.net.test_x.TestA.test_b"
        );
        assert_eq!(normalize_test_name(" test_b "), "test_b");
    }
}
