//! Module-level support imports for the marker: the marker library
//! (`import pytest`) and the sentinel constant
//! (`from quarantine_tools.constants import QUARANTINED`).

use tree_sitter::Node;

use crate::marker::MarkerGrammar;
use crate::parsers::SourceTree;

/// Import lines (without terminator) the file still needs, in insertion order.
pub fn missing_imports(tree: &SourceTree, grammar: &MarkerGrammar) -> Vec<String> {
    let mut has_marker_import = false;
    let mut has_constant_import = false;
    for statement in module_imports(tree) {
        match statement.kind() {
            "import_statement" => {
                has_marker_import |= imports_module(tree, statement, grammar.marker_import());
            }
            "import_from_statement" => {
                has_constant_import |= imports_name(
                    tree,
                    statement,
                    grammar.constant_module(),
                    grammar.sentinel(),
                );
            }
            _ => {}
        }
    }

    let mut lines = Vec::new();
    if !has_marker_import {
        lines.push(format!("import {}", grammar.marker_import()));
    }
    if !has_constant_import {
        lines.push(format!(
            "from {} import {}",
            grammar.constant_module(),
            grammar.sentinel()
        ));
    }
    lines
}

/// Byte offset where new imports go: the start of the first regular
/// import; failing that, after any `__future__` imports or module
/// docstring; failing that, before the first statement.
pub fn insertion_offset(tree: &SourceTree) -> usize {
    let mut after: Option<usize> = None;
    for (index, statement) in top_level(tree).into_iter().enumerate() {
        match statement.kind() {
            "future_import_statement" => after = Some(tree.line_end(statement.end_byte())),
            "import_statement" | "import_from_statement" => {
                return tree.line_start(statement.start_byte()).max(after.unwrap_or(0));
            }
            "expression_statement" if index == 0 && is_docstring(statement) => {
                after = Some(tree.line_end(statement.end_byte()));
            }
            _ => return after.unwrap_or_else(|| tree.line_start(statement.start_byte())),
        }
    }
    after.unwrap_or(tree.text().len())
}

/// Render `lines` for insertion at `offset`, terminating each with the
/// file's newline and separating from a preceding unterminated line.
pub fn render_imports(tree: &SourceTree, offset: usize, lines: &[String]) -> String {
    let newline = tree.newline();
    let mut out = String::new();
    if offset > 0 && !tree.text()[..offset].ends_with('\n') {
        out.push_str(newline);
    }
    for line in lines {
        out.push_str(line);
        out.push_str(newline);
    }
    out
}

fn top_level(tree: &SourceTree) -> Vec<Node<'_>> {
    let root = tree.root();
    let mut cursor = root.walk();
    let statements = root
        .named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .collect();
    statements
}

/// Import statements at module level, including those nested in
/// top-level `try`/`if` blocks. Function and class bodies are not entered.
fn module_imports(tree: &SourceTree) -> Vec<Node<'_>> {
    let mut imports = Vec::new();
    let mut stack = vec![tree.root()];
    while let Some(node) = stack.pop() {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "import_statement" | "import_from_statement" => imports.push(child),
                "try_statement" | "if_statement" | "block" | "except_clause"
                | "except_group_clause" | "else_clause" | "elif_clause" | "finally_clause" => {
                    stack.push(child)
                }
                _ => {}
            }
        }
    }
    imports
}

fn is_docstring(statement: Node) -> bool {
    statement.named_child_count() == 1
        && statement
            .named_child(0)
            .is_some_and(|n| matches!(n.kind(), "string" | "concatenated_string"))
}

/// `import <module>` without an alias.
fn imports_module(tree: &SourceTree, statement: Node, module: &str) -> bool {
    let mut cursor = statement.walk();
    let found = statement
        .named_children(&mut cursor)
        .any(|n| n.kind() == "dotted_name" && tree.node_text(&n) == module);
    found
}

/// `from <module> import <name>` without an alias, or a wildcard import.
fn imports_name(tree: &SourceTree, statement: Node, module: &str, name: &str) -> bool {
    let from_module = statement
        .child_by_field_name("module_name")
        .is_some_and(|m| tree.node_text(&m) == module);
    if !from_module {
        return false;
    }
    let mut cursor = statement.walk();
    let found = statement.named_children(&mut cursor).skip(1).any(|n| match n.kind() {
        "wildcard_import" => true,
        "dotted_name" => tree.node_text(&n) == name,
        _ => false,
    });
    found
}
