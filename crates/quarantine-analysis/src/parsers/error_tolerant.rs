//! Locating syntax errors in a tree-sitter tree.

use tree_sitter::Node;

use super::types::{Position, Range};

/// Count ERROR and MISSING nodes in a tree-sitter tree.
pub fn count_errors(root: Node) -> (u32, Vec<Range>) {
    let mut count = 0u32;
    let mut ranges = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            count += 1;
            ranges.push(Range::from_ts_node(&node));
        }
        if node.has_error() {
            let mut cursor = node.walk();
            stack.extend(node.children(&mut cursor));
        }
    }
    ranges.sort_by_key(|r| (r.start.line, r.start.column));
    (count, ranges)
}

/// Position of the earliest ERROR or MISSING node, if the tree has any.
pub fn first_error(root: Node) -> Option<Position> {
    if !root.has_error() {
        return None;
    }
    let (_, ranges) = count_errors(root);
    Some(ranges.first().map(|r| r.start).unwrap_or_default())
}
