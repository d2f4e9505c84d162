//! Positional and decorator types shared by discovery, classification and mutation.

use quarantine_core::types::{SmallVec1, SmallVec2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

/// Zero-based row/column range of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn from_ts_node(node: &tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            start: Position {
                line: start.row as u32,
                column: start.column as u32,
            },
            end: Position {
                line: end.row as u32,
                column: end.column as u32,
            },
        }
    }
}

/// Half-open byte span `[start, end)` into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ByteSpan {
    pub start: usize,
    pub end: usize,
}

impl ByteSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One decorator as written in source, in original list order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoratorInfo {
    /// Dotted callee (`pytest.mark.xfail`) with whitespace removed.
    pub name: String,
    /// True when the decorator is a call (`@x(...)`), false for a bare reference.
    pub is_call: bool,
    pub arguments: SmallVec2<DecoratorArgument>,
    /// Decorator text from `@` to the last non-whitespace byte.
    pub raw_text: String,
    pub range: Range,
    pub span: ByteSpan,
}

impl DecoratorInfo {
    /// Keyword argument lookup.
    pub fn keyword(&self, key: &str) -> Option<&DecoratorArgument> {
        self.arguments
            .iter()
            .find(|arg| arg.key.as_deref() == Some(key))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoratorArgument {
    /// `None` for positional arguments.
    pub key: Option<String>,
    /// Raw source text of the value expression.
    pub value: String,
    /// Raw text of each string token when the value is a (possibly
    /// implicitly concatenated) string literal; empty otherwise.
    pub string_parts: SmallVec1<String>,
}
