//! Python source tree.
//!
//! `SourceTree` owns the exact input text next to the concrete syntax tree.
//! Edits never touch the tree: they are byte-span replacements against the
//! text (see `crate::edit`), and a fresh `SourceTree` is parsed from the
//! result. Serialization is therefore the identity on unedited input.

use std::cell::RefCell;
use std::path::PathBuf;

use quarantine_core::errors::ParseError;
use tree_sitter::{Node, Parser, Tree};

use super::error_tolerant;

thread_local! {
    static PYTHON_PARSER: RefCell<Option<Parser>> = const { RefCell::new(None) };
}

/// Parse `text` with this thread's Python parser, creating it on first use.
fn parse_python(text: &str) -> Result<Tree, ParseError> {
    PYTHON_PARSER.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            let mut parser = Parser::new();
            parser
                .set_language(&tree_sitter_python::LANGUAGE.into())
                .map_err(|e| ParseError::GrammarUnavailable {
                    message: e.to_string(),
                })?;
            *slot = Some(parser);
        }
        let parser = slot.as_mut().ok_or_else(|| ParseError::GrammarUnavailable {
            message: "parser slot empty".to_string(),
        })?;
        parser.parse(text, None).ok_or_else(|| ParseError::NoTree {
            path: PathBuf::new(),
        })
    })
}

/// A parsed Python module.
pub struct SourceTree {
    text: String,
    tree: Tree,
}

impl std::fmt::Debug for SourceTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceTree")
            .field("bytes", &self.text.len())
            .field("root", &self.tree.root_node().kind())
            .finish()
    }
}

impl SourceTree {
    /// Parse source text. Fails with `ParseError::SyntaxError` (1-based
    /// line/column, empty path) when the text is not valid Python.
    pub fn parse(text: impl Into<String>) -> Result<Self, ParseError> {
        let text = text.into();
        let tree = parse_python(&text)?;
        if let Some(pos) = error_tolerant::first_error(tree.root_node()) {
            return Err(ParseError::SyntaxError {
                path: PathBuf::new(),
                line: pos.line + 1,
                column: pos.column + 1,
            });
        }
        Ok(Self { text, tree })
    }

    /// Re-serialize the tree. Byte-identical to the parsed input.
    pub fn serialize(&self) -> String {
        self.text.clone()
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source text covered by `node`.
    pub fn node_text(&self, node: &Node) -> &str {
        self.text
            .get(node.start_byte()..node.end_byte())
            .unwrap_or("")
    }

    /// Byte offset of the start of the line containing `offset`.
    pub fn line_start(&self, offset: usize) -> usize {
        let offset = offset.min(self.text.len());
        self.text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0)
    }

    /// Byte offset just past the newline ending the line containing
    /// `offset`, or the end of the text on the last line.
    pub fn line_end(&self, offset: usize) -> usize {
        let offset = offset.min(self.text.len());
        self.text[offset..]
            .find('\n')
            .map(|i| offset + i + 1)
            .unwrap_or(self.text.len())
    }

    /// Line terminator used by the file (`\r\n` if present anywhere, else `\n`).
    pub fn newline(&self) -> &'static str {
        if self.text.contains("\r\n") {
            "\r\n"
        } else {
            "\n"
        }
    }
}
