//! In-memory file edits.
//!
//! A `FileEdit` is a set of byte-span replacements against one parsed
//! source. Rendering copies every byte outside the edited spans verbatim,
//! so the unedited remainder of the file survives unchanged.

use std::path::Path;

use quarantine_core::errors::MutationError;
use serde::Serialize;

use crate::parsers::{ByteSpan, SourceTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditKind {
    InsertDecorator,
    RemoveDecorator,
    InsertImport,
}

/// Replace `span` with `text`. Insertions have an empty span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    pub kind: EditKind,
    pub span: ByteSpan,
    pub text: String,
}

#[derive(Debug)]
pub struct FileEdit<'a> {
    source: &'a SourceTree,
    edits: Vec<TextEdit>,
}

impl<'a> FileEdit<'a> {
    pub fn new(source: &'a SourceTree) -> Self {
        Self {
            source,
            edits: Vec::new(),
        }
    }

    pub fn source(&self) -> &SourceTree {
        self.source
    }

    pub fn edits(&self) -> &[TextEdit] {
        &self.edits
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Insert `text` at `offset`. Insertions at the same offset render in
    /// the order they were added.
    pub fn insert(&mut self, kind: EditKind, offset: usize, text: impl Into<String>) {
        self.edits.push(TextEdit {
            kind,
            span: ByteSpan::new(offset, offset),
            text: text.into(),
        });
    }

    pub fn delete(&mut self, kind: EditKind, span: ByteSpan) {
        self.edits.push(TextEdit {
            kind,
            span,
            text: String::new(),
        });
    }

    /// Apply all edits and return the new text. Overlapping spans, spans
    /// out of bounds and spans off a char boundary are rejected with
    /// `EditConflict`.
    pub fn render(&self, path: &Path) -> Result<String, MutationError> {
        let text = self.source.text();
        let mut ordered: Vec<&TextEdit> = self.edits.iter().collect();
        // stable: equal offsets keep insertion order
        ordered.sort_by_key(|e| e.span.start);

        let mut out = String::with_capacity(text.len() + 256);
        let mut cursor = 0usize;
        for edit in ordered {
            let ByteSpan { start, end } = edit.span;
            if start < cursor
                || end < start
                || end > text.len()
                || !text.is_char_boundary(start)
                || !text.is_char_boundary(end)
            {
                return Err(MutationError::EditConflict {
                    file: path.to_path_buf(),
                    offset: start,
                });
            }
            out.push_str(&text[cursor..start]);
            out.push_str(&edit.text);
            cursor = end;
        }
        out.push_str(&text[cursor..]);
        Ok(out)
    }
}
