//! Mutator: apply or remove the quarantine marker on one function.
//!
//! Each call is a single read → parse → edit → verify → write pass over one
//! file. Every precondition is checked against a fresh parse, and every
//! error aborts before the file is touched. Writes go through a temporary
//! file in the same directory and a rename.

pub mod imports;
pub mod target;

use std::io::Write;
use std::path::{Path, PathBuf};

use quarantine_core::errors::{MutationError, ParseError};
use quarantine_core::QuarantineConfig;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::classifier::{classify_tree, ClassifiedTest, TestStatus};
use crate::edit::{EditKind, FileEdit};
use crate::marker::MarkerGrammar;
use crate::parsers::{ByteSpan, SourceTree};
use crate::signals::{CommandFormatter, Formatter, NoopFormatter};

pub use target::{FunctionSelector, TestTarget};

/// Result of a successful apply or remove.
#[derive(Debug, Clone, Serialize)]
pub struct MutationOutcome {
    pub file: PathBuf,
    /// `Class::test_name` within the file.
    pub function: String,
    pub status: TestStatus,
    pub imports_added: Vec<String>,
    pub formatted: bool,
}

/// New file text produced by a planned edit, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEdit {
    pub text: String,
    pub function: String,
    pub imports_added: Vec<String>,
}

pub struct Mutator {
    grammar: MarkerGrammar,
    formatter: Box<dyn Formatter + Send + Sync>,
    format_after_write: bool,
}

impl std::fmt::Debug for Mutator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mutator")
            .field("grammar", &self.grammar)
            .field("format_after_write", &self.format_after_write)
            .finish()
    }
}

impl Default for Mutator {
    fn default() -> Self {
        Self::new(MarkerGrammar::default())
    }
}

impl Mutator {
    /// A mutator that never runs a formatter.
    pub fn new(grammar: MarkerGrammar) -> Self {
        Self {
            grammar,
            formatter: Box::new(NoopFormatter),
            format_after_write: false,
        }
    }

    pub fn from_config(config: &QuarantineConfig) -> Result<Self, quarantine_core::ConfigError> {
        Ok(Self {
            grammar: MarkerGrammar::from_config(&config.marker)?,
            formatter: Box::new(CommandFormatter::from_config(&config.mutate)),
            format_after_write: config.mutate.effective_format_after_write(),
        })
    }

    pub fn with_formatter(mut self, formatter: Box<dyn Formatter + Send + Sync>) -> Self {
        self.formatter = formatter;
        self.format_after_write = true;
        self
    }

    pub fn grammar(&self) -> &MarkerGrammar {
        &self.grammar
    }

    /// Quarantine `function` in `file`.
    pub fn apply(
        &self,
        file: &Path,
        function: &str,
        ticket: &str,
        reason: &str,
    ) -> Result<MutationOutcome, MutationError> {
        let selector = FunctionSelector::parse(function)?;
        self.apply_selector(file, &selector, ticket, reason)
    }

    pub fn apply_target(
        &self,
        target: &TestTarget,
        ticket: &str,
        reason: &str,
    ) -> Result<MutationOutcome, MutationError> {
        self.apply_selector(&target.file, &target.selector, ticket, reason)
    }

    /// Remove the quarantine marker from `function` in `file`.
    pub fn remove(&self, file: &Path, function: &str) -> Result<MutationOutcome, MutationError> {
        let selector = FunctionSelector::parse(function)?;
        self.remove_selector(file, &selector)
    }

    pub fn remove_target(&self, target: &TestTarget) -> Result<MutationOutcome, MutationError> {
        self.remove_selector(&target.file, &target.selector)
    }

    fn apply_selector(
        &self,
        file: &Path,
        selector: &FunctionSelector,
        ticket: &str,
        reason: &str,
    ) -> Result<MutationOutcome, MutationError> {
        let ticket = ticket.trim();
        let tree = read_source(file)?;
        let plan = self.plan_apply(file, &tree, selector, ticket, reason)?;
        let formatted = self.commit(file, &plan.text)?;
        info!(
            file = %file.display(),
            function = %plan.function,
            ticket,
            imports_added = plan.imports_added.len(),
            "quarantined test"
        );
        Ok(MutationOutcome {
            file: file.to_path_buf(),
            function: plan.function,
            status: TestStatus::Quarantined,
            imports_added: plan.imports_added,
            formatted,
        })
    }

    fn remove_selector(
        &self,
        file: &Path,
        selector: &FunctionSelector,
    ) -> Result<MutationOutcome, MutationError> {
        let tree = read_source(file)?;
        let plan = self.plan_remove(file, &tree, selector)?;
        let formatted = self.commit(file, &plan.text)?;
        info!(file = %file.display(), function = %plan.function, "removed quarantine marker");
        Ok(MutationOutcome {
            file: file.to_path_buf(),
            function: plan.function,
            status: TestStatus::Active,
            imports_added: Vec::new(),
            formatted,
        })
    }

    /// Compute the quarantined text without touching the filesystem.
    /// `path` only labels errors.
    pub fn plan_apply(
        &self,
        path: &Path,
        tree: &SourceTree,
        selector: &FunctionSelector,
        ticket: &str,
        reason: &str,
    ) -> Result<PlannedEdit, MutationError> {
        if !self.grammar.is_valid_ticket(ticket) {
            return Err(MutationError::InvalidTicket {
                ticket: ticket.to_string(),
                pattern: self.grammar.ticket_pattern().to_string(),
            });
        }
        let test = self.resolve(path, tree, selector)?;
        let function = test.function.local_name();
        if test.marker.is_some() {
            return Err(MutationError::AlreadyQuarantined {
                file: path.to_path_buf(),
                qualified_name: function,
            });
        }

        let mut edit = FileEdit::new(tree);

        let imports_added = imports::missing_imports(tree, &self.grammar);
        if !imports_added.is_empty() {
            let offset = imports::insertion_offset(tree);
            let text = imports::render_imports(tree, offset, &imports_added);
            edit.insert(EditKind::InsertImport, offset, text);
        }

        let start = test.function.definition_start;
        let line_start = tree.line_start(start);
        let indent = &tree.text()[line_start..start];
        if !is_indent(indent) {
            return Err(MutationError::InvalidTarget {
                target: format!("{}::{function}", path.display()),
                message: "definition does not start its own line".to_string(),
            });
        }
        let decorator = self
            .grammar
            .render_decorator(indent, tree.newline(), reason, ticket);
        edit.insert(EditKind::InsertDecorator, line_start, decorator);

        let text = edit.render(path)?;
        self.verify(path, &text, selector, TestStatus::Quarantined)?;
        Ok(PlannedEdit {
            text,
            function,
            imports_added,
        })
    }

    /// Compute the de-quarantined text without touching the filesystem.
    pub fn plan_remove(
        &self,
        path: &Path,
        tree: &SourceTree,
        selector: &FunctionSelector,
    ) -> Result<PlannedEdit, MutationError> {
        let test = self.resolve(path, tree, selector)?;
        let function = test.function.local_name();
        if test.marker.is_none() {
            return Err(MutationError::NoMarkerFound {
                file: path.to_path_buf(),
                qualified_name: function,
            });
        }

        // a function can carry more than one marker; all of them go
        let mut edit = FileEdit::new(tree);
        for marker in test
            .function
            .decorators
            .iter()
            .filter_map(|d| self.grammar.match_decorator(d))
        {
            edit.delete(EditKind::RemoveDecorator, removal_span(tree, marker.span));
        }
        let text = edit.render(path)?;
        self.verify(path, &text, selector, TestStatus::Active)?;
        Ok(PlannedEdit {
            text,
            function,
            imports_added: Vec::new(),
        })
    }

    fn resolve(
        &self,
        path: &Path,
        tree: &SourceTree,
        selector: &FunctionSelector,
    ) -> Result<ClassifiedTest, MutationError> {
        let mut matches: Vec<ClassifiedTest> = classify_tree(tree, &self.grammar)
            .into_iter()
            .filter(|t| selector.matches(&t.function))
            .collect();
        match matches.len() {
            0 => Err(MutationError::NotFound {
                file: path.to_path_buf(),
                function: selector.to_string(),
            }),
            1 => Ok(matches.remove(0)),
            _ => Err(MutationError::Ambiguous {
                file: path.to_path_buf(),
                function: selector.to_string(),
                candidates: matches.iter().map(|t| t.function.local_name()).collect(),
            }),
        }
    }

    /// Re-parse the rendered text and check the target now has `expected` status.
    fn verify(
        &self,
        path: &Path,
        text: &str,
        selector: &FunctionSelector,
        expected: TestStatus,
    ) -> Result<(), MutationError> {
        let failed = || MutationError::VerificationFailed {
            file: path.to_path_buf(),
            qualified_name: selector.to_string(),
            expected: expected.to_string(),
        };
        let tree = SourceTree::parse(text).map_err(|e| {
            debug!(file = %path.display(), error = %e, "edited text does not parse");
            failed()
        })?;
        match self.resolve(path, &tree, selector) {
            Ok(test) if test.status() == expected => Ok(()),
            _ => Err(failed()),
        }
    }

    /// Write `text` atomically, then run the formatter if enabled.
    /// Returns whether the formatter ran successfully.
    fn commit(&self, file: &Path, text: &str) -> Result<bool, MutationError> {
        write_atomic(file, text)?;
        if !self.format_after_write {
            return Ok(false);
        }
        match self.formatter.format(file) {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!(file = %file.display(), error = %e, "formatter failed, keeping unformatted edit");
                Ok(false)
            }
        }
    }
}

fn read_source(file: &Path) -> Result<SourceTree, MutationError> {
    let bytes = std::fs::read(file).map_err(|source| MutationError::Io {
        path: file.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|_| ParseError::InvalidUtf8 {
        path: file.to_path_buf(),
    })?;
    SourceTree::parse(text).map_err(|e| MutationError::Parse(e.with_path(file)))
}

fn write_atomic(path: &Path, text: &str) -> Result<(), MutationError> {
    let io = |source: std::io::Error| MutationError::Io {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(io)?;
    tmp.write_all(text.as_bytes()).map_err(io)?;
    tmp.as_file().sync_all().map_err(io)?;
    if let Ok(meta) = std::fs::metadata(path) {
        tmp.as_file().set_permissions(meta.permissions()).map_err(io)?;
    }
    tmp.persist(path).map_err(|e| io(e.error))?;
    Ok(())
}

fn is_indent(prefix: &str) -> bool {
    prefix.chars().all(|c| c == ' ' || c == '\t')
}

/// Widen a decorator span to whole lines when it owns them, so removal
/// leaves no blank or whitespace-only line behind. A trailing comment on
/// the closing line goes with the decorator.
fn removal_span(tree: &SourceTree, span: ByteSpan) -> ByteSpan {
    let text = tree.text();
    let line_start = tree.line_start(span.start);
    let start = if is_indent(&text[line_start..span.start]) {
        line_start
    } else {
        span.start
    };
    let line_end = tree.line_end(span.end);
    let rest = text[span.end..line_end].trim();
    let end = if start == line_start && (rest.is_empty() || rest.starts_with('#')) {
        line_end
    } else {
        span.end
    };
    ByteSpan::new(start, end)
}
