//! Classification: active vs quarantined, marker metadata, team and
//! qualified name. Pure functions over a parsed tree; no shared state.

pub mod naming;
pub mod team;
pub mod types;

pub use naming::{module_path, normalize_test_name, qualified_name};
pub use team::TeamResolver;
pub use types::{ClassifiedTest, TestRecord, TestStatus};

use crate::discovery::{self, FunctionNode};
use crate::marker::{Marker, MarkerGrammar};
use crate::parsers::SourceTree;

/// The first decorator matching the marker grammar, if any.
pub fn find_marker(function: &FunctionNode, grammar: &MarkerGrammar) -> Option<Marker> {
    function
        .decorators
        .iter()
        .find_map(|d| grammar.match_decorator(d))
}

/// Discover and classify every test in a parsed file.
pub fn classify_tree(tree: &SourceTree, grammar: &MarkerGrammar) -> Vec<ClassifiedTest> {
    discovery::discover(tree)
        .into_iter()
        .map(|function| {
            let marker = find_marker(&function, grammar);
            ClassifiedTest { function, marker }
        })
        .collect()
}
