//! Test discovery: pytest-style test functions and their decorator lists.
//!
//! Collects `test_*` functions at module scope and inside `Test*` classes
//! (nested `Test*` classes included), in source order. Function bodies are
//! never entered, so helpers and closures defined inside tests are ignored.

use quarantine_core::constants::{TEST_CLASS_PREFIX, TEST_FUNCTION_PREFIX};
use serde::{Deserialize, Serialize};
use quarantine_core::types::{SmallVec, SmallVec2};
use tree_sitter::Node;

use crate::parsers::{ByteSpan, DecoratorArgument, DecoratorInfo, Range, SourceTree};

/// A discovered test function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionNode {
    pub name: String,
    /// Enclosing test classes, outermost first.
    pub class_path: SmallVec2<String>,
    /// 1-based line of the `def` (or `async def`) keyword.
    pub line: u32,
    pub is_async: bool,
    /// Decorators in original order.
    pub decorators: Vec<DecoratorInfo>,
    /// Byte offset of the first decorator's `@`, or of the `def` when undecorated.
    pub definition_start: usize,
    /// Span of the function definition itself, decorators excluded.
    pub def_span: ByteSpan,
}

impl FunctionNode {
    /// Name local to the file: `Class::Inner::test_x` or `test_x`.
    pub fn local_name(&self) -> String {
        if self.class_path.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.class_path.join("::"), self.name)
        }
    }
}

/// Enumerate test functions in source order.
pub fn discover(tree: &SourceTree) -> Vec<FunctionNode> {
    let mut out = Vec::new();
    let mut class_path = Vec::new();
    collect_block(tree, tree.root(), &mut class_path, &mut out);
    out
}

fn collect_block(
    tree: &SourceTree,
    block: Node,
    class_path: &mut Vec<String>,
    out: &mut Vec<FunctionNode>,
) {
    let mut cursor = block.walk();
    let children: Vec<Node> = block.named_children(&mut cursor).collect();

    for child in children {
        let (definition, decorated) = match child.kind() {
            "decorated_definition" => match child.child_by_field_name("definition") {
                Some(def) => (def, Some(child)),
                None => continue,
            },
            "function_definition" | "class_definition" => (child, None),
            _ => continue,
        };

        let Some(name) = definition
            .child_by_field_name("name")
            .map(|n| tree.node_text(&n).to_string())
        else {
            continue;
        };

        match definition.kind() {
            "function_definition" if name.starts_with(TEST_FUNCTION_PREFIX) => {
                let decorators = decorated
                    .map(|d| extract_decorators(tree, d))
                    .unwrap_or_default();
                out.push(FunctionNode {
                    name,
                    class_path: class_path.iter().cloned().collect(),
                    line: definition.start_position().row as u32 + 1,
                    is_async: tree.node_text(&definition).starts_with("async"),
                    decorators,
                    definition_start: decorated.unwrap_or(definition).start_byte(),
                    def_span: ByteSpan::new(definition.start_byte(), definition.end_byte()),
                });
            }
            "class_definition" if name.starts_with(TEST_CLASS_PREFIX) => {
                if let Some(body) = definition.child_by_field_name("body") {
                    class_path.push(name);
                    collect_block(tree, body, class_path, out);
                    class_path.pop();
                }
            }
            _ => {}
        }
    }
}

/// Decorators of a `decorated_definition`, in order.
pub fn extract_decorators(tree: &SourceTree, decorated: Node) -> Vec<DecoratorInfo> {
    let mut cursor = decorated.walk();
    decorated
        .named_children(&mut cursor)
        .filter(|n| n.kind() == "decorator")
        .map(|n| decorator_info(tree, n))
        .collect()
}

fn decorator_info(tree: &SourceTree, node: Node) -> DecoratorInfo {
    let text = tree.node_text(&node);
    let raw_text = text.trim_end().to_string();
    let span = ByteSpan::new(node.start_byte(), node.start_byte() + raw_text.len());

    let expression = {
        let mut cursor = node.walk();
        let found = node
            .named_children(&mut cursor)
            .find(|n| n.kind() != "comment");
        found
    };

    let (name, is_call, arguments) = match expression {
        Some(expr) if expr.kind() == "call" => {
            let name = expr
                .child_by_field_name("function")
                .map(|f| compact(tree.node_text(&f)))
                .unwrap_or_default();
            let arguments = expr
                .child_by_field_name("arguments")
                .map(|args| call_arguments(tree, args))
                .unwrap_or_default();
            (name, true, arguments)
        }
        Some(expr) => (compact(tree.node_text(&expr)), false, SmallVec::new()),
        None => (String::new(), false, SmallVec::new()),
    };

    DecoratorInfo {
        name,
        is_call,
        arguments,
        raw_text,
        range: Range::from_ts_node(&node),
        span,
    }
}

fn call_arguments(tree: &SourceTree, args: Node) -> SmallVec2<DecoratorArgument> {
    let mut cursor = args.walk();
    let mut out = SmallVec::new();
    for arg in args.named_children(&mut cursor) {
        match arg.kind() {
            "comment" => {}
            "keyword_argument" => {
                let key = arg
                    .child_by_field_name("name")
                    .map(|k| tree.node_text(&k).to_string());
                if let Some(value) = arg.child_by_field_name("value") {
                    out.push(argument(tree, key, value));
                }
            }
            _ => out.push(argument(tree, None, arg)),
        }
    }
    out
}

fn argument(tree: &SourceTree, key: Option<String>, value: Node) -> DecoratorArgument {
    let string_parts = match value.kind() {
        "string" => std::iter::once(tree.node_text(&value).to_string()).collect(),
        "concatenated_string" => {
            let mut cursor = value.walk();
            let parts = value
                .named_children(&mut cursor)
                .filter(|n| n.kind() == "string")
                .map(|n| tree.node_text(&n).to_string())
                .collect();
            parts
        }
        _ => SmallVec::new(),
    };
    DecoratorArgument {
        key,
        value: tree.node_text(&value).to_string(),
        string_parts,
    }
}

fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(src: &str) -> Vec<String> {
        let tree = SourceTree::parse(src).unwrap();
        discover(&tree).iter().map(|f| f.local_name()).collect()
    }

    #[test]
    fn discovers_module_and_class_tests_in_order() {
        let src = "\
def helper():
    pass

def test_one():
    def test_inner():
        pass

class TestGroup:
    def test_two(self):
        pass

    def setup_method(self):
        pass

    class TestNested:
        async def test_three(self):
            pass

class Helper:
    def test_not_collected(self):
        pass

@pytest.mark.smoke
def test_four():
    pass
";
        assert_eq!(
            names(src),
            vec![
                "test_one",
                "TestGroup::test_two",
                "TestGroup::TestNested::test_three",
                "test_four"
            ]
        );
    }

    #[test]
    fn decorators_keep_order_and_arguments() {
        let src = "\
@pytest.mark.polarion(\"CNV-1\")
@pytest.mark.xfail(
    reason=f\"{QUARANTINED}: flaky, \" \"CNV-2\",
    run=False,
)
@slow
def test_x():
    pass
";
        let tree = SourceTree::parse(src).unwrap();
        let found = discover(&tree);
        assert_eq!(found.len(), 1);
        let f = &found[0];
        assert_eq!(f.line, 7);
        assert_eq!(f.definition_start, 0);
        let names: Vec<&str> = f.decorators.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["pytest.mark.polarion", "pytest.mark.xfail", "slow"]);
        assert!(!f.decorators[2].is_call);

        let xfail = &f.decorators[1];
        assert_eq!(xfail.range.start.line, 1);
        assert!(xfail.raw_text.ends_with(')'));
        assert_eq!(xfail.keyword("run").map(|a| a.value.as_str()), Some("False"));
        assert_eq!(xfail.keyword("reason").map(|a| a.string_parts.len()), Some(2));
        assert_eq!(&src[xfail.span.start..xfail.span.end], xfail.raw_text);
    }

    #[test]
    fn async_flag_and_line() {
        let src = "import asyncio\n\n\nasync def test_async():\n    await asyncio.sleep(0)\n";
        let tree = SourceTree::parse(src).unwrap();
        let found = discover(&tree);
        assert!(found[0].is_async);
        assert_eq!(found[0].line, 4);
    }
}
