use tree_sitter::Node;

use crate::model::TestBlock;
use crate::util::{trim_quotes, txt};

/// Read the `describe` / `it` / `test` tree out of a parsed test module.
///
/// Only statement-level calls count; `jest.mock(...)` and other calls are
/// skipped.
pub fn extract_test_blocks(root: Node, src: &[u8]) -> Vec<TestBlock> {
    blocks_in(root, src)
}

/// Number of `it` / `test` leaves under `blocks`.
pub fn count_tests(blocks: &[TestBlock]) -> usize {
    blocks
        .iter()
        .map(|b| match b.kind.as_str() {
            "it" | "test" => 1,
            _ => count_tests(&b.children),
        })
        .sum()
}

/// Blocks among the statements directly under `scope`, the program or a
/// callback body.
fn blocks_in(scope: Node, src: &[u8]) -> Vec<TestBlock> {
    let mut cursor = scope.walk();
    let blocks = scope
        .named_children(&mut cursor)
        .filter_map(statement_call)
        .filter_map(|call| test_block(call, src))
        .collect();
    blocks
}

fn statement_call(stmt: Node<'_>) -> Option<Node<'_>> {
    if stmt.kind() != "expression_statement" {
        return None;
    }
    stmt.named_child(0).filter(|e| e.kind() == "call_expression")
}

fn test_block(call: Node, src: &[u8]) -> Option<TestBlock> {
    let callee = call
        .child_by_field_name("function")
        .filter(|f| f.kind() == "identifier")?;
    let kind = txt(callee, src);
    if !matches!(kind, "describe" | "it" | "test") {
        return None;
    }

    let args = call.child_by_field_name("arguments")?;
    let children = match kind {
        "describe" => callback_body(args)
            .map(|body| blocks_in(body, src))
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    Some(TestBlock {
        kind: kind.to_string(),
        name: label(args, src),
        children,
    })
}

/// First argument, when it is a string literal.
fn label(args: Node, src: &[u8]) -> String {
    args.named_child(0)
        .filter(|a| matches!(a.kind(), "string" | "template_string"))
        .map(|a| trim_quotes(txt(a, src)).to_string())
        .unwrap_or_default()
}

/// Statement block of the callback passed to `describe`.
fn callback_body(args: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = args.walk();
    let body = args
        .named_children(&mut cursor)
        .filter(|a| matches!(a.kind(), "arrow_function" | "function_expression" | "function"))
        .find_map(|f| f.child_by_field_name("body"))
        .filter(|b| b.kind() == "statement_block");
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ts(src: &[u8]) -> tree_sitter::Tree {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
            .unwrap();
        parser.parse(src, None).unwrap()
    }

    #[test]
    fn nested_describe_and_it_are_read_back() {
        let src = br#"
jest.mock('axios');
describe('math.ts', () => {
  describe('add', () => {
    it('does not throw error', () => {
      expect(() => add(1, 1)).not.toThrow();
    });
    it('does not throw error, param 2 omitted', () => {});
  });
  describe('sub', () => {
    it('does not throw error', () => {});
  });
});
"#;
        let tree = parse_ts(src);
        let blocks = extract_test_blocks(tree.root_node(), src);

        assert_eq!(blocks.len(), 1, "jest.mock is not a test block");
        assert_eq!(blocks[0].name, "math.ts");
        assert_eq!(blocks[0].children.len(), 2);
        assert_eq!(blocks[0].children[0].name, "add");
        assert_eq!(
            blocks[0].children[0].children[1].name,
            "does not throw error, param 2 omitted"
        );
        assert_eq!(count_tests(&blocks), 3);
    }

    #[test]
    fn calls_inside_test_bodies_are_not_blocks() {
        let src = br#"
describe('a.ts', function () {
  it('runs', () => {
    describe('not a suite here', () => {});
  });
  helper();
  test(`template label`, () => {});
});
"#;
        let tree = parse_ts(src);
        let blocks = extract_test_blocks(tree.root_node(), src);
        let outer = &blocks[0];
        assert_eq!(outer.children.len(), 2);
        assert!(outer.children[0].children.is_empty());
        assert_eq!(outer.children[1].kind, "test");
        assert_eq!(outer.children[1].name, "template label");
        assert_eq!(count_tests(&blocks), 2);
    }

    #[test]
    fn empty_outer_suite_has_no_tests() {
        let src = b"describe('empty.ts', () => {});";
        let tree = parse_ts(src);
        let blocks = extract_test_blocks(tree.root_node(), src);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].children.is_empty());
        assert_eq!(count_tests(&blocks), 0);
    }
}
