use std::path::Path;

use tree_sitter::{Node, Parser, Tree};

use crate::error::SmokeError;
use crate::lang::Dialect;

/// A source file parsed into a syntax tree.
pub struct ParsedFile {
    pub dialect: Dialect,
    pub tree: Tree,
    pub source: String,
}

/// Read and parse a source file, rejecting files with syntax errors.
pub fn parse_file(path: &Path) -> Result<ParsedFile, SmokeError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let dialect = Dialect::from_extension(ext)?;

    let source = std::fs::read_to_string(path).map_err(|e| SmokeError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let tree = parse_source(&source, dialect, &path.display().to_string())?;

    Ok(ParsedFile {
        dialect,
        tree,
        source,
    })
}

/// Parse in-memory source text with the given dialect.
///
/// `label` only shows up in error messages.
pub fn parse_source(source: &str, dialect: Dialect, label: &str) -> Result<Tree, SmokeError> {
    let mut parser = Parser::new();
    parser
        .set_language(&dialect.tree_sitter_language())
        .map_err(|e| SmokeError::ParseFailed(e.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| SmokeError::ParseFailed(label.to_string()))?;

    if let Some(bad) = first_error(tree.root_node()) {
        let pos = bad.start_position();
        return Err(SmokeError::Syntax {
            path: label.to_string(),
            line: pos.row + 1,
            column: pos.column + 1,
        });
    }

    Ok(tree)
}

/// Depth-first search for the first `ERROR` or `MISSING` node.
fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find_map(first_error);
    found
}
