use tree_sitter::Node;

use crate::model::{Binding, ImportRecord, ImportStyle, Imported};
use crate::util::{trim_quotes, txt};

/// Convert an `import_statement` into an [`ImportRecord`].
///
/// Type-only imports are erased at runtime and yield `None`.
pub(super) fn extract_import(node: Node, src: &[u8]) -> Option<ImportRecord> {
    if has_type_keyword(node) {
        return None;
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "import_require_clause" {
            return extract_import_require(child, src);
        }
    }

    let source = trim_quotes(txt(node.child_by_field_name("source")?, src)).to_string();
    let mut bindings = Vec::new();

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "import_clause" {
            collect_clause_bindings(child, src, &mut bindings);
        }
    }

    Some(ImportRecord {
        style: ImportStyle::Import,
        source,
        bindings,
    })
}

/// `import x = require('y')` behaves like a default require.
fn extract_import_require(clause: Node, src: &[u8]) -> Option<ImportRecord> {
    let source = trim_quotes(txt(clause.child_by_field_name("source")?, src)).to_string();
    let mut cursor = clause.walk();
    let local = clause
        .named_children(&mut cursor)
        .find(|c| c.kind() == "identifier")
        .map(|c| txt(c, src).to_string())?;

    Some(ImportRecord {
        style: ImportStyle::Require,
        source,
        bindings: vec![Binding {
            imported: Imported::Default,
            local,
        }],
    })
}

fn collect_clause_bindings(clause: Node, src: &[u8], bindings: &mut Vec<Binding>) {
    let mut cursor = clause.walk();
    for child in clause.named_children(&mut cursor) {
        match child.kind() {
            "identifier" => bindings.push(Binding {
                imported: Imported::Default,
                local: txt(child, src).to_string(),
            }),
            "namespace_import" => {
                if let Some(ident) = child.named_child(0) {
                    bindings.push(Binding {
                        imported: Imported::Namespace,
                        local: txt(ident, src).to_string(),
                    });
                }
            }
            "named_imports" => {
                let mut inner = child.walk();
                for spec in child.named_children(&mut inner) {
                    if spec.kind() != "import_specifier" || has_type_keyword(spec) {
                        continue;
                    }
                    let Some(name) = spec.child_by_field_name("name") else {
                        continue;
                    };
                    let imported = trim_quotes(txt(name, src));
                    let local = spec
                        .child_by_field_name("alias")
                        .map_or(imported, |a| txt(a, src));
                    bindings.push(Binding::named(imported, local));
                }
            }
            _ => {}
        }
    }
}

/// Convert a `const x = require('y')` declarator, if it is one.
pub(super) fn extract_require(declarator: Node, src: &[u8]) -> Option<ImportRecord> {
    let value = declarator.child_by_field_name("value")?;
    if value.kind() != "call_expression" {
        return None;
    }
    let callee = value.child_by_field_name("function")?;
    if callee.kind() != "identifier" || txt(callee, src) != "require" {
        return None;
    }
    let first_arg = value
        .child_by_field_name("arguments")
        .and_then(|args| args.named_child(0))
        .filter(|arg| arg.kind() == "string")?;
    let source = trim_quotes(txt(first_arg, src)).to_string();

    let pattern = declarator.child_by_field_name("name")?;
    let bindings = match pattern.kind() {
        "identifier" => vec![Binding {
            imported: Imported::Default,
            local: txt(pattern, src).to_string(),
        }],
        "object_pattern" => destructured_bindings(pattern, src),
        _ => return None,
    };

    Some(ImportRecord {
        style: ImportStyle::Require,
        source,
        bindings,
    })
}

/// `{ a, b: c }` → `a as a`, `b as c`.
fn destructured_bindings(pattern: Node, src: &[u8]) -> Vec<Binding> {
    let mut bindings = Vec::new();
    let mut cursor = pattern.walk();
    for prop in pattern.named_children(&mut cursor) {
        match prop.kind() {
            "shorthand_property_identifier_pattern" => {
                let name = txt(prop, src);
                bindings.push(Binding::named(name, name));
            }
            "pair_pattern" => {
                let key = prop.child_by_field_name("key").map(|k| trim_quotes(txt(k, src)));
                let value = prop
                    .child_by_field_name("value")
                    .filter(|v| v.kind() == "identifier")
                    .map(|v| txt(v, src));
                if let (Some(key), Some(value)) = (key, value) {
                    bindings.push(Binding::named(key, value));
                }
            }
            _ => {}
        }
    }
    bindings
}

pub(super) fn has_type_keyword(node: Node) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|c| !c.is_named() && matches!(c.kind(), "type" | "typeof"));
    found
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

    fn import_of(src: &str) -> Option<ImportRecord> {
        let tree = parse_ts(src.as_bytes());
        let stmt = tree.root_node().named_child(0).unwrap();
        extract_import(stmt, src.as_bytes())
    }

    fn require_of(src: &str) -> Option<ImportRecord> {
        let tree = parse_ts(src.as_bytes());
        let decl = tree.root_node().named_child(0).unwrap();
        let declarator = decl.named_child(0).unwrap();
        extract_require(declarator, src.as_bytes())
    }

    #[test]
    fn default_and_named_specifiers() {
        let rec = import_of("import axios, { get, post as send } from 'axios';").unwrap();
        assert_eq!(rec.style, ImportStyle::Import);
        assert_eq!(rec.source, "axios");
        assert_eq!(
            rec.bindings,
            vec![
                Binding::named("default", "axios"),
                Binding::named("get", "get"),
                Binding::named("post", "send"),
            ]
        );
    }

    #[test]
    fn namespace_import() {
        let rec = import_of("import * as path from 'path';").unwrap();
        assert_eq!(
            rec.bindings,
            vec![Binding {
                imported: Imported::Namespace,
                local: "path".into()
            }]
        );
    }

    #[test]
    fn side_effect_import_has_no_bindings() {
        let rec = import_of("import 'reflect-metadata';").unwrap();
        assert_eq!(rec.source, "reflect-metadata");
        assert!(rec.bindings.is_empty());
    }

    #[test]
    fn type_only_imports_are_skipped() {
        assert!(import_of("import type { User } from './user';").is_none());
        let rec = import_of("import { type User, load } from './user';").unwrap();
        assert_eq!(rec.bindings, vec![Binding::named("load", "load")]);
    }

    #[test]
    fn import_equals_require() {
        let rec = import_of("import fs = require('fs');").unwrap();
        assert_eq!(rec.style, ImportStyle::Require);
        assert_eq!(rec.source, "fs");
        assert_eq!(rec.bindings, vec![Binding::named("default", "fs")]);
    }

    #[test]
    fn require_plain_binding_is_default() {
        let rec = require_of("const lodash = require('lodash');").unwrap();
        assert_eq!(rec.style, ImportStyle::Require);
        assert_eq!(rec.bindings, vec![Binding::named("default", "lodash")]);
    }

    #[test]
    fn require_destructuring_becomes_named_bindings() {
        let rec = require_of("const { readFile, writeFile: write } = require('fs/promises');").unwrap();
        assert_eq!(rec.source, "fs/promises");
        assert_eq!(
            rec.bindings,
            vec![
                Binding::named("readFile", "readFile"),
                Binding::named("writeFile", "write"),
            ]
        );
    }

    #[test]
    fn other_calls_are_not_requires() {
        assert!(require_of("const x = load('lodash');").is_none());
        assert!(require_of("const x = require(name);").is_none());
        assert!(require_of("const x = 5;").is_none());
    }
}
