mod imports;
mod params;
mod tests_block;
mod types;

use std::collections::HashMap;

use tree_sitter::Node;

use crate::error::SmokeError;
use crate::model::{ExportedFunction, Extraction};
use crate::placeholder::PlaceholderTable;
use crate::util::txt;

pub use tests_block::{count_tests, extract_test_blocks};

/// Name given to an anonymous default export.
pub const DEFAULT_EXPORT_NAME: &str = "defaultExport";

/// A function-like top-level declaration, classified once from the tree.
#[derive(Clone, Copy)]
enum FunctionDecl<'t> {
    /// `function name(...) {}`
    Declared { name: &'t str, node: Node<'t> },
    /// `const name = (...) => ...` or `const name = function (...) {}`
    Bound { name: &'t str, value: Node<'t> },
    /// `export default function (...) {}` or `export default (...) => ...`
    Anonymous(Node<'t>),
}

impl<'t> FunctionDecl<'t> {
    fn name(self) -> &'t str {
        match self {
            Self::Declared { name, .. } | Self::Bound { name, .. } => name,
            Self::Anonymous(_) => DEFAULT_EXPORT_NAME,
        }
    }

    /// Node carrying the `parameters` field.
    fn callable(self) -> Node<'t> {
        match self {
            Self::Declared { node, .. } => node,
            Self::Bound { value, .. } => value,
            Self::Anonymous(node) => node,
        }
    }
}

/// Single pass over the module's top-level statements.
struct Extractor<'t, 'p> {
    src: &'t [u8],
    table: &'p mut PlaceholderTable,
    /// Function-like declarations seen so far, by bound name.
    symbols: HashMap<&'t str, FunctionDecl<'t>>,
    out: Extraction,
}

/// Walk top-level children of the AST root and collect imports and
/// exported functions, in encounter order.
///
/// A default export that names an identifier must refer to a function-like
/// declaration earlier in the module; anything else is
/// [`SmokeError::UnresolvedDefaultExport`].
pub fn extract_module<'t>(
    root: Node<'t>,
    src: &'t [u8],
    table: &mut PlaceholderTable,
) -> Result<Extraction, SmokeError> {
    let mut ex = Extractor {
        src,
        table,
        symbols: HashMap::new(),
        out: Extraction::default(),
    };

    let mut cursor = root.walk();
    for node in root.named_children(&mut cursor) {
        match node.kind() {
            "import_statement" => {
                if let Some(record) = imports::extract_import(node, src) {
                    ex.out.imports.push(record);
                }
            }
            "function_declaration" | "generator_function_declaration" => {
                ex.remember_declared(node);
            }
            "lexical_declaration" | "variable_declaration" => {
                ex.process_variables(node, false);
            }
            "export_statement" => {
                ex.process_export(node)?;
            }
            _ => {}
        }
    }

    Ok(ex.out)
}

impl<'t> Extractor<'t, '_> {
    fn remember_declared(&mut self, node: Node<'t>) -> Option<FunctionDecl<'t>> {
        let name = txt(node.child_by_field_name("name")?, self.src);
        let decl = FunctionDecl::Declared { name, node };
        self.symbols.insert(name, decl);
        Some(decl)
    }

    // ── const/let/var ──

    fn process_variables(&mut self, node: Node<'t>, exported: bool) {
        let mut cursor = node.walk();
        for declarator in node.named_children(&mut cursor) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }

            if let Some(record) = imports::extract_require(declarator, self.src) {
                self.out.imports.push(record);
                continue;
            }

            let Some(decl) = bound_function(declarator, self.src) else {
                continue;
            };
            self.symbols.insert(decl.name(), decl);
            if exported {
                self.push_function(decl, decl.name(), false);
            }
        }
    }

    // ── Exports ──

    fn process_export(&mut self, node: Node<'t>) -> Result<(), SmokeError> {
        // Re-exports from other modules and `export type { .. }` carry no
        // local function bodies.
        if node.child_by_field_name("source").is_some() || imports::has_type_keyword(node) {
            return Ok(());
        }

        let is_default = has_default_keyword(node);

        if let Some(decl) = node.child_by_field_name("declaration") {
            match decl.kind() {
                "function_declaration" | "generator_function_declaration" => {
                    if let Some(f) = self.remember_declared(decl) {
                        self.push_function(f, f.name(), is_default);
                    }
                }
                "lexical_declaration" | "variable_declaration" => {
                    self.process_variables(decl, true);
                }
                _ => {}
            }
            return Ok(());
        }

        if is_default {
            if let Some(value) = node.child_by_field_name("value") {
                self.process_default_value(value)?;
            }
            return Ok(());
        }

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "export_clause" {
                self.process_export_clause(child)?;
            }
        }
        Ok(())
    }

    fn process_default_value(&mut self, value: Node<'t>) -> Result<(), SmokeError> {
        match value.kind() {
            "identifier" => {
                let name = txt(value, self.src);
                let decl = self.resolve(name)?;
                self.push_function(decl, name, true);
            }
            "arrow_function" | "function_expression" | "function" => {
                let decl = match value.child_by_field_name("name") {
                    Some(name) => FunctionDecl::Declared {
                        name: txt(name, self.src),
                        node: value,
                    },
                    None => FunctionDecl::Anonymous(value),
                };
                self.push_function(decl, decl.name(), true);
            }
            _ => {}
        }
        Ok(())
    }

    /// `export { a, b as c, d as default }` for locally declared functions.
    ///
    /// Names that are not function-like (constants, classes) are skipped,
    /// except as the default export, which must resolve.
    fn process_export_clause(&mut self, clause: Node<'t>) -> Result<(), SmokeError> {
        let mut cursor = clause.walk();
        for spec in clause.named_children(&mut cursor) {
            if spec.kind() != "export_specifier" || imports::has_type_keyword(spec) {
                continue;
            }
            let Some(local) = spec.child_by_field_name("name").map(|n| txt(n, self.src)) else {
                continue;
            };
            let exported = spec
                .child_by_field_name("alias")
                .map_or(local, |a| txt(a, self.src));

            if exported == "default" {
                let decl = self.resolve(local)?;
                self.push_function(decl, local, true);
            } else if let Some(decl) = self.symbols.get(local).copied() {
                self.push_function(decl, exported, false);
            }
        }
        Ok(())
    }

    fn resolve(&self, name: &str) -> Result<FunctionDecl<'t>, SmokeError> {
        self.symbols
            .get(name)
            .copied()
            .ok_or_else(|| SmokeError::UnresolvedDefaultExport {
                name: name.to_string(),
            })
    }

    fn push_function(&mut self, decl: FunctionDecl<'t>, name: &str, is_default: bool) {
        let callable = decl.callable();
        let params = params::function_params(callable, self.src, self.table);
        self.out.functions.push(ExportedFunction {
            name: name.to_string(),
            params,
            is_default,
            declaration: callable.start_byte(),
        });
    }
}

/// `name = <arrow | function expression>` declarator.
fn bound_function<'t>(declarator: Node<'t>, src: &'t [u8]) -> Option<FunctionDecl<'t>> {
    let name = declarator.child_by_field_name("name")?;
    if name.kind() != "identifier" {
        return None;
    }
    let value = declarator.child_by_field_name("value")?;
    if !matches!(value.kind(), "arrow_function" | "function_expression" | "function") {
        return None;
    }
    Some(FunctionDecl::Bound {
        name: txt(name, src),
        value,
    })
}

fn has_default_keyword(node: Node) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|c| !c.is_named() && c.kind() == "default");
    found
}
