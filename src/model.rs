use crate::placeholder::TypeTag;

/// How an import was written in the source module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStyle {
    /// `import ... from 'x'`
    Import,
    /// `const ... = require('x')`
    Require,
}

/// What a single import binding pulls out of the source module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Imported {
    Default,
    /// `* as ns`
    Namespace,
    Named(String),
}

/// One local name bound by an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub imported: Imported,
    pub local: String,
}

impl Binding {
    pub fn named(imported: &str, local: &str) -> Self {
        let imported = if imported == "default" {
            Imported::Default
        } else {
            Imported::Named(imported.to_string())
        };
        Self {
            imported,
            local: local.to_string(),
        }
    }
}

/// A top-level `import` or `require` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    pub style: ImportStyle,
    pub source: String,
    pub bindings: Vec<Binding>,
}

impl ImportRecord {
    /// Default or namespace binding, if any. These get an automatic mock.
    pub fn whole_module_binding(&self) -> Option<&Binding> {
        self.bindings
            .iter()
            .find(|b| matches!(b.imported, Imported::Default | Imported::Namespace))
    }

    /// Named bindings as `(imported, local)` pairs.
    pub fn named_bindings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().filter_map(|b| match &b.imported {
            Imported::Named(name) => Some((name.as_str(), b.local.as_str())),
            _ => None,
        })
    }
}

/// One declared parameter of an exported function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub tag: TypeTag,
    /// Written with `?`.
    pub optional: bool,
    /// Source text of a literal default value (`= 5`).
    pub default: Option<String>,
}

/// An exported function-like binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFunction {
    pub name: String,
    pub params: Vec<ParameterDescriptor>,
    pub is_default: bool,
    /// Start byte of the defining declaration. Two exports of one function
    /// share it.
    pub declaration: usize,
}

/// Everything the renderer needs from one source module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub imports: Vec<ImportRecord>,
    pub functions: Vec<ExportedFunction>,
}

/// Why a generated test case exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Base,
    /// Parameter at `param` (0-based) set to union arm `arm` (0-based, ≥ 1).
    UnionArm { param: usize, arm: usize },
    /// Optional parameter at `param` (0-based) passed as `undefined`.
    Omitted { param: usize },
}

impl Variant {
    /// `it(...)` label. Positions are printed 1-based.
    pub fn label(self) -> String {
        match self {
            Self::Base => "does not throw error".to_string(),
            Self::UnionArm { param, arm } => format!(
                "does not throw error, param {} union arm {}",
                param + 1,
                arm + 1
            ),
            Self::Omitted { param } => {
                format!("does not throw error, param {} omitted", param + 1)
            }
        }
    }
}

/// One call of an exported function with concrete argument literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub function: String,
    pub args: Vec<String>,
    pub variant: Variant,
}

/// A `describe` / `it` / `test` block read back from a test module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestBlock {
    pub kind: String,
    pub name: String,
    pub children: Vec<TestBlock>,
}

impl Extraction {
    /// JSON view of the extracted records for debug logging.
    pub fn to_json(&self) -> serde_json::Value {
        let imports: Vec<serde_json::Value> = self
            .imports
            .iter()
            .map(|im| {
                let bindings: Vec<serde_json::Value> = im
                    .bindings
                    .iter()
                    .map(|b| {
                        let imported = match &b.imported {
                            Imported::Default => "default",
                            Imported::Namespace => "*",
                            Imported::Named(name) => name.as_str(),
                        };
                        serde_json::json!({ "imported": imported, "local": b.local })
                    })
                    .collect();
                let style = match im.style {
                    ImportStyle::Import => "import",
                    ImportStyle::Require => "require",
                };
                serde_json::json!({
                    "style": style,
                    "from": im.source,
                    "bindings": bindings,
                })
            })
            .collect();

        let functions: Vec<serde_json::Value> = self
            .functions
            .iter()
            .map(|f| {
                let params: Vec<serde_json::Value> = f
                    .params
                    .iter()
                    .map(|p| {
                        serde_json::json!({
                            "name": p.name,
                            "type": p.tag.describe(),
                            "optional": p.optional,
                            "default": p.default,
                        })
                    })
                    .collect();
                serde_json::json!({ "name": f.name, "default": f.is_default, "params": params })
            })
            .collect();

        serde_json::json!({ "imports": imports, "functions": functions })
    }
}
