use std::fmt;
use std::path::Path;

use crate::model::{ExportedFunction, Extraction, ImportRecord, ImportStyle, Imported, TestCase, Variant};
use crate::placeholder::{PlaceholderTable, ABSENT};
use crate::util::{file_name, is_relative_specifier, module_stem};

const INDENT: &str = "  ";

/// A rendered Jest test module for one source file.
pub struct TestModule<'a> {
    pub extraction: &'a Extraction,
    pub table: &'a PlaceholderTable,
    /// Outer suite label, the source file name.
    pub suite: String,
    /// Specifier of the module under test, relative to the test file.
    pub subject: String,
    bindings: SubjectBindings,
}

/// Local names the test module binds for the module under test.
#[derive(Debug)]
struct SubjectBindings {
    /// Default import, when the default export is not reachable by name.
    default: Option<String>,
    named: Vec<String>,
    /// Name each exported function is called by, parallel to the functions.
    callees: Vec<String>,
}

impl SubjectBindings {
    fn new(extraction: &Extraction) -> Self {
        let functions = &extraction.functions;
        let mut named: Vec<&ExportedFunction> = Vec::new();
        for func in functions.iter().filter(|f| !f.is_default) {
            if !named.iter().any(|n| n.name == func.name) {
                named.push(func);
            }
        }

        let mut taken: Vec<String> = named.iter().map(|n| n.name.clone()).collect();
        taken.extend(
            extraction
                .imports
                .iter()
                .filter(|im| !is_relative_specifier(&im.source))
                .flat_map(|im| im.bindings.iter().map(|b| b.local.clone())),
        );

        let mut default = None;
        let mut default_callee = None;
        if let Some(func) = functions.iter().find(|f| f.is_default) {
            // Same function exported by name too: the named import reaches it.
            let reached_by_name = named
                .iter()
                .any(|n| n.name == func.name && n.declaration == func.declaration);
            let callee = if reached_by_name {
                func.name.clone()
            } else if taken.contains(&func.name) {
                fresh_name(&format!("{}Default", func.name), &taken)
            } else {
                func.name.clone()
            };
            if !reached_by_name {
                default = Some(callee.clone());
            }
            default_callee = Some(callee);
        }

        let callees = functions
            .iter()
            .map(|f| match (&default_callee, f.is_default) {
                (Some(callee), true) => callee.clone(),
                _ => f.name.clone(),
            })
            .collect();

        Self {
            default,
            named: named.iter().map(|n| n.name.clone()).collect(),
            callees,
        }
    }
}

/// `base`, or `base2`, `base3`, ... whichever is not in `taken`.
fn fresh_name(base: &str, taken: &[String]) -> String {
    if !taken.iter().any(|t| t == base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

impl<'a> TestModule<'a> {
    pub fn new(extraction: &'a Extraction, table: &'a PlaceholderTable, source: &Path) -> Self {
        Self {
            extraction,
            table,
            suite: file_name(source),
            subject: format!("./{}", module_stem(source)),
            bindings: SubjectBindings::new(extraction),
        }
    }

    /// Every test case, grouped by exported function.
    pub fn cases(&self) -> Vec<(&'a ExportedFunction, Vec<TestCase>)> {
        self.extraction
            .functions
            .iter()
            .zip(&self.bindings.callees)
            .map(|(func, callee)| (func, test_cases(func, callee, self.table)))
            .collect()
    }

    /// `import def, { a, b } from './subject';`, or `None` without exports.
    fn subject_import(&self) -> Option<String> {
        if self.extraction.functions.is_empty() {
            return None;
        }

        let mut clause = Vec::new();
        if let Some(default) = &self.bindings.default {
            clause.push(default.clone());
        }
        if !self.bindings.named.is_empty() {
            clause.push(format!("{{ {} }}", self.bindings.named.join(", ")));
        }
        Some(format!(
            "import {} from {};",
            clause.join(", "),
            js_string(&self.subject)
        ))
    }
}

impl fmt::Display for TestModule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cases = self.cases();

        // Without exported functions there is nothing to import or mock.
        if !cases.is_empty() {
            let external: Vec<&ImportRecord> = self
                .extraction
                .imports
                .iter()
                .filter(|im| !is_relative_specifier(&im.source))
                .collect();

            for im in &external {
                writeln!(f, "{}", ImportLine(im))?;
            }
            if let Some(line) = self.subject_import() {
                writeln!(f, "{line}")?;
            }
            writeln!(f)?;

            if !external.is_empty() {
                let mut mocked: Vec<&str> = Vec::new();
                for im in &external {
                    if mocked.contains(&im.source.as_str()) {
                        continue;
                    }
                    mocked.push(&im.source);
                    let same_source: Vec<&ImportRecord> = external
                        .iter()
                        .copied()
                        .filter(|other| other.source == im.source)
                        .collect();
                    write_mock(f, &im.source, &same_source)?;
                }
                writeln!(f)?;
            }
        }

        if cases.is_empty() {
            return writeln!(f, "describe({}, () => {{}});", js_string(&self.suite));
        }

        writeln!(f, "describe({}, () => {{", js_string(&self.suite))?;
        for (i, (func, func_cases)) in cases.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write_function_suite(f, func, func_cases)?;
        }
        writeln!(f, "}});")
    }
}

/// Re-import of an external module with its original bindings.
struct ImportLine<'a>(&'a ImportRecord);

impl fmt::Display for ImportLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ImportLine(im) = self;
        let source = js_string(&im.source);
        let named: Vec<(&str, &str)> = im.named_bindings().collect();
        let default = im
            .bindings
            .iter()
            .find(|b| b.imported == Imported::Default)
            .map(|b| b.local.as_str());
        let namespace = im
            .bindings
            .iter()
            .find(|b| b.imported == Imported::Namespace)
            .map(|b| b.local.as_str());

        match im.style {
            ImportStyle::Import => {
                let mut clause = Vec::new();
                if let Some(local) = default {
                    clause.push(local.to_string());
                }
                if let Some(local) = namespace {
                    clause.push(format!("* as {local}"));
                }
                if !named.is_empty() {
                    let specs: Vec<String> = named
                        .iter()
                        .map(|(imported, local)| aliased(imported, local, " as "))
                        .collect();
                    clause.push(format!("{{ {} }}", specs.join(", ")));
                }
                if clause.is_empty() {
                    write!(f, "import {source};")
                } else {
                    write!(f, "import {} from {source};", clause.join(", "))
                }
            }
            ImportStyle::Require => {
                if let Some(local) = default.or(namespace) {
                    write!(f, "const {local} = require({source});")
                } else if !named.is_empty() {
                    let specs: Vec<String> = named
                        .iter()
                        .map(|(imported, local)| aliased(imported, local, ": "))
                        .collect();
                    write!(f, "const {{ {} }} = require({source});", specs.join(", "))
                } else {
                    write!(f, "require({source});")
                }
            }
        }
    }
}

fn aliased(imported: &str, local: &str, sep: &str) -> String {
    if imported == local {
        imported.to_string()
    } else {
        format!("{imported}{sep}{local}")
    }
}

/// One mock per specifier: automatic when any import of it binds the default
/// or namespace, otherwise a factory that replaces every named export with
/// its own `jest.fn()`.
fn write_mock(f: &mut fmt::Formatter<'_>, specifier: &str, imports: &[&ImportRecord]) -> fmt::Result {
    let source = js_string(specifier);
    if imports.iter().any(|im| im.whole_module_binding().is_some()) {
        return writeln!(f, "jest.mock({source});");
    }

    let mut members: Vec<String> = Vec::new();
    for (imported, _) in imports.iter().flat_map(|im| im.named_bindings()) {
        let member = format!("{imported}: jest.fn()");
        if !members.contains(&member) {
            members.push(member);
        }
    }
    let body = if members.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", members.join(", "))
    };

    writeln!(f, "jest.mock({source}, () => {{")?;
    writeln!(f, "{INDENT}return {body};")?;
    writeln!(f, "}});")
}

fn write_function_suite(
    f: &mut fmt::Formatter<'_>,
    func: &ExportedFunction,
    cases: &[TestCase],
) -> fmt::Result {
    writeln!(f, "{INDENT}describe({}, () => {{", js_string(&func.name))?;
    for (i, case) in cases.iter().enumerate() {
        if i > 0 {
            writeln!(f)?;
        }
        let pad = INDENT.repeat(2);
        writeln!(f, "{pad}it({}, () => {{", js_string(&case.variant.label()))?;
        writeln!(
            f,
            "{pad}{INDENT}expect(() => {}({})).not.toThrow();",
            case.function,
            case.args.join(", ")
        )?;
        writeln!(f, "{pad}}});")?;
    }
    writeln!(f, "{INDENT}}});")
}

/// Expand one exported function into its test cases.
///
/// One base case with every argument at its base placeholder, then one case
/// per extra arm of each union-typed parameter, then one case per optional
/// parameter passed as `undefined`. Each variant changes exactly one
/// argument.
/// `callee` is the local name the test module binds the function to.
pub fn test_cases(func: &ExportedFunction, callee: &str, table: &PlaceholderTable) -> Vec<TestCase> {
    let base: Vec<String> = func
        .params
        .iter()
        .map(|p| table.placeholder_for(&p.tag))
        .collect();

    let case = |args: Vec<String>, variant: Variant| TestCase {
        function: callee.to_string(),
        args,
        variant,
    };

    let mut cases = vec![case(base.clone(), Variant::Base)];

    for (param, p) in func.params.iter().enumerate() {
        if !p.tag.is_union() {
            continue;
        }
        for arm in 1..table.arity(&p.tag) {
            let mut args = base.clone();
            args[param] = table
                .arm(&p.tag, arm)
                .unwrap_or_else(|| ABSENT.to_string());
            cases.push(case(args, Variant::UnionArm { param, arm }));
        }
    }

    for (param, p) in func.params.iter().enumerate() {
        if !p.optional {
            continue;
        }
        let mut args = base.clone();
        args[param] = ABSENT.to_string();
        cases.push(case(args, Variant::Omitted { param }));
    }

    cases
}

/// Single-quoted JavaScript string literal.
fn js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            // Line terminators in JS source, and other control characters.
            '\u{2028}' | '\u{2029}' => out.push_str(&format!("\\u{:04x}", c as u32)),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}
