//! End-to-end generation for one source file.
//!
//! parse → extract → render → self-check → format → write. Nothing is written
//! unless every earlier step succeeded.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::SmokeError;
use crate::extract::{count_tests, extract_module, extract_test_blocks};
use crate::format::Formatter;
use crate::output::TestModule;
use crate::parser::{parse_file, parse_source};
use crate::placeholder::PlaceholderTable;
use crate::util::test_file_path;

/// Where the generated module goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Destination {
    /// `<dir>/<stem>.test.<ext>` next to the source.
    #[default]
    Sibling,
    /// Returned to the caller only.
    Stdout,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub formatter: Formatter,
    pub destination: Destination,
    /// Named type → literal, applied on top of the built-in `Date` mapping.
    pub mappings: Vec<(String, String)>,
    /// Run date, used for `Date` placeholders.
    pub today: NaiveDate,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            formatter: Formatter::default(),
            destination: Destination::default(),
            mappings: Vec::new(),
            today: chrono::Local::now().date_naive(),
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct Generated {
    /// Written test file, `None` for [`Destination::Stdout`].
    pub path: Option<PathBuf>,
    pub text: String,
    pub functions: usize,
    pub tests: usize,
}

/// Parse a `Name=literal` mapping argument.
pub fn parse_mapping(arg: &str) -> Result<(String, String), SmokeError> {
    let Some((name, literal)) = arg.split_once('=') else {
        return Err(SmokeError::InvalidMapping(arg.to_string()));
    };
    let name = name.trim();
    let literal = literal.trim();
    let valid_name = name
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '.');
    if !valid_name || literal.is_empty() {
        return Err(SmokeError::InvalidMapping(arg.to_string()));
    }
    Ok((name.to_string(), literal.to_string()))
}

/// Generate the test module for `path`.
///
/// `Config::default()` uses prettier, writes the sibling file and takes
/// today's date for `Date` placeholders.
pub fn run(path: &Path, config: &Config) -> Result<Generated, SmokeError> {
    let parsed = parse_file(path)?;
    tracing::debug!(
        path = %path.display(),
        dialect = parsed.dialect.display_name(),
        "parsed"
    );

    let mut table = PlaceholderTable::new(config.today);
    for (name, literal) in &config.mappings {
        table.map_named(name.as_str(), literal.as_str());
    }

    let extraction = extract_module(
        parsed.tree.root_node(),
        parsed.source.as_bytes(),
        &mut table,
    )?;
    tracing::debug!(
        extraction = %extraction.to_json(),
        composite_sites = table.site_count(),
        "extracted"
    );

    let module = TestModule::new(&extraction, &table, path);
    let expected: usize = module.cases().iter().map(|(_, cases)| cases.len()).sum();
    let rendered = module.to_string();

    let tests = self_check(&rendered, parsed.dialect, expected)?;
    let text = config.formatter.format(&rendered, parsed.dialect)?;

    let written = match config.destination {
        Destination::Stdout => None,
        Destination::Sibling => {
            let out = test_file_path(path);
            std::fs::write(&out, &text).map_err(|e| SmokeError::Io {
                path: out.display().to_string(),
                source: e,
            })?;
            tracing::info!(
                path = %out.display(),
                functions = extraction.functions.len(),
                tests,
                "wrote"
            );
            Some(out)
        }
    };

    Ok(Generated {
        path: written,
        text,
        functions: extraction.functions.len(),
        tests,
    })
}

/// Re-parse the rendered module and confirm it declares `expected` tests.
fn self_check(
    rendered: &str,
    dialect: crate::lang::Dialect,
    expected: usize,
) -> Result<usize, SmokeError> {
    let tree = parse_source(rendered, dialect, "<rendered>")
        .map_err(|e| SmokeError::Render(e.to_string()))?;
    let blocks = extract_test_blocks(tree.root_node(), rendered.as_bytes());
    let found = count_tests(&blocks);
    tracing::debug!(
        suite = blocks.first().map_or("", |b| b.name.as_str()),
        tests = found,
        "re-parsed rendered module"
    );
    if found != expected {
        return Err(SmokeError::Render(format!(
            "expected {expected} tests, found {found}"
        )));
    }
    Ok(found)
}
