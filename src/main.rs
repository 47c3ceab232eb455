//! `smokegen`: Jest smoke tests for TypeScript/JavaScript modules.
//!
//! Reads a source file, finds its exported functions and their declared
//! parameter types, and writes a sibling `*.test.*` module that calls each
//! function with placeholder arguments and expects it not to throw. Package
//! imports of the source are mocked.

mod error;
mod extract;
mod format;
mod generate;
mod lang;
mod model;
mod output;
mod parser;
mod placeholder;
mod util;

use std::io;
use std::path::Path;

use format::Formatter;
use generate::{Config, Destination};

struct CliArgs {
    to_stdout: bool,
    no_format: bool,
    formatter: Option<String>,
    mappings: Vec<(String, String)>,
    verbose: bool,
    files: Vec<String>,
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut to_stdout = false;
    let mut no_format = false;
    let mut formatter: Option<String> = None;
    let mut mappings = Vec::new();
    let mut verbose = false;
    let mut files = Vec::new();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--stdout" => to_stdout = true,
            "--no-format" => no_format = true,
            "--verbose" | "-v" => verbose = true,
            "--formatter" => {
                i += 1;
                if i >= args.len() {
                    return Err("--formatter requires a command argument".to_string());
                }
                formatter = Some(args[i].clone());
            }
            "--map" => {
                i += 1;
                if i >= args.len() {
                    return Err("--map requires a Name=literal argument".to_string());
                }
                mappings.push(generate::parse_mapping(&args[i]).map_err(|e| e.to_string())?);
            }
            arg if arg.starts_with('-') => {
                return Err(format!("unknown option: {arg}"));
            }
            _ => files.push(args[i].clone()),
        }
        i += 1;
    }

    if no_format && formatter.is_some() {
        return Err("--no-format and --formatter are mutually exclusive".to_string());
    }

    Ok(CliArgs {
        to_stdout,
        no_format,
        formatter,
        mappings,
        verbose,
        files,
    })
}

impl CliArgs {
    fn config(&self) -> Config {
        let formatter = if self.no_format {
            Formatter::Passthrough
        } else {
            self.formatter
                .as_deref()
                .map_or_else(Formatter::default, Formatter::from_command_line)
        };
        Config {
            formatter,
            destination: if self.to_stdout {
                Destination::Stdout
            } else {
                Destination::Sibling
            },
            mappings: self.mappings.clone(),
            ..Config::default()
        }
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let raw: Vec<String> = std::env::args().skip(1).collect();

    if raw.is_empty() || raw.iter().any(|a| a == "-h" || a == "--help") {
        print_help();
        std::process::exit(0);
    }

    let args = match parse_args(&raw) {
        Ok(a) => a,
        Err(msg) => {
            eprintln!("smokegen: {msg}");
            std::process::exit(1);
        }
    };

    if args.files.is_empty() {
        eprintln!("smokegen: no file specified");
        std::process::exit(1);
    }

    init_tracing(args.verbose);

    let config = args.config();
    let mut failed = false;
    for path_str in &args.files {
        match generate::run(Path::new(path_str), &config) {
            Ok(generated) => {
                if generated.path.is_none() {
                    tracing::info!(
                        functions = generated.functions,
                        tests = generated.tests,
                        "generated"
                    );
                    print!("{}", generated.text);
                }
            }
            Err(e) => {
                eprintln!("smokegen: {e}");
                failed = true;
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
}

fn print_help() {
    eprintln!("smokegen: Jest smoke tests for TypeScript/JavaScript modules");
    eprintln!("Usage: smokegen [options] <file> [file2 ...]");
    eprintln!();
    eprintln!("Writes <dir>/<name>.test.<ext> next to each source file.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --stdout             Print the test module instead of writing it");
    eprintln!("  --no-format          Skip the external formatter");
    eprintln!("  --formatter CMD      Formatter command (default \"prettier\")");
    eprintln!("  --map Name=literal   Placeholder for a named type (repeatable)");
    eprintln!("  -v, --verbose        Debug logging (RUST_LOG overrides)");
    eprintln!("  -h, --help           Show help");
    eprintln!();
    eprintln!("Each exported function gets one test with placeholder arguments,");
    eprintln!("one per extra union arm, and one per optional parameter omitted.");
}
