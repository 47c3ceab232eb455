use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;

use crate::error::SmokeError;
use crate::lang::Dialect;

/// External pretty-printer applied to the rendered test module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formatter {
    /// Program and leading arguments, e.g. `["npx", "prettier"]`. The source
    /// is piped through stdin with `--parser` chosen from the dialect.
    Command(Vec<String>),
    /// Leave the rendered text as is.
    Passthrough,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::Command(vec!["prettier".to_string()])
    }
}

impl Formatter {
    /// Build from a whitespace-separated command line.
    pub fn from_command_line(line: &str) -> Self {
        let words: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if words.is_empty() {
            Self::Passthrough
        } else {
            Self::Command(words)
        }
    }

    pub fn format(&self, text: &str, dialect: Dialect) -> Result<String, SmokeError> {
        let Self::Command(words) = self else {
            return Ok(text.to_string());
        };
        let Some((program, leading)) = words.split_first() else {
            return Ok(text.to_string());
        };

        tracing::debug!(program = %program, parser = dialect.formatter_parser(), "formatting");

        let mut child = Command::new(program)
            .args(leading)
            .arg("--parser")
            .arg(dialect.formatter_parser())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SmokeError::Format(format!("spawn {program} failed: {e}")))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| SmokeError::Format("no stdin".to_string()))?;

        // stdin is fed from its own thread while this one drains stdout.
        // The thread drops stdin when done, which closes the pipe.
        let input = text.to_string();
        let writer = thread::spawn(move || stdin.write_all(input.as_bytes()));

        let output = child
            .wait_with_output()
            .map_err(|e| SmokeError::Format(format!("{program} did not finish: {e}")))?;

        let written = writer
            .join()
            .map_err(|_| SmokeError::Format(format!("writer for {program} panicked")))?;
        // A formatter that quit early is reported by its exit status.
        if let Err(e) = written {
            if output.status.success() && e.kind() != io::ErrorKind::BrokenPipe {
                return Err(SmokeError::Format(format!("write to {program} failed: {e}")));
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SmokeError::Format(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|_| SmokeError::Format(format!("{program} produced non-UTF-8 output")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_returns_input() {
        let text = "describe('a.ts', () => {});\n";
        let out = Formatter::Passthrough.format(text, Dialect::TypeScript).unwrap();
        assert_eq!(out, text);
    }

    #[test]
    fn command_line_is_split_on_whitespace() {
        assert_eq!(
            Formatter::from_command_line("npx  prettier"),
            Formatter::Command(vec!["npx".into(), "prettier".into()])
        );
        assert_eq!(Formatter::from_command_line("   "), Formatter::Passthrough);
        assert_eq!(
            Formatter::default(),
            Formatter::Command(vec!["prettier".into()])
        );
    }

    #[cfg(unix)]
    #[test]
    fn large_input_streams_through_filter() {
        // `sh -c cat` drops the trailing `--parser` words and echoes stdin
        // back while still reading it.
        let f = Formatter::Command(vec!["sh".into(), "-c".into(), "cat".into()]);
        let text = "x".repeat(1 << 20);
        let out = f.format(&text, Dialect::TypeScript).unwrap();
        assert_eq!(out.len(), text.len());
        assert_eq!(out, text);
    }

    #[test]
    fn missing_program_is_format_error() {
        let f = Formatter::Command(vec!["smokegen-no-such-formatter".into()]);
        let err = f.format("x", Dialect::TypeScript).unwrap_err();
        assert!(matches!(err, SmokeError::Format(_)), "unexpected: {err}");
    }

    #[cfg(unix)]
    #[test]
    fn failing_program_is_format_error() {
        // `false` ignores its arguments and exits 1.
        let f = Formatter::Command(vec!["false".into()]);
        let err = f.format("x", Dialect::JavaScript).unwrap_err();
        assert!(err.to_string().contains("exited"), "unexpected: {err}");
    }
}
