/// Errors produced by smokegen while generating a test module.
#[derive(Debug, thiserror::Error)]
pub enum SmokeError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("unsupported extension: .{0}")]
    UnsupportedExtension(String),

    #[error("parse failed: {0}")]
    ParseFailed(String),

    #[error("{path}:{line}:{column}: syntax error")]
    Syntax {
        path: String,
        line: usize,
        column: usize,
    },

    #[error("default export `{name}` does not match any function declared before it")]
    UnresolvedDefaultExport { name: String },

    #[error("formatter: {0}")]
    Format(String),

    #[error("rendered test module is invalid: {0}")]
    Render(String),

    #[error("invalid mapping '{0}', expected Name=literal")]
    InvalidMapping(String),
}
