use tree_sitter::Language as TsLanguage;

use crate::error::SmokeError;

/// Source dialects smokegen can read.
///
/// The dialect decides which tree-sitter grammar parses the input, which
/// grammar re-parses the generated module, and which parser the external
/// formatter is told to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    TypeScript,
    Tsx,
    JavaScript,
    Jsx,
}

impl Dialect {
    /// Resolve an extension to a dialect.
    pub fn from_extension(ext: &str) -> Result<Self, SmokeError> {
        Self::for_extension(ext).ok_or_else(|| SmokeError::UnsupportedExtension(ext.to_string()))
    }

    /// Resolve an extension to a dialect (non-error variant).
    pub fn for_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        match ext.as_str() {
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" => Some(Self::Tsx),
            "js" | "mjs" | "cjs" => Some(Self::JavaScript),
            "jsx" => Some(Self::Jsx),
            _ => None,
        }
    }

    /// tree-sitter parser language for this dialect.
    ///
    /// Plain JavaScript goes through the TypeScript grammar too; it is a
    /// superset for everything extraction looks at.
    pub fn tree_sitter_language(self) -> TsLanguage {
        match self {
            Self::Tsx | Self::Jsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Self::TypeScript | Self::JavaScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        }
    }

    /// Parser name handed to the formatter (`prettier --parser <name>`).
    pub fn formatter_parser(self) -> &'static str {
        match self {
            Self::TypeScript | Self::Tsx => "typescript",
            Self::JavaScript | Self::Jsx => "babel",
        }
    }

    /// Human-facing dialect name for diagnostics.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::TypeScript => "TypeScript",
            Self::Tsx => "TSX",
            Self::JavaScript => "JavaScript",
            Self::Jsx => "JSX",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialect_maps_supported_extensions() {
        assert_eq!(Dialect::for_extension("ts"), Some(Dialect::TypeScript));
        assert_eq!(Dialect::for_extension("MTS"), Some(Dialect::TypeScript));
        assert_eq!(Dialect::for_extension("tsx"), Some(Dialect::Tsx));
        assert_eq!(Dialect::for_extension("cjs"), Some(Dialect::JavaScript));
        assert_eq!(Dialect::for_extension("jsx"), Some(Dialect::Jsx));
        assert_eq!(Dialect::for_extension("rs"), None);
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let err = Dialect::from_extension("py").unwrap_err();
        assert!(matches!(err, SmokeError::UnsupportedExtension(ref e) if e == "py"));
    }

    #[test]
    fn formatter_parser_follows_dialect_family() {
        assert_eq!(Dialect::TypeScript.formatter_parser(), "typescript");
        assert_eq!(Dialect::Tsx.formatter_parser(), "typescript");
        assert_eq!(Dialect::JavaScript.formatter_parser(), "babel");
    }

    #[test]
    fn grammars_load() {
        for dialect in [Dialect::TypeScript, Dialect::Tsx, Dialect::JavaScript, Dialect::Jsx] {
            let mut parser = tree_sitter::Parser::new();
            assert!(
                parser.set_language(&dialect.tree_sitter_language()).is_ok(),
                "grammar for {} should load",
                dialect.display_name()
            );
        }
    }
}
