use std::path::{Path, PathBuf};

use tree_sitter::Node;

/// Extract UTF-8 text from a tree-sitter node, returning `""` on failure.
pub fn txt<'a>(node: Node, src: &'a [u8]) -> &'a str {
    node.utf8_text(src).unwrap_or("")
}

/// Strip surrounding quotes (`'`, `"`, `` ` ``) from a string literal.
pub fn trim_quotes(s: &str) -> &str {
    s.trim_matches(|c: char| c == '\'' || c == '"' || c == '`')
}

/// Returns `true` for specifiers that point at local files (`./x`, `../x`).
///
/// Local modules are never mocked; everything else is treated as a package.
pub fn is_relative_specifier(specifier: &str) -> bool {
    specifier.starts_with('.')
}

/// File name without its final extension: `a/b/user.service.ts` → `user.service`.
pub fn module_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// File name including extension, used as the outer suite label.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Sibling test-file path: `dir/name.ext` → `dir/name.test.ext`.
pub fn test_file_path(source: &Path) -> PathBuf {
    let stem = module_stem(source);
    let name = match source.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}.test.{ext}"),
        None => format!("{stem}.test"),
    };
    source.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_quotes_handles_all_quote_styles() {
        assert_eq!(trim_quotes("'axios'"), "axios");
        assert_eq!(trim_quotes("\"axios\""), "axios");
        assert_eq!(trim_quotes("`axios`"), "axios");
    }

    #[test]
    fn relative_specifiers_are_detected() {
        assert!(is_relative_specifier("./bar"));
        assert!(is_relative_specifier("../lib/bar"));
        assert!(!is_relative_specifier("lodash"));
        assert!(!is_relative_specifier("@scope/pkg"));
        assert!(!is_relative_specifier("fs/promises"));
    }

    #[test]
    fn test_file_path_inserts_suffix_before_extension() {
        assert_eq!(
            test_file_path(Path::new("src/math.ts")),
            PathBuf::from("src/math.test.ts")
        );
        assert_eq!(
            test_file_path(Path::new("src/user.service.tsx")),
            PathBuf::from("src/user.service.test.tsx")
        );
        assert_eq!(
            test_file_path(Path::new("index.js")),
            PathBuf::from("index.test.js")
        );
    }

    #[test]
    fn module_stem_strips_only_final_extension() {
        assert_eq!(module_stem(Path::new("a/user.service.ts")), "user.service");
        assert_eq!(file_name(Path::new("a/user.service.ts")), "user.service.ts");
    }
}
