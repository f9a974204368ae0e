//! File extension to language classification

use std::path::Path;

/// Language reported for files with no known extension
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// Classify a file by its final extension, ignoring case
pub fn detect_language(filename: &str) -> &'static str {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some(ext) => language_for_extension(ext),
        None => UNKNOWN_LANGUAGE,
    }
}

fn language_for_extension(ext: &str) -> &'static str {
    match ext {
        "py" => "Python",
        "js" => "JavaScript",
        "ts" => "TypeScript",
        "java" => "Java",
        "rb" => "Ruby",
        "go" => "Go",
        "cpp" => "C++",
        "c" => "C",
        "cs" => "C#",
        "php" => "PHP",
        "html" => "HTML",
        "css" => "CSS",
        "json" => "JSON",
        "xml" => "XML",
        "sql" => "SQL",
        "sh" => "Shell Script",
        "bat" => "Batch File",
        "swift" => "Swift",
        "kt" => "Kotlin",
        "rs" => "Rust",
        "r" => "R",
        "m" => "MATLAB/Objective-C",
        "pl" => "Perl",
        "lua" => "Lua",
        "scala" => "Scala",
        "dart" => "Dart",
        "groovy" => "Groovy",
        "hs" => "Haskell",
        "erl" => "Erlang",
        "ex" => "Elixir",
        "ml" => "OCaml",
        "vb" => "Visual Basic",
        "f90" => "Fortran",
        "asm" => "Assembly",
        "ps1" => "PowerShell",
        "tsx" => "TypeScript JSX",
        "jsx" => "JavaScript JSX",
        "md" => "Markdown",
        "yml" | "yaml" => "YAML",
        "toml" => "TOML",
        "ini" => "INI File",
        "ipynb" => "Jupyter Notebook",
        "coffee" => "CoffeeScript",
        _ => UNKNOWN_LANGUAGE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_extensions() {
        assert_eq!(detect_language("src/main.rs"), "Rust");
        assert_eq!(detect_language("app/api.py"), "Python");
        assert_eq!(detect_language("web/App.tsx"), "TypeScript JSX");
        assert_eq!(detect_language("ci.yaml"), "YAML");
        assert_eq!(detect_language("ci.yml"), "YAML");
    }

    #[test]
    fn test_extension_case_is_ignored() {
        assert_eq!(detect_language("analysis.R"), "R");
        assert_eq!(detect_language("README.MD"), "Markdown");
    }

    #[test]
    fn test_only_final_extension_counts() {
        assert_eq!(detect_language("bundle.min.js"), "JavaScript");
        assert_eq!(detect_language("archive.tar.gz"), UNKNOWN_LANGUAGE);
    }

    #[test]
    fn test_unknown_and_extensionless() {
        assert_eq!(detect_language("Makefile"), UNKNOWN_LANGUAGE);
        assert_eq!(detect_language(".gitignore"), UNKNOWN_LANGUAGE);
        assert_eq!(detect_language("image.png"), UNKNOWN_LANGUAGE);
    }
}
