//! Maps fence language tags to file extensions.

/// Resolve a language tag to a short file extension.
///
/// Case-insensitive; unknown tags fall back to `txt`.
pub fn extension_for(language: &str) -> &'static str {
    match language.to_ascii_lowercase().as_str() {
        "javascript" | "js" => "js",
        "python" | "py" => "py",
        "java" => "java",
        "c++" | "cpp" => "cpp",
        "c#" | "csharp" => "cs",
        "php" => "php",
        "ruby" => "rb",
        "go" => "go",
        "rust" => "rs",
        "typescript" | "ts" => "ts",
        "swift" => "swift",
        "kotlin" => "kt",
        "scala" => "scala",
        "html" => "html",
        "css" => "css",
        "sql" => "sql",
        "bash" | "sh" | "shell" => "sh",
        "powershell" => "ps1",
        "yaml" | "yml" => "yml",
        "json" => "json",
        "xml" => "xml",
        "markdown" | "md" => "md",
        _ => "txt",
    }
}
