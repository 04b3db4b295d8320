//! Mapping from judge-reported language names to file extensions.

use std::sync::LazyLock;

/// Extension used when no known language matches.
pub const FALLBACK_EXTENSION: &str = ".txt";

/// Canonical language names as the judge prints them, before any version
/// or compiler suffix.
pub const LANGUAGE_EXTENSIONS: &[(&str, &str)] = &[
    ("Ada", ".adb"),
    ("Awk", ".awk"),
    ("Bash", ".sh"),
    ("C", ".c"),
    ("C#", ".cs"),
    ("C++", ".cpp"),
    ("C++11", ".cpp"),
    ("C++14", ".cpp"),
    ("C++17", ".cpp"),
    ("C++20", ".cpp"),
    ("C++23", ".cpp"),
    ("Carp", ".carp"),
    ("Clojure", ".clj"),
    ("COBOL", ".cob"),
    ("Common Lisp", ".lisp"),
    ("Crystal", ".cr"),
    ("Cython", ".pyx"),
    ("D", ".d"),
    ("Dart", ".dart"),
    ("Elixir", ".ex"),
    ("Erlang", ".erl"),
    ("F#", ".fs"),
    ("Fortran", ".f90"),
    ("Go", ".go"),
    ("Haskell", ".hs"),
    ("Java", ".java"),
    ("JavaScript", ".js"),
    ("Julia", ".jl"),
    ("Kotlin", ".kt"),
    ("Lua", ".lua"),
    ("LuaJIT", ".lua"),
    ("Nim", ".nim"),
    ("Objective-C", ".m"),
    ("OCaml", ".ml"),
    ("Octave", ".m"),
    ("Pascal", ".pas"),
    ("Perl", ".pl"),
    ("PHP", ".php"),
    ("PowerShell", ".ps1"),
    ("Prolog", ".pl"),
    ("PyPy2", ".py"),
    ("PyPy3", ".py"),
    ("Python", ".py"),
    ("Python2", ".py"),
    ("Python3", ".py"),
    ("R", ".r"),
    ("Racket", ".rkt"),
    ("Raku", ".raku"),
    ("Ruby", ".rb"),
    ("Rust", ".rs"),
    ("Scala", ".scala"),
    ("Scheme", ".scm"),
    ("Sed", ".sed"),
    ("Swift", ".swift"),
    ("Text", ".txt"),
    ("TypeScript", ".ts"),
    ("Vim", ".vim"),
    ("Visual Basic", ".vb"),
    ("Zig", ".zig"),
    ("Zsh", ".zsh"),
];

/// Table entries ordered longest key first so that `C++` and `C#` are
/// tried before `C`. Equal lengths keep alphabetical order.
static BY_LENGTH: LazyLock<Vec<(&'static str, &'static str)>> = LazyLock::new(|| {
    let mut entries = LANGUAGE_EXTENSIONS.to_vec();
    entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));
    entries
});

/// Classify a language string. Never fails: unknown input maps to
/// [`FALLBACK_EXTENSION`].
pub fn classify(language: &str) -> &'static str {
    BY_LENGTH
        .iter()
        .find(|(key, _)| matches_key(language, key))
        .map(|(_, ext)| *ext)
        .unwrap_or(FALLBACK_EXTENSION)
}

/// `key` must be a prefix of `language` ending at the end of input or a space.
fn matches_key(language: &str, key: &str) -> bool {
    match language.strip_prefix(key) {
        Some(rest) => rest.is_empty() || rest.starts_with(' '),
        None => false,
    }
}
