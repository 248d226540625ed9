use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::spec::FormSpec;

const FALLBACK_CODE: &str = "question";

fn separators() -> &'static Regex {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    SEPARATORS.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("static pattern"))
}

/// Derives a machine-safe code from a question title.
///
/// Accents are stripped first, then everything outside `[a-z0-9]` collapses
/// into single underscores.
pub fn generate_code(title: &str) -> String {
    let lowered = title
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .collect::<String>()
        .to_lowercase();
    let code = separators().replace_all(&lowered, "_");
    let code = code.trim_matches('_');
    if code.is_empty() {
        FALLBACK_CODE.to_string()
    } else {
        code.to_string()
    }
}

/// Like [`generate_code`], suffixed with `_2`, `_3`, ... until no question in `spec` uses it.
pub fn unique_code(title: &str, spec: &FormSpec) -> String {
    let taken: BTreeSet<&str> = spec
        .questions
        .iter()
        .map(|question| question.code.as_str())
        .collect();
    let base = generate_code(title);
    if !taken.contains(base.as_str()) {
        return base;
    }
    (2..)
        .map(|suffix| format!("{}_{}", base, suffix))
        .find(|candidate| !taken.contains(candidate.as_str()))
        .unwrap_or(base)
}
