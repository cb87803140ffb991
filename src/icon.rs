/// Text glyph shown in place of a site favicon
use std::sync::LazyLock;

use regex::Regex;

static HAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\p{Han}").expect("static pattern is valid")
});

/// Derive a short glyph from a site's display name
///
/// Algorithm:
/// 1. Names containing a CJK ideograph → first two characters as written
/// 2. Two or more words → uppercased first letters of the first two words
/// 3. One word → its first two characters, uppercased
/// 4. Otherwise (blank) → first two characters of the raw name, uppercased
///
/// Examples:
/// - "Stack Overflow" → "SO"
/// - "开发者" → "开发"
/// - "github" → "GI"
/// - "x" → "X"
pub fn generate_icon(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }

    if HAN.is_match(name) {
        return name.chars().take(2).collect();
    }

    let words: Vec<&str> = name.split_whitespace().collect();
    match words.as_slice() {
        [first, second, ..] => first
            .chars()
            .take(1)
            .chain(second.chars().take(1))
            .collect::<String>()
            .to_uppercase(),
        [only] => only.chars().take(2).collect::<String>().to_uppercase(),
        [] => name.chars().take(2).collect::<String>().to_uppercase(),
    }
}
