//! Text helpers shared by plan parsers

use once_cell::sync::Lazy;
use regex::Regex;

/// Spark elides long lists with a literal ellipsis
pub const TRUNCATION_MARKER: &str = "...";

static HASH_NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\d+").unwrap());

/// Strip expression-id suffixes such as `#123` (they change on every run)
pub fn hash_numbers_remover(input: &str) -> String {
    HASH_NUMBER_REGEX.replace_all(input, "").into_owned()
}

/// Split on commas that are not nested inside parentheses
pub fn split_top_level(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut start = 0;

    for (i, ch) in input.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = (depth - 1).max(0),
            ',' if depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);

    parts
}
