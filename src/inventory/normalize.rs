// src/inventory/normalize.rs

/// Canonical form used by every matcher: lowercase ASCII letters, digits,
/// hyphens and single spaces, trimmed at both ends.
pub fn normalize(text: &str) -> String {
    let kept: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Words of normalized text. Hyphens split words too, so "galaxy-a32"
/// yields "galaxy" and "a32".
pub fn tokens(normalized: &str) -> impl Iterator<Item = &str> {
    normalized
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|t| !t.is_empty())
}
