//! Client slug generation.

/// Number of trailing timestamp digits appended to a colliding slug.
const SUFFIX_DIGITS: usize = 5;

/// Turn a display name into a URL-safe slug.
///
/// Quotes are dropped, every other run of characters outside `[a-z0-9]`
/// becomes a single `-`, and leading or trailing dashes are trimmed.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.trim().to_lowercase().chars() {
        if ch == '\'' || ch == '"' {
            continue;
        }
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Append the last five digits of a millisecond timestamp to a base slug.
pub fn disambiguate_slug(base: &str, millis: u128) -> String {
    let digits = millis.to_string();
    let start = digits.len().saturating_sub(SUFFIX_DIGITS);
    format!("{base}-{}", &digits[start..])
}
