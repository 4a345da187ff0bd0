//! Filesystem-safe naming helpers

/// Maximum length for a sanitized name
const MAX_NAME_LEN: usize = 50;

/// Create a safe file or directory name from a title
///
/// Lowercases, replaces spaces with underscores, and keeps only
/// `[a-z0-9_-]`, truncated to 50 characters.
#[must_use]
pub fn sanitize(title: &str) -> String {
    let safe: String = title
        .to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
        .collect();

    safe.chars().take(MAX_NAME_LEN).collect()
}

/// Shorten a string for log output, collapsing newlines
#[must_use]
pub fn truncate_for_log(text: &str, max: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.len() <= max {
        return flat;
    }
    let cut: String = flat.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}
