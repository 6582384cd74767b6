//! Input rules for user-supplied metadata and questions.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ApiError;

pub const MAX_DESCRIPTION_CHARS: usize = 2000;
pub const MAX_TAG_CHARS: usize = 50;
pub const MIN_QUERY_CHARS: usize = 3;
pub const MAX_QUERY_CHARS: usize = 2000;

static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9 ._-]+$").unwrap_or_else(|e| panic!("invalid tag pattern: {}", e))
});

/// Trims the description and caps it at [`MAX_DESCRIPTION_CHARS`].
/// Blank input becomes `None`.
pub fn sanitize_description(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_DESCRIPTION_CHARS).collect())
}

/// Keeps the tags made of letters, digits, spaces, `.`, `_` and `-` that fit
/// in [`MAX_TAG_CHARS`], trimmed and without case-insensitive duplicates.
pub fn sanitize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut kept: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if tag.is_empty() || tag.chars().count() > MAX_TAG_CHARS || !TAG_PATTERN.is_match(tag) {
            continue;
        }
        if !kept.iter().any(|k| k.eq_ignore_ascii_case(tag)) {
            kept.push(tag.to_string());
        }
    }
    kept
}

/// Returns the trimmed question or the client error describing why it was refused.
pub fn validate_query(raw: &str) -> Result<String, ApiError> {
    let query = raw.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("Query is required".to_string()));
    }
    let len = query.chars().count();
    if len < MIN_QUERY_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Query must be at least {} characters long",
            MIN_QUERY_CHARS
        )));
    }
    if len > MAX_QUERY_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Query must be at most {} characters long",
            MAX_QUERY_CHARS
        )));
    }
    Ok(query.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_is_trimmed_and_capped() {
        assert_eq!(sanitize_description("  notes  ").as_deref(), Some("notes"));
        assert_eq!(sanitize_description("   "), None);
        let long = "a".repeat(MAX_DESCRIPTION_CHARS + 10);
        assert_eq!(
            sanitize_description(&long).unwrap().chars().count(),
            MAX_DESCRIPTION_CHARS
        );
    }

    #[test]
    fn tags_follow_the_allowed_pattern() {
        let long = "x".repeat(MAX_TAG_CHARS + 1);
        let tags = sanitize_tags(["finance", " Q3 report ", "<script>", "", "FINANCE", long.as_str()]);
        assert_eq!(tags, vec!["finance", "Q3 report"]);
    }

    #[test]
    fn query_length_limits() {
        assert!(matches!(validate_query("   "), Err(ApiError::BadRequest(m)) if m == "Query is required"));
        assert!(validate_query("hi").is_err());
        assert!(validate_query(&"q".repeat(MAX_QUERY_CHARS + 1)).is_err());
        assert_eq!(validate_query("  why?  ").unwrap(), "why?");
    }
}
