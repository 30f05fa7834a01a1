use std::collections::HashSet;

/// Terms attached automatically whenever they appear in refined content.
pub const CURATED_KEYWORDS: &[&str] = &["创意"];

/// Trims the keyword and strips one leading `#`; blank keywords are dropped.
pub fn normalize_keyword(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let stripped = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if stripped.is_empty() {
        None
    } else {
        Some(stripped.to_string())
    }
}

pub fn derive_keywords<S: AsRef<str>>(content: &str, provided: &[S]) -> Vec<String> {
    derive_keywords_with(content, provided, CURATED_KEYWORDS)
}

/// Caller keywords first, then curated terms found in `content`.
///
/// Duplicates collapse on exact (case-sensitive) match, keeping the first
/// occurrence. Curated terms match case-insensitively as substrings.
pub fn derive_keywords_with<S: AsRef<str>>(
    content: &str,
    provided: &[S],
    curated: &[&str],
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for keyword in provided
        .iter()
        .filter_map(|raw| normalize_keyword(raw.as_ref()))
    {
        if seen.insert(keyword.clone()) {
            out.push(keyword);
        }
    }

    let lowered = content.to_lowercase();
    for term in curated {
        if lowered.contains(&term.to_lowercase()) && seen.insert((*term).to_string()) {
            out.push((*term).to_string());
        }
    }

    out
}

/// Case-insensitive substring match of `filter` inside `keyword`.
pub fn keyword_matches(keyword: &str, filter: &str) -> bool {
    keyword.to_lowercase().contains(&filter.to_lowercase())
}
