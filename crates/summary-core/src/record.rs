use chrono::{DateTime, FixedOffset};

use crate::keywords::keyword_matches;

pub const SUMMARY_ID_PREFIX: &str = "summary-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRecord {
    pub id: String,
    pub day_stamp: String,
    pub content: String,
    pub keywords: Vec<String>,
    pub created_at: DateTime<FixedOffset>,
}

impl SummaryRecord {
    pub fn formatted(&self) -> String {
        format_summary(&self.day_stamp, &self.keywords, &self.content)
    }

    /// True when any stored keyword contains any of `filters`.
    pub fn matches_any<S: AsRef<str>>(&self, filters: &[S]) -> bool {
        filters.iter().any(|filter| {
            self.keywords
                .iter()
                .any(|keyword| keyword_matches(keyword, filter.as_ref()))
        })
    }
}

pub fn summary_id(seq: u64) -> String {
    format!("{SUMMARY_ID_PREFIX}{seq}")
}

/// Renders `"<day> #kw1 #kw2 <content>"`.
///
/// The three segments are always space separated, so a record without
/// keywords renders with an empty middle segment.
pub fn format_summary(day_stamp: &str, keywords: &[String], content: &str) -> String {
    let tags = keywords
        .iter()
        .map(|k| format!("#{k}"))
        .collect::<Vec<_>>()
        .join(" ");
    format!("{day_stamp} {tags} {content}")
}
