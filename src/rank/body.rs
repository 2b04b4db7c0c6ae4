use crate::feed::FeedEntry;
use crate::util::text::strip_html;

pub const SUMMARY_PLACEHOLDER: &str = "Summary not available.";

/// Body text for scoring: the fetched full text, else the feed's rich
/// content, else its summary, else a placeholder. Feed markup is stripped.
pub fn resolve_body(full_text: String, entry: &FeedEntry) -> String {
    if !full_text.trim().is_empty() {
        return full_text;
    }
    if let Some(content) = entry.content.as_deref() {
        return strip_html(content);
    }
    match entry.summary.as_deref() {
        Some(summary) => strip_html(summary),
        None => SUMMARY_PLACEHOLDER.to_string(),
    }
}
