use std::sync::OnceLock;

use regex::Regex;

fn tag_re() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"(?s)<.*?>").expect("static tag regex"))
}

/// Remove HTML tags from feed-supplied markup. Entities are left as-is.
pub fn strip_html(s: &str) -> String {
    tag_re().replace_all(s, "").into_owned()
}

/// First `max` chars of `s` (char-boundary safe).
pub fn take_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
