use super::types::ArticleCandidate;
use crate::util::text::take_chars;

pub const DEFAULT_SNIPPET_CHARS: usize = 500;

/// Plain-text brief of the ranked articles, one block per article.
pub fn digest(articles: &[ArticleCandidate], snippet_chars: usize) -> String {
    let mut out = String::new();
    for a in articles {
        out.push_str("Title: ");
        out.push_str(&a.title);
        out.push_str("\nContent: ");
        out.push_str(take_chars(&a.body, snippet_chars));
        out.push_str("\n\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::SubScores;
    use chrono::Utc;

    fn article(title: &str, body: &str) -> ArticleCandidate {
        ArticleCandidate {
            title: title.into(),
            body: body.into(),
            link: format!("https://x.example/{title}"),
            published_at: Utc::now(),
            score: 1.0,
            sub_scores: SubScores { title_keywords: 0, body_keywords: 0, source_authority: 1, readability: 0.0 },
            position: (0, 0),
        }
    }

    #[test]
    fn renders_blocks_with_truncated_bodies() {
        let out = digest(&[article("One", "abcdef"), article("Two", "xy")], 3);
        assert_eq!(out, "Title: One\nContent: abc\n\nTitle: Two\nContent: xy\n\n");
    }

    #[test]
    fn empty_list_is_empty_digest() {
        assert_eq!(digest(&[], DEFAULT_SNIPPET_CHARS), "");
    }
}
