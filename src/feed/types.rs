use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

/// A syndication endpoint. Opaque beyond being an absolute http(s) URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FeedSource {
    pub url: String,
}

impl FeedSource {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let Ok(u) = Url::parse(raw) else { bail!("Invalid feed URL: {}", raw) };
        if !matches!(u.scheme(), "http" | "https") { bail!("Unsupported feed URL scheme: {}", raw); }
        Ok(FeedSource { url: raw.to_string() })
    }
}

impl std::fmt::Display for FeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(&self.url) }
}

/// One item as parsed from a feed, before any scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub published: Option<DateTime<Utc>>,
    pub summary: Option<String>,
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_source_accepts_http_urls() {
        let s = FeedSource::parse(" https://news.ycombinator.com/rss ").unwrap();
        assert_eq!(s.url, "https://news.ycombinator.com/rss");
        assert_eq!(s.to_string(), "https://news.ycombinator.com/rss");
    }

    #[test]
    fn feed_source_rejects_bad_input() {
        assert!(FeedSource::parse("not a url").is_err());
        assert!(FeedSource::parse("ftp://example.com/feed").is_err());
    }
}
