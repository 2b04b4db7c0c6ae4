use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::feed::FeedSource;

const DEFAULT_FEEDS_FILE: &str = "feeds.txt";
const DEFAULT_FEED_CONCURRENCY: usize = 4;
const DEFAULT_PER_FEED_FETCHES: usize = 2;
const DEFAULT_MAX_INFLIGHT_FETCHES: usize = 8;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 20;

/// Run settings from `FEEDRANK_*` env vars. CLI flags override these.
#[derive(Clone, Debug)]
pub struct Settings {
    pub feeds_file: PathBuf,
    pub feed_concurrency: usize,
    pub per_feed_fetches: usize,
    pub max_inflight_fetches: usize,
    pub fetch_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            feeds_file: PathBuf::from(DEFAULT_FEEDS_FILE),
            feed_concurrency: DEFAULT_FEED_CONCURRENCY,
            per_feed_fetches: DEFAULT_PER_FEED_FETCHES,
            max_inflight_fetches: DEFAULT_MAX_INFLIGHT_FETCHES,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(get: F) -> Self {
        let mut cfg = Self::default();
        if let Some(path) = get("FEEDRANK_FEEDS_FILE") {
            if !path.trim().is_empty() { cfg.feeds_file = PathBuf::from(path); }
        }
        if let Some(n) = positive(get("FEEDRANK_FEED_CONCURRENCY")) { cfg.feed_concurrency = n; }
        if let Some(n) = positive(get("FEEDRANK_PER_FEED_FETCHES")) { cfg.per_feed_fetches = n; }
        if let Some(n) = positive(get("FEEDRANK_MAX_INFLIGHT_FETCHES")) { cfg.max_inflight_fetches = n; }
        if let Some(n) = positive(get("FEEDRANK_FETCH_TIMEOUT_SECS")) { cfg.fetch_timeout = Duration::from_secs(n as u64); }
        cfg
    }
}

fn positive(v: Option<String>) -> Option<usize> {
    v.and_then(|s| s.trim().parse::<usize>().ok()).filter(|n| *n > 0)
}

/// One feed URL per line; blank lines and `#` comments are ignored.
pub fn parse_feed_list(raw: &str) -> Result<Vec<FeedSource>> {
    let mut out = Vec::new();
    for (i, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') { continue; }
        let src = FeedSource::parse(line).with_context(|| format!("feeds list line {}", i + 1))?;
        if !out.contains(&src) { out.push(src); }
    }
    Ok(out)
}

pub fn load_feed_list(path: &Path) -> Result<Vec<FeedSource>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("read feeds file {}", path.display()))?;
    parse_feed_list(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn feed_list_skips_comments_and_duplicates() {
        let raw = "# tech\nhttps://a.example/rss\n\n  https://b.example/feed  \n# https://c.example/rss\nhttps://a.example/rss\n";
        let feeds = parse_feed_list(raw).unwrap();
        let urls: Vec<&str> = feeds.iter().map(|f| f.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.example/rss", "https://b.example/feed"]);
    }

    #[test]
    fn feed_list_reports_bad_line() {
        let err = parse_feed_list("https://a.example/rss\nnot-a-url\n").unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[test]
    fn settings_read_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("FEEDRANK_FEEDS_FILE", "/etc/feedrank/feeds.txt"),
            ("FEEDRANK_FEED_CONCURRENCY", "16"),
            ("FEEDRANK_MAX_INFLIGHT_FETCHES", "0"),
            ("FEEDRANK_FETCH_TIMEOUT_SECS", "5"),
        ]);
        let s = Settings::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(s.feeds_file, PathBuf::from("/etc/feedrank/feeds.txt"));
        assert_eq!(s.feed_concurrency, 16);
        assert_eq!(s.per_feed_fetches, DEFAULT_PER_FEED_FETCHES);
        assert_eq!(s.max_inflight_fetches, DEFAULT_MAX_INFLIGHT_FETCHES);
        assert_eq!(s.fetch_timeout, Duration::from_secs(5));
    }
}
