use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::scoring::SubScores;

/// A scored article. Built once per entry and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleCandidate {
    pub title: String,
    pub body: String,
    pub link: String,
    pub published_at: DateTime<Utc>,
    pub score: f64,
    pub sub_scores: SubScores,
    /// (feed index, entry index) at discovery; orders equal scores.
    #[serde(skip)]
    pub position: (usize, usize),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    pub feeds: usize,
    pub feeds_failed: usize,
    pub entries: usize,
    pub retained: usize,
    pub skipped_undated: usize,
    pub skipped_stale: usize,
    pub skipped_duplicate: usize,
    pub skipped_non_positive: usize,
    pub deadline_hit: bool,
}

/// What one feed worker saw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedReport {
    pub feed_index: usize,
    pub url: String,
    pub failed: bool,
    pub entries: usize,
    pub retained: usize,
    pub skipped_undated: usize,
    pub skipped_stale: usize,
    pub skipped_duplicate: usize,
    pub skipped_non_positive: usize,
}

impl FeedReport {
    pub fn new(feed_index: usize, url: &str) -> Self {
        Self { feed_index, url: url.to_string(), ..Default::default() }
    }

    pub fn skipped(&self) -> usize {
        self.skipped_undated + self.skipped_stale + self.skipped_duplicate + self.skipped_non_positive
    }
}

impl RunStats {
    /// Fold in a worker's counters. `retained` is counted by the collector.
    pub fn absorb(&mut self, r: &FeedReport) {
        if r.failed { self.feeds_failed += 1; }
        self.entries += r.entries;
        self.skipped_undated += r.skipped_undated;
        self.skipped_stale += r.skipped_stale;
        self.skipped_duplicate += r.skipped_duplicate;
        self.skipped_non_positive += r.skipped_non_positive;
    }
}

/// Top-K snapshot returned by the engine.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RankedResult {
    pub articles: Vec<ArticleCandidate>,
    pub stats: RunStats,
}
