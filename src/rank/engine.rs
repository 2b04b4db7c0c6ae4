use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use futures::stream::{self, StreamExt};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, Instrument};

use super::body::resolve_body;
use super::select::top_k;
use super::types::{ArticleCandidate, FeedReport, RankedResult, RunStats};
use crate::authority::AuthorityResolver;
use crate::extractor::FullTextRetriever;
use crate::feed::{FeedEntry, FeedFetcher, FeedSource};
use crate::scoring::keywords::KeywordTable;
use crate::scoring::neutral::readability_or_neutral;
use crate::scoring::{readability, SubScores};
use crate::telemetry::{self};
use crate::telemetry::ctx::PhaseSpan;
use crate::telemetry::ops::rank::Phase as RankPhase;
use crate::util::time::cutoff;

const CANDIDATE_CHANNEL: usize = 64;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Only entries published strictly after `now - window` are eligible.
    pub window: Duration,
    pub feed_concurrency: usize,
    /// Article fetches in flight within one feed.
    pub per_feed_fetches: usize,
    /// Wall-clock budget; when it runs out the engine ranks what it has.
    pub deadline: Option<StdDuration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { window: Duration::hours(24), feed_concurrency: 4, per_feed_fetches: 2, deadline: None }
    }
}

type SeenLinks = Arc<Mutex<HashSet<String>>>;

/// Check-and-insert in one step. `true` means this caller owns the link.
fn commit_link(seen: &SeenLinks, link: &str) -> bool {
    match seen.lock() {
        Ok(mut set) => set.insert(link.to_string()),
        Err(poisoned) => poisoned.into_inner().insert(link.to_string()),
    }
}

#[derive(Clone)]
pub struct Engine {
    feeds: Arc<dyn FeedFetcher>,
    retriever: FullTextRetriever,
    authority: Arc<AuthorityResolver>,
    keywords: Arc<KeywordTable>,
    cfg: EngineConfig,
}

impl Engine {
    pub fn new(
        feeds: Arc<dyn FeedFetcher>,
        retriever: FullTextRetriever,
        authority: Arc<AuthorityResolver>,
        keywords: Arc<KeywordTable>,
        cfg: EngineConfig,
    ) -> Self {
        Self { feeds, retriever, authority, keywords, cfg }
    }

    /// Rank the recent entries of `sources` and keep the best `max_results`.
    ///
    /// Fails only when the authority dataset cannot be loaded. Feed and
    /// article failures are absorbed and show up in the returned stats.
    pub async fn rank(&self, sources: &[FeedSource], max_results: usize, now: DateTime<Utc>) -> Result<RankedResult> {
        let log = telemetry::rank();

        self.authority
            .ensure_ready(now.date_naive())
            .instrument(log.span(&RankPhase::InitAuthority))
            .await
            .context("domain authority resolver failed to initialize")?;

        let cutoff = cutoff(now, self.cfg.window);
        let seen: SeenLinks = Arc::new(Mutex::new(HashSet::new()));
        let token = CancellationToken::new();
        let gate = Arc::new(Semaphore::new(self.cfg.feed_concurrency.max(1)));
        let (tx, mut rx) = mpsc::channel::<ArticleCandidate>(CANDIDATE_CHANNEL);

        let mut workers = JoinSet::new();
        for (feed_index, source) in sources.iter().cloned().enumerate() {
            let engine = self.clone();
            let seen = seen.clone();
            let tx = tx.clone();
            let token = token.clone();
            let gate = gate.clone();
            let span = log.span_kv(&RankPhase::Feed, [("feed_index", feed_index.to_string()), ("url", source.url.clone())]);
            workers.spawn(
                async move {
                    let _permit = tokio::select! {
                        permit = gate.acquire_owned() => permit.ok()?,
                        _ = token.cancelled() => return None,
                    };
                    Some(engine.run_feed(feed_index, source, cutoff, seen, tx, token).await)
                }
                .instrument(span),
            );
        }
        drop(tx);

        let deadline = self.cfg.deadline;
        let expiry = async move {
            match deadline {
                Some(d) => tokio::time::sleep(d).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(expiry);

        let mut candidates: Vec<ArticleCandidate> = Vec::new();
        let mut deadline_hit = false;
        loop {
            tokio::select! {
                msg = rx.recv() => match msg {
                    Some(c) => candidates.push(c),
                    None => break,
                },
                _ = &mut expiry => {
                    deadline_hit = true;
                    log.warn(format!("⏱️  Deadline reached, ranking {} candidates collected so far", candidates.len()));
                    token.cancel();
                    workers.abort_all();
                    break;
                }
            }
        }
        // committed before the cut
        while let Ok(c) = rx.try_recv() { candidates.push(c); }

        let mut stats = RunStats { feeds: sources.len(), deadline_hit, ..Default::default() };
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(Some(report)) => {
                    log.feed_summary(report.feed_index, &report.url, report.retained, report.skipped());
                    stats.absorb(&report);
                }
                Ok(None) => {}
                Err(e) if e.is_cancelled() => {}
                Err(e) => {
                    log.error(format!("❌ Feed worker crashed: {}", e));
                    stats.feeds_failed += 1;
                }
            }
        }
        stats.retained = candidates.len();

        let articles = {
            let _s = log.span(&RankPhase::Select).entered();
            top_k(candidates, max_results)
        };
        log.totals(&stats);
        Ok(RankedResult { articles, stats })
    }

    async fn run_feed(
        self,
        feed_index: usize,
        source: FeedSource,
        cutoff: DateTime<Utc>,
        seen: SeenLinks,
        tx: mpsc::Sender<ArticleCandidate>,
        token: CancellationToken,
    ) -> FeedReport {
        let log = telemetry::rank();
        let mut report = FeedReport::new(feed_index, &source.url);

        // one lookup per feed, shared by all its articles
        let source_score = self.authority.score_for(&source.url).await;

        let fetched = tokio::select! {
            res = self.feeds.fetch(&source).instrument(RankPhase::FetchFeed.span()) => res,
            _ = token.cancelled() => return report,
        };
        let entries = match fetched {
            Ok(entries) => entries,
            Err(e) => {
                log.error_kv("❌ Feed skipped", [("url", source.url.clone()), ("error", format!("{:#}", e))]);
                report.failed = true;
                return report;
            }
        };
        report.entries = entries.len();

        let mut fresh = Vec::new();
        for (entry_index, entry) in entries.into_iter().enumerate() {
            let Some(published) = entry.published else {
                report.skipped_undated += 1;
                debug!(link = %entry.link, "skip: no publish date");
                continue;
            };
            if published <= cutoff {
                report.skipped_stale += 1;
                debug!(link = %entry.link, "skip: outside window");
                continue;
            }
            if !commit_link(&seen, &entry.link) {
                report.skipped_duplicate += 1;
                debug!(link = %entry.link, "skip: duplicate link");
                continue;
            }
            fresh.push((entry_index, published, entry));
        }

        let engine = &self;
        let scored = stream::iter(fresh)
            .map(move |(entry_index, published, entry)| {
                engine.score_entry((feed_index, entry_index), published, entry, source_score)
            })
            .buffered(self.cfg.per_feed_fetches.max(1));
        tokio::pin!(scored);

        loop {
            let next = tokio::select! {
                next = scored.next() => next,
                _ = token.cancelled() => None,
            };
            let Some(candidate) = next else { break };
            if candidate.score > 0.0 {
                if tx.send(candidate).await.is_err() { break; }
                report.retained += 1;
            } else {
                report.skipped_non_positive += 1;
                debug!(link = %candidate.link, "skip: non-positive score");
            }
        }
        report
    }

    async fn score_entry(
        &self,
        position: (usize, usize),
        published_at: DateTime<Utc>,
        entry: FeedEntry,
        source_score: u8,
    ) -> ArticleCandidate {
        let full_text = self.retriever.fetch(&entry.link).instrument(RankPhase::FetchItem.span()).await;

        RankPhase::Score.span().in_scope(|| {
            let body = resolve_body(full_text, &entry);
            let sub_scores = SubScores {
                title_keywords: self.keywords.score(&entry.title),
                body_keywords: self.keywords.score(&body),
                source_authority: source_score,
                readability: readability_or_neutral(readability::score(&body), &entry.link),
            };
            ArticleCandidate {
                title: entry.title,
                body,
                link: entry.link,
                published_at,
                score: sub_scores.composite(),
                sub_scores,
                position,
            }
        })
    }
}
