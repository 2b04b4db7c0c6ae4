use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::Args;
use serde::Serialize;

pub mod body;
pub mod digest;
pub mod engine;
pub mod select;
pub mod types;

use crate::authority::{AuthorityResolver, TrancoConfig, TrancoProvider};
use crate::config::{self, Settings};
use crate::extractor::{FullTextRetriever, HttpExtractor};
use crate::feed::{FeedSource, HttpFeedFetcher};
use crate::scoring::keywords::KeywordTable;
use crate::telemetry::{self};
use crate::telemetry::ops::rank::Phase as RankPhase;
use crate::util::time::parse_span_arg;
use engine::{Engine, EngineConfig};

#[derive(Args, Debug)]
pub struct RankCmd {
    /// Feeds list (default: $FEEDRANK_FEEDS_FILE or feeds.txt)
    #[arg(long)]
    pub feeds_file: Option<PathBuf>,
    /// Feed URL to rank; repeatable. Without --feeds-file only these are used
    #[arg(long = "feed")]
    pub feeds: Vec<String>,
    #[arg(long, default_value_t = 5)]
    pub max: usize,
    /// Recency window, e.g. 24h, 2d, 90m
    #[arg(long, default_value = "24h", value_parser = parse_span_arg)]
    pub window: Duration,
    #[arg(long)]
    pub feed_concurrency: Option<usize>,
    #[arg(long)]
    pub per_feed_fetches: Option<usize>,
    #[arg(long)]
    pub max_inflight_fetches: Option<usize>,
    /// Stop after this long and rank what has been collected
    #[arg(long, value_parser = parse_span_arg)]
    pub deadline: Option<Duration>,
    /// JSON file of weighted keyword groups; replaces the built-in table
    #[arg(long)]
    pub keywords: Option<PathBuf>,
    /// Print the plain-text digest instead of the ranked list
    #[arg(long, default_value_t = false)]
    pub digest: bool,
    #[arg(long, default_value_t = digest::DEFAULT_SNIPPET_CHARS)]
    pub snippet_chars: usize,
    /// Show what would run without fetching anything
    #[arg(long, default_value_t = false)]
    pub plan: bool,
}

#[derive(Serialize)]
pub struct RankPlan {
    pub feeds: Vec<String>,
    pub max_results: usize,
    pub window_secs: i64,
    pub feed_concurrency: usize,
    pub per_feed_fetches: usize,
    pub max_inflight_fetches: usize,
    pub deadline_secs: Option<u64>,
    pub keywords: usize,
}

fn resolve_sources(args: &RankCmd, settings: &Settings) -> Result<Vec<FeedSource>> {
    let mut sources = match (&args.feeds_file, args.feeds.is_empty()) {
        (Some(path), _) => config::load_feed_list(path)?,
        (None, true) => config::load_feed_list(&settings.feeds_file)?,
        (None, false) => Vec::new(),
    };
    for raw in &args.feeds {
        let src = FeedSource::parse(raw)?;
        if !sources.contains(&src) { sources.push(src); }
    }
    Ok(sources)
}

pub async fn run(args: RankCmd) -> Result<()> {
    let log = telemetry::rank();
    let _g = log
        .root_span_kv([
            ("max", args.max.to_string()),
            ("window_secs", args.window.num_seconds().to_string()),
            ("feeds_file", format!("{:?}", args.feeds_file)),
            ("feeds", args.feeds.len().to_string()),
            ("deadline", format!("{:?}", args.deadline)),
            ("plan", args.plan.to_string()),
        ])
        .entered();

    let settings = Settings::from_env();
    let sources = resolve_sources(&args, &settings)?;
    let keywords = match &args.keywords {
        Some(path) => KeywordTable::from_json_file(path)?,
        None => KeywordTable::reference(),
    };
    let cfg = EngineConfig {
        window: args.window,
        feed_concurrency: args.feed_concurrency.unwrap_or(settings.feed_concurrency),
        per_feed_fetches: args.per_feed_fetches.unwrap_or(settings.per_feed_fetches),
        deadline: args.deadline.and_then(|d| d.to_std().ok()),
    };
    let max_inflight = args.max_inflight_fetches.unwrap_or(settings.max_inflight_fetches);

    if args.plan {
        let _s = log.span(&RankPhase::Plan).entered();
        let plan = RankPlan {
            feeds: sources.iter().map(|s| s.url.clone()).collect(),
            max_results: args.max,
            window_secs: cfg.window.num_seconds(),
            feed_concurrency: cfg.feed_concurrency,
            per_feed_fetches: cfg.per_feed_fetches,
            max_inflight_fetches: max_inflight,
            deadline_secs: cfg.deadline.map(|d| d.as_secs()),
            keywords: keywords.len(),
        };
        if telemetry::config::json_mode() {
            log.plan(&plan)?;
        } else {
            log.info(format!(
                "📝 Rank plan — feeds={} max={} window={}s concurrency={} per_feed={} inflight={} keywords={}",
                plan.feeds.len(), plan.max_results, plan.window_secs, plan.feed_concurrency,
                plan.per_feed_fetches, plan.max_inflight_fetches, plan.keywords
            ));
            for f in &plan.feeds { log.info(format!("  {}", f)); }
            log.info("   Drop --plan to execute.");
        }
        return Ok(());
    }

    if sources.is_empty() {
        log.warn("⚠️  No feed sources configured; nothing to rank");
    }

    let started = Instant::now();
    let fetcher = HttpFeedFetcher::new(settings.fetch_timeout)?;
    let extractor = HttpExtractor::new(settings.fetch_timeout)?;
    let retriever = FullTextRetriever::new(Arc::new(extractor), max_inflight);
    let provider = TrancoProvider::new(TrancoConfig::from_env()).context("build rank list provider")?;
    let authority = Arc::new(AuthorityResolver::new(Arc::new(provider)));
    let engine = Engine::new(Arc::new(fetcher), retriever, authority, Arc::new(keywords), cfg);

    let result = engine.rank(&sources, args.max, Utc::now()).await?;

    let _s = log.span(&RankPhase::Output).entered();
    if args.digest {
        print!("{}", digest::digest(&result.articles, args.snippet_chars));
        return Ok(());
    }
    if telemetry::config::json_mode() {
        log.result_since(&result, started)?;
    } else {
        log.info(format!("🏆 Top {} of {} candidates", result.articles.len(), result.stats.retained));
        for (i, a) in result.articles.iter().enumerate() {
            log.info(format!(
                "  {}. [{:.2}] {}  {}  published={}",
                i + 1, a.score, a.title, a.link, a.published_at.to_rfc3339()
            ));
        }
    }
    Ok(())
}
