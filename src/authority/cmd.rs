use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Args;
use serde::Serialize;

use super::provider::{TrancoConfig, TrancoProvider};
use super::resolver::{extract_domain, rank_to_score, AuthorityResolver};
use crate::telemetry::{self};
use crate::telemetry::ops::authority::Phase as AuthorityPhase;

#[derive(Args, Debug)]
pub struct AuthorityCmd {
    /// URLs or bare domains to score
    #[arg(required = true)]
    pub targets: Vec<String>,

    /// Reference date for the dated list (default: today, UTC)
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Serialize)]
pub struct AuthorityRow {
    pub target: String,
    pub domain: Option<String>,
    pub rank: Option<i64>,
    pub score: u8,
}

#[derive(Serialize)]
pub struct AuthorityResult {
    pub dataset_domains: usize,
    pub rows: Vec<AuthorityRow>,
}

pub async fn run(args: AuthorityCmd) -> Result<()> {
    let log = telemetry::authority();
    let _g = log
        .root_span_kv([
            ("targets", args.targets.len().to_string()),
            ("date", format!("{:?}", args.date)),
        ])
        .entered();
    let started = Instant::now();

    let provider = TrancoProvider::new(TrancoConfig::from_env()).context("build rank list provider")?;
    let resolver = AuthorityResolver::new(Arc::new(provider));
    let today = args.date.unwrap_or_else(|| Utc::now().date_naive());
    let table = {
        let _s = log.span(&AuthorityPhase::LoadDataset).entered();
        resolver.ensure_ready(today).await.context("initialize domain authority")?
    };

    let rows: Vec<AuthorityRow> = {
        let _s = log.span(&AuthorityPhase::Lookup).entered();
        args.targets
            .iter()
            .map(|t| {
                let domain = extract_domain(t);
                let rank = domain.as_deref().and_then(|d| table.rank(d));
                AuthorityRow { target: t.clone(), domain, rank, score: rank_to_score(rank) }
            })
            .collect()
    };

    let _s = log.span(&AuthorityPhase::Output).entered();
    if telemetry::config::json_mode() {
        log.result_since(&AuthorityResult { dataset_domains: table.len(), rows }, started)?;
    } else {
        log.info(format!("🏷️  Authority — dataset_domains={}", table.len()));
        for r in &rows {
            let rank = r.rank.map(|v| v.to_string()).unwrap_or_else(|| "unranked".to_string());
            log.info(format!("  {}  domain={}  rank={}  score={}", r.target, r.domain.as_deref().unwrap_or("?"), rank, r.score));
        }
    }
    Ok(())
}
