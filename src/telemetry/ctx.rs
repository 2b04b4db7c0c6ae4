use anyhow::Result;
use serde::Serialize;
use std::marker::PhantomData;
use std::time::Instant;
use tracing::{info, debug, warn, error, Span};

use crate::output::config::OutputConfig;
use crate::output::types::{Envelope, Meta};
use crate::output::Emitter;
use crate::rank::types::RunStats;

pub trait PhaseSpan {
    fn name(&self) -> &'static str;
    fn span(&self) -> Span;
}

pub trait OpMarker {
    const NAME: &'static str;
    type Phase: PhaseSpan;
    fn root_span() -> Span;
}

pub struct LogCtx<O: OpMarker> {
    pub(crate) json: bool,
    pub(crate) _marker: PhantomData<O>,
}

impl<O: OpMarker> LogCtx<O> {
    fn op_name(&self) -> &'static str { O::NAME }

    pub fn root_span(&self) -> Span { O::root_span() }

    pub fn root_span_kv<'a, T>(&self, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.root_span();
        let details = kv_to_string(fields);
        if details.is_empty() {
            info!(op = %self.op_name(), "start");
        } else {
            info!(op = %self.op_name(), details = %details, "start");
        }
        span
    }

    pub fn span(&self, ph: &O::Phase) -> Span { ph.span() }

    pub fn span_kv<'a, T>(&self, ph: &O::Phase, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.span(ph);
        let details = kv_to_string(fields);
        if details.is_empty() {
            debug!(op = %self.op_name(), phase = ph.name(), "span_start");
        } else {
            debug!(op = %self.op_name(), phase = ph.name(), details = %details, "span_start");
        }
        span
    }

    pub fn info(&self, msg: impl AsRef<str>) { if self.json { info!(op = %self.op_name(), "{}", msg.as_ref()); } else { info!("{}", msg.as_ref()); } }
    pub fn warn(&self, msg: impl AsRef<str>) { if self.json { warn!(op = %self.op_name(), "{}", msg.as_ref()); } else { warn!("{}", msg.as_ref()); } }
    pub fn error(&self, msg: impl AsRef<str>) { if self.json { error!(op = %self.op_name(), "{}", msg.as_ref()); } else { error!("{}", msg.as_ref()); } }

    pub fn error_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        let details = kv_to_string(kv);
        if self.json { error!(op = %self.op_name(), details = %details, "{}", msg); }
        else { error!("{} {}", msg, details); }
    }

    pub fn plan<T: Serialize>(&self, plan: &T) -> Result<()> {
        let env = Envelope::plan(self.op_name(), plan, None)?;
        Emitter::from_env(OutputConfig::from_env()).emit(&env)?;
        Ok(())
    }

    pub fn result_since<T: Serialize>(&self, result: &T, started: Instant) -> Result<()> {
        let env = Envelope::result(self.op_name(), result, Some(Meta::since(started)))?;
        Emitter::from_env(OutputConfig::from_env()).emit(&env)?;
        Ok(())
    }
}

// rank-only summaries
impl LogCtx<crate::telemetry::ops::rank::Rank> {
    pub fn feed_summary(&self, feed_index: usize, url: &str, retained: usize, skipped: usize) {
        if self.json { info!(op = %self.op_name(), feed_index, url, retained, skipped, "feed_summary"); }
        else { info!("✅ Feed {} ({}): retained={} skipped={}", feed_index, url, retained, skipped); }
    }

    pub fn totals(&self, stats: &RunStats) {
        if self.json {
            info!(
                op = %self.op_name(),
                feeds = stats.feeds,
                feeds_failed = stats.feeds_failed,
                entries = stats.entries,
                retained = stats.retained,
                skipped_undated = stats.skipped_undated,
                skipped_stale = stats.skipped_stale,
                skipped_duplicate = stats.skipped_duplicate,
                skipped_non_positive = stats.skipped_non_positive,
                deadline_hit = stats.deadline_hit,
                "rank_totals"
            );
        } else {
            info!(
                "📊 Rank totals: feeds={} failed={} entries={} retained={} undated={} stale={} duplicate={} non_positive={} deadline_hit={}",
                stats.feeds, stats.feeds_failed, stats.entries, stats.retained,
                stats.skipped_undated, stats.skipped_stale, stats.skipped_duplicate,
                stats.skipped_non_positive, stats.deadline_hit
            );
        }
    }
}

fn kv_to_string<'a, T>(kv: T) -> String
where
    T: IntoIterator<Item = (&'a str, String)>,
{
    let mut parts: Vec<String> = Vec::new();
    for (k, v) in kv { parts.push(format!("{}={}", k, v)); }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_to_string_joins_pairs_in_order() {
        let s = kv_to_string([("max", "5".to_string()), ("window", "24h".to_string())]);
        assert_eq!(s, "max=5 window=24h");
    }

    #[test]
    fn kv_to_string_empty() {
        let s = kv_to_string(Vec::<(&str, String)>::new());
        assert!(s.is_empty());
    }
}
