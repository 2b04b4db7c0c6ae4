use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Rank;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Plan, InitAuthority, Feed, FetchFeed, FetchItem, Score, Select, Output }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Plan => "plan",
        Phase::InitAuthority => "init_authority",
        Phase::Feed => "feed",
        Phase::FetchFeed => "fetch_feed",
        Phase::FetchItem => "fetch_item",
        Phase::Score => "score",
        Phase::Select => "select",
        Phase::Output => "output",
    }}
    fn span(&self) -> Span { match self {
        Phase::Plan => info_span!("plan"),
        Phase::InitAuthority => info_span!("init_authority"),
        Phase::Feed => info_span!("feed"),
        Phase::FetchFeed => info_span!("fetch_feed"),
        Phase::FetchItem => info_span!("fetch_item"),
        Phase::Score => info_span!("score"),
        Phase::Select => info_span!("select"),
        Phase::Output => info_span!("output"),
    }}
}

impl OpMarker for Rank {
    const NAME: &'static str = "rank";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("rank") }
}
