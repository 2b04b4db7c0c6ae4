use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Authority;

#[derive(Copy, Clone, Debug)]
pub enum Phase { LoadDataset, Lookup, Output }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::LoadDataset => "load_dataset",
        Phase::Lookup => "lookup",
        Phase::Output => "output",
    }}
    fn span(&self) -> Span { match self {
        Phase::LoadDataset => info_span!("load_dataset"),
        Phase::Lookup => info_span!("lookup"),
        Phase::Output => info_span!("output"),
    }}
}

impl OpMarker for Authority {
    const NAME: &'static str = "authority";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("authority") }
}
