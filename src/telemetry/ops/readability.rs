use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Readability;

#[derive(Copy, Clone, Debug)]
pub enum Phase { ReadInput, Score }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self { Phase::ReadInput => "read_input", Phase::Score => "score" } }
    fn span(&self) -> Span { match self { Phase::ReadInput => info_span!("read_input"), Phase::Score => info_span!("score") } }
}

impl OpMarker for Readability {
    const NAME: &'static str = "readability";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("readability") }
}
