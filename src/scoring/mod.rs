//! Per-article sub-scores and the composite that combines them.

pub mod cmd;
pub mod keywords;
pub mod neutral;
pub mod readability;

use serde::Serialize;

pub const WEIGHT_TITLE: f64 = 3.0;
pub const WEIGHT_BODY: f64 = 2.0;
pub const WEIGHT_SOURCE: f64 = 1.0;
pub const WEIGHT_READABILITY: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubScores {
    pub title_keywords: u64,
    pub body_keywords: u64,
    pub source_authority: u8,
    pub readability: f64,
}

impl SubScores {
    pub fn composite(&self) -> f64 {
        self.title_keywords as f64 * WEIGHT_TITLE
            + self.body_keywords as f64 * WEIGHT_BODY
            + self.source_authority as f64 * WEIGHT_SOURCE
            + self.readability * WEIGHT_READABILITY
    }
}
