// Neutral fallbacks for sub-scores whose computation failed. Applied once, at
// the engine boundary, never inside the scorers themselves.

use std::fmt::Display;

use tracing::warn;

pub const NEUTRAL_AUTHORITY: u8 = 5;
pub const NEUTRAL_READABILITY: f64 = 5.0;

pub fn authority_or_neutral<E: Display>(res: Result<u8, E>, subject: &str) -> u8 {
    match res {
        Ok(score) => score,
        Err(e) => {
            warn!(subject, error = %e, "source authority unavailable, using neutral score");
            NEUTRAL_AUTHORITY
        }
    }
}

pub fn readability_or_neutral<E: Display>(res: Result<f64, E>, subject: &str) -> f64 {
    match res {
        Ok(score) => score,
        Err(e) => {
            warn!(subject, error = %e, "readability unavailable, using neutral score");
            NEUTRAL_READABILITY
        }
    }
}
