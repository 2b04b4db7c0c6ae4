use anyhow::{bail, Result};
use chrono::{DateTime, Duration, Utc};

// Parse a span like "24h", "2d", "90m" or "45s" into a chrono Duration.
// Returns None if unparseable or not strictly positive.
pub fn parse_span_str(s: &str) -> Option<Duration> {
    let s = s.trim();
    let (num, unit) = s.split_at(s.find(|c: char| !c.is_ascii_digit())?);
    let n: i64 = num.parse().ok()?;
    if n <= 0 { return None; }
    match unit {
        "s" => Duration::try_seconds(n),
        "m" => Duration::try_minutes(n),
        "h" => Duration::try_hours(n),
        "d" => Duration::try_days(n),
        _ => None,
    }
}

// clap value_parser for --window / --deadline
pub fn parse_span_arg(s: &str) -> Result<Duration> {
    match parse_span_str(s) {
        Some(d) => Ok(d),
        None => bail!("invalid duration {:?} (expected e.g. 24h, 2d, 90m, 45s)", s),
    }
}

// Articles strictly newer than this instant are eligible.
// A window reaching past the representable range admits everything.
pub fn cutoff(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(window).unwrap_or(DateTime::<Utc>::MIN_UTC)
}
