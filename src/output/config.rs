use std::env;

use crate::telemetry;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Mcp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl OutputConfig {
    pub fn from_env() -> Self {
        let format = parse_format(env::var("FEEDRANK_OUTPUT_FORMAT").ok().as_deref(), telemetry::config::json_mode());
        let pretty = parse_flag(env::var("FEEDRANK_OUTPUT_PRETTY").ok().as_deref());
        OutputConfig { format, pretty }
    }
}

// `--json` upgrades the default text format but never overrides an explicit choice.
fn parse_format(v: Option<&str>, json_flag: bool) -> OutputFormat {
    match v {
        Some("json") => OutputFormat::Json,
        Some("mcp") => OutputFormat::Mcp,
        Some("text") => OutputFormat::Text,
        _ if json_flag => OutputFormat::Json,
        _ => OutputFormat::Text,
    }
}

fn parse_flag(v: Option<&str>) -> bool {
    match v {
        Some(v) if v.eq_ignore_ascii_case("1") || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes") => true,
        _ => false,
    }
}
