use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tokio::io::AsyncReadExt;

use super::neutral::readability_or_neutral;
use super::readability::{self, TextCounts};
use crate::telemetry::{self};
use crate::telemetry::ops::readability::Phase as ReadabilityPhase;

#[derive(Args, Debug)]
pub struct ReadabilityCmd {
    /// Text file to score; reads stdin when omitted
    pub file: Option<PathBuf>,
}

#[derive(Serialize)]
pub struct ReadabilityResult {
    pub words: usize,
    pub sentences: usize,
    pub syllables: usize,
    pub flesch_reading_ease: Option<f64>,
    /// Normalized 0..=10; neutral when the text has no words.
    pub score: f64,
}

pub fn evaluate(text: &str) -> ReadabilityResult {
    let TextCounts { sentences, words, syllables } = readability::counts(text);
    ReadabilityResult {
        words,
        sentences,
        syllables,
        flesch_reading_ease: readability::flesch_reading_ease(text).ok(),
        score: readability_or_neutral(readability::score(text), "input"),
    }
}

pub async fn run(args: ReadabilityCmd) -> Result<()> {
    let log = telemetry::readability();
    let _g = log.root_span_kv([("file", format!("{:?}", args.file))]).entered();
    let started = Instant::now();

    let text = {
        let _s = log.span(&ReadabilityPhase::ReadInput).entered();
        match &args.file {
            Some(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("read {}", path.display()))?,
            None => {
                let mut buf = String::new();
                tokio::io::stdin().read_to_string(&mut buf).await.context("read stdin")?;
                buf
            }
        }
    };

    let result = {
        let _s = log.span(&ReadabilityPhase::Score).entered();
        evaluate(&text)
    };

    if telemetry::config::json_mode() {
        log.result_since(&result, started)?;
    } else {
        let raw = result.flesch_reading_ease.map(|r| format!("{:.2}", r)).unwrap_or_else(|| "n/a".to_string());
        log.info(format!(
            "📖 Readability — score={:.2} flesch={} words={} sentences={} syllables={}",
            result.score, raw, result.words, result.sentences, result.syllables
        ));
    }
    Ok(())
}
