use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const AI_KEYWORDS: &[&str] = &[
    "AI", "Artificial Intelligence", "Machine Learning", "Deep Learning", "Neural Network",
    "Natural Language Processing", "NLP", "Computer Vision", "Robotics", "ChatGPT",
    "GPT-3", "GPT-4", "Reinforcement Learning", "Generative Adversarial Networks", "GAN",
    "Transformer", "BERT", "OpenAI", "TensorFlow", "PyTorch", "Cognitive Computing",
    "Data Science", "Algorithm", "Predictive Analytics", "Big Data", "Automation",
];
pub const AI_WEIGHT: u64 = 4;

pub const CRYPTO_KEYWORDS: &[&str] = &[
    "Blockchain", "Bitcoin", "Ethereum", "Cryptocurrency", "DeFi", "Web 3.0",
    "Solana", "Algorand", "NFT", "Smart Contract", "Crypto",
];
pub const CRYPTO_WEIGHT: u64 = 1;

/// One weighted group as it appears in a keywords file.
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordGroup {
    pub weight: u64,
    pub keywords: Vec<String>,
}

/// Lowercase keyword → weight, in first-insertion order.
///
/// Built as an ordered merge: a later group that repeats a keyword overrides
/// its weight but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordTable {
    entries: Vec<(String, u64)>,
}

#[derive(Debug, Default)]
pub struct KeywordTableBuilder {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl KeywordTableBuilder {
    pub fn group<S: AsRef<str>>(mut self, keywords: &[S], weight: u64) -> Self {
        for kw in keywords {
            let key = kw.as_ref().trim().to_lowercase();
            if key.is_empty() { continue; }
            match self.index.get(&key) {
                Some(&pos) => self.entries[pos].1 = weight,
                None => {
                    self.index.insert(key.clone(), self.entries.len());
                    self.entries.push((key, weight));
                }
            }
        }
        self
    }

    pub fn build(self) -> KeywordTable {
        KeywordTable { entries: self.entries }
    }
}

impl KeywordTable {
    pub fn builder() -> KeywordTableBuilder {
        KeywordTableBuilder::default()
    }

    /// The AI group (weight 4) merged with the crypto group (weight 1).
    pub fn reference() -> Self {
        Self::builder()
            .group(AI_KEYWORDS, AI_WEIGHT)
            .group(CRYPTO_KEYWORDS, CRYPTO_WEIGHT)
            .build()
    }

    pub fn from_groups(groups: &[KeywordGroup]) -> Self {
        groups
            .iter()
            .fold(Self::builder(), |b, g| b.group(g.keywords.as_slice(), g.weight))
            .build()
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read keywords file {}", path.display()))?;
        let groups: Vec<KeywordGroup> = serde_json::from_str(&raw)
            .with_context(|| format!("parse keywords file {}", path.display()))?;
        Ok(Self::from_groups(&groups))
    }

    pub fn weight(&self, keyword: &str) -> Option<u64> {
        let key = keyword.to_lowercase();
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, w)| *w)
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Weighted count of non-overlapping, case-insensitive substring hits.
    /// No word boundaries: "ai" also matches inside "said".
    pub fn score(&self, text: &str) -> u64 {
        let lower = text.to_lowercase();
        self.entries
            .iter()
            .map(|(kw, weight)| lower.matches(kw.as_str()).count() as u64 * weight)
            .sum()
    }
}
