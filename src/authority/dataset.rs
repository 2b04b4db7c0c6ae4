use std::collections::HashMap;

use super::provider::AuthorityError;

/// Domain → rank, as published in a ranked-domain list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankTable {
    ranks: HashMap<String, i64>,
}

impl RankTable {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: AsRef<str>,
    {
        let mut ranks = HashMap::new();
        for (domain, rank) in pairs {
            ranks.entry(domain.as_ref().trim().to_lowercase()).or_insert(rank);
        }
        Self { ranks }
    }

    /// Parse `rank,domain` lines. Blank lines and lines without a comma are
    /// skipped; the first occurrence of a domain wins.
    pub fn parse_csv(raw: &str) -> Result<Self, AuthorityError> {
        let mut ranks = HashMap::new();
        for (lineno, line) in raw.lines().enumerate() {
            let line = line.trim();
            let Some((rank, domain)) = line.split_once(',') else { continue };
            let rank: i64 = rank.trim().parse().map_err(|_| {
                AuthorityError::Parse(format!("line {}: invalid rank {:?}", lineno + 1, rank.trim()))
            })?;
            let domain = domain.trim().to_lowercase();
            if domain.is_empty() { continue; }
            ranks.entry(domain).or_insert(rank);
        }
        Ok(Self { ranks })
    }

    pub fn rank(&self, domain: &str) -> Option<i64> {
        self.ranks.get(&domain.to_lowercase()).copied()
    }

    pub fn len(&self) -> usize { self.ranks.len() }

    pub fn is_empty(&self) -> bool { self.ranks.is_empty() }
}
