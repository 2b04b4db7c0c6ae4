use std::sync::Arc;

use chrono::{Days, NaiveDate};
use tokio::sync::Mutex;
use tracing::{info, warn};
use url::Url;

use super::dataset::RankTable;
use super::provider::{AuthorityError, DatasetKey, RankProvider};
use crate::scoring::neutral::{authority_or_neutral, NEUTRAL_AUTHORITY};

/// Dated lists tried before falling back to the rolling aggregate.
pub const DATED_ATTEMPTS: u64 = 3;
const RANKS_PER_BUCKET: i64 = 100_000;

enum State {
    Uninitialized,
    Ready(Arc<RankTable>),
    Failed(AuthorityError),
}

/// Domain → authority score in `1..=10`, backed by a ranked-domain list
/// loaded once per resolver.
///
/// `ensure_ready` runs the load protocol at most once. Concurrent callers
/// queue on the state lock and all observe the same outcome; a failure is
/// sticky for the life of the resolver.
pub struct AuthorityResolver {
    provider: Arc<dyn RankProvider>,
    state: Mutex<State>,
}

impl AuthorityResolver {
    pub fn new(provider: Arc<dyn RankProvider>) -> Self {
        Self { provider, state: Mutex::new(State::Uninitialized) }
    }

    /// Already-loaded table, used by tests and the CLI to skip the network.
    pub fn with_table(provider: Arc<dyn RankProvider>, table: RankTable) -> Self {
        Self { provider, state: Mutex::new(State::Ready(Arc::new(table))) }
    }

    pub async fn ensure_ready(&self, today: NaiveDate) -> Result<Arc<RankTable>, AuthorityError> {
        let mut state = self.state.lock().await;
        match &*state {
            State::Ready(t) => return Ok(t.clone()),
            State::Failed(e) => return Err(e.clone()),
            State::Uninitialized => {}
        }
        match self.initialize(today).await {
            Ok(table) => {
                let table = Arc::new(table);
                *state = State::Ready(table.clone());
                Ok(table)
            }
            Err(e) => {
                *state = State::Failed(e.clone());
                Err(e)
            }
        }
    }

    async fn initialize(&self, today: NaiveDate) -> Result<RankTable, AuthorityError> {
        let mut last_err: Option<AuthorityError> = None;
        for back in 0..DATED_ATTEMPTS {
            let Some(date) = today.checked_sub_days(Days::new(back)) else { break };
            match self.provider.load(DatasetKey::Daily(date)).await {
                Ok(table) => {
                    info!(dataset = %date, domains = table.len(), "rank list loaded");
                    return Ok(table);
                }
                Err(e @ AuthorityError::NotPublished(_)) => {
                    warn!(dataset = %date, "rank list not published, trying previous day");
                    last_err = Some(e);
                }
                Err(e) => {
                    warn!(dataset = %date, error = %e, "dated rank list failed, trying rolling aggregate");
                    last_err = Some(e);
                    break;
                }
            }
        }

        match self.provider.load(DatasetKey::Rolling30).await {
            Ok(table) => {
                let key = DatasetKey::Rolling30;
                info!(dataset = %key, domains = table.len(), "rank list loaded");
                Ok(table)
            }
            Err(e) => {
                let dated = last_err.map(|d| d.to_string()).unwrap_or_else(|| "no dated attempt".to_string());
                Err(AuthorityError::Unavailable(format!("dated: {dated}; aggregate: {e}")))
            }
        }
    }

    pub async fn lookup(&self, target: &str) -> Result<u8, AuthorityError> {
        let table = match &*self.state.lock().await {
            State::Ready(t) => t.clone(),
            _ => return Err(AuthorityError::NotReady),
        };
        let domain = extract_domain(target).ok_or_else(|| AuthorityError::InvalidUrl(target.to_string()))?;
        Ok(rank_to_score(table.rank(&domain)))
    }

    /// Never fails: lookup errors score as neutral.
    pub async fn score_for(&self, target: &str) -> u8 {
        authority_or_neutral(self.lookup(target).await, target)
    }
}

/// `10 - floor((rank-1)/100000)`, clamped to `1..=10`. Unranked and
/// non-positive ranks are neutral.
pub fn rank_to_score(rank: Option<i64>) -> u8 {
    match rank {
        Some(r) if r >= 1 => {
            let bucket = (r - 1) / RANKS_PER_BUCKET;
            (10 - bucket).clamp(1, 10) as u8
        }
        _ => NEUTRAL_AUTHORITY,
    }
}

/// Lowercased host of a URL or bare domain, one leading `www.` removed.
pub fn extract_domain(target: &str) -> Option<String> {
    let target = target.trim();
    if target.is_empty() { return None; }
    let parsed = if target.contains("://") {
        Url::parse(target).ok()?
    } else {
        Url::parse(&format!("https://{target}")).ok()?
    };
    let host = parsed.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    if host.is_empty() { None } else { Some(host) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::provider::mock::StaticProvider;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

    fn table() -> RankTable {
        RankTable::from_pairs([("google.com", 1), ("example.com", 250_000), ("tiny.io", 5_000_000)])
    }

    #[test]
    fn bucketing_boundaries() {
        assert_eq!(rank_to_score(Some(1)), 10);
        assert_eq!(rank_to_score(Some(100_000)), 10);
        assert_eq!(rank_to_score(Some(100_001)), 9);
        assert_eq!(rank_to_score(Some(900_001)), 1);
        assert_eq!(rank_to_score(Some(10_000_000)), 1);
        assert_eq!(rank_to_score(Some(0)), 5);
        assert_eq!(rank_to_score(Some(-1)), 5);
        assert_eq!(rank_to_score(None), 5);
    }

    #[test]
    fn domain_extraction() {
        assert_eq!(extract_domain("https://www.Example.com/feed.xml").as_deref(), Some("example.com"));
        assert_eq!(extract_domain("http://blog.example.com:8080/x").as_deref(), Some("blog.example.com"));
        assert_eq!(extract_domain("www.example.org").as_deref(), Some("example.org"));
        assert_eq!(extract_domain("example.org/path").as_deref(), Some("example.org"));
        assert_eq!(extract_domain("www.www.a.com").as_deref(), Some("www.a.com"));
        assert_eq!(extract_domain(""), None);
        assert_eq!(extract_domain("http://"), None);
    }

    #[tokio::test]
    async fn loads_today_when_published() {
        let today = day(2024, 5, 3);
        let provider = Arc::new(StaticProvider::new().with(DatasetKey::Daily(today), Ok(table())));
        let r = AuthorityResolver::new(provider.clone());
        r.ensure_ready(today).await.unwrap();
        assert_eq!(provider.calls(), vec![DatasetKey::Daily(today)]);
        assert_eq!(r.score_for("https://www.google.com/news").await, 10);
        assert_eq!(r.score_for("example.com").await, 8);
        assert_eq!(r.score_for("tiny.io").await, 1);
        assert_eq!(r.score_for("unknown.dev").await, 5);
    }

    #[tokio::test]
    async fn walks_back_then_uses_yesterday() {
        let today = day(2024, 3, 1);
        let yesterday = day(2024, 2, 29);
        let provider = Arc::new(StaticProvider::new().with(DatasetKey::Daily(yesterday), Ok(table())));
        let r = AuthorityResolver::new(provider.clone());
        r.ensure_ready(today).await.unwrap();
        assert_eq!(provider.calls(), vec![DatasetKey::Daily(today), DatasetKey::Daily(yesterday)]);
    }

    #[tokio::test]
    async fn falls_back_to_rolling_after_three_days() {
        let today = day(2024, 5, 3);
        let provider = Arc::new(StaticProvider::new().with(DatasetKey::Rolling30, Ok(table())));
        let r = AuthorityResolver::new(provider.clone());
        r.ensure_ready(today).await.unwrap();
        assert_eq!(
            provider.calls(),
            vec![
                DatasetKey::Daily(day(2024, 5, 3)),
                DatasetKey::Daily(day(2024, 5, 2)),
                DatasetKey::Daily(day(2024, 5, 1)),
                DatasetKey::Rolling30,
            ]
        );
    }

    #[tokio::test]
    async fn other_dated_errors_skip_to_rolling() {
        let today = day(2024, 5, 3);
        let provider = Arc::new(
            StaticProvider::new()
                .with(DatasetKey::Daily(today), Err(AuthorityError::Fetch("503".into())))
                .with(DatasetKey::Rolling30, Ok(table())),
        );
        let r = AuthorityResolver::new(provider.clone());
        r.ensure_ready(today).await.unwrap();
        assert_eq!(provider.calls(), vec![DatasetKey::Daily(today), DatasetKey::Rolling30]);
    }

    #[tokio::test]
    async fn total_failure_is_fatal_and_sticky() {
        let today = day(2024, 5, 3);
        let provider = Arc::new(StaticProvider::new());
        let r = AuthorityResolver::new(provider.clone());
        let err = r.ensure_ready(today).await.unwrap_err();
        assert!(matches!(err, AuthorityError::Unavailable(_)));
        assert_eq!(provider.calls().len(), 4);

        // no second initialization attempt
        let again = r.ensure_ready(today).await.unwrap_err();
        assert_eq!(again, err);
        assert_eq!(provider.calls().len(), 4);
        assert_eq!(r.score_for("google.com").await, 5);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_initialization() {
        let today = day(2024, 5, 3);
        let provider = Arc::new(StaticProvider::new().with(DatasetKey::Daily(today), Ok(table())));
        let r = Arc::new(AuthorityResolver::new(provider.clone()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let r = r.clone();
                tokio::spawn(async move { r.ensure_ready(today).await.map(|t| t.len()) })
            })
            .collect();
        for h in handles { assert_eq!(h.await.unwrap().unwrap(), 3); }
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn lookup_before_init_is_not_ready() {
        let r = AuthorityResolver::new(Arc::new(StaticProvider::new()));
        assert_eq!(r.lookup("google.com").await, Err(AuthorityError::NotReady));
        assert_eq!(r.score_for("google.com").await, 5);
    }

    #[tokio::test]
    async fn preloaded_table_is_ready() {
        let r = AuthorityResolver::with_table(Arc::new(StaticProvider::new()), table());
        assert_eq!(r.lookup("google.com").await, Ok(10));
        assert_eq!(r.lookup("   ").await, Err(AuthorityError::InvalidUrl("   ".into())));
    }
}
