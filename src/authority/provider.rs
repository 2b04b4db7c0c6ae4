use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use super::dataset::RankTable;
use crate::feed::fetch::USER_AGENT;

const DEFAULT_BASE_URL: &str = "https://tranco-list.eu";
const DEFAULT_LIST_SIZE: usize = 1_000_000;
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_CACHE_DIR: &str = ".tranco";

/// Which published list to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKey {
    Daily(NaiveDate),
    /// Aggregate over the last 30 days, republished daily.
    Rolling30,
}

impl std::fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetKey::Daily(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            DatasetKey::Rolling30 => write!(f, "rolling-30d"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthorityError {
    /// The list for this date does not exist yet.
    NotPublished(NaiveDate),
    Fetch(String),
    Parse(String),
    /// Every dated attempt and the aggregate failed.
    Unavailable(String),
    NotReady,
    InvalidUrl(String),
}

impl AuthorityError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AuthorityError::Fetch("request timed out".to_string())
        } else {
            AuthorityError::Fetch(err.to_string())
        }
    }
}

impl std::fmt::Display for AuthorityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthorityError::NotPublished(d) => write!(f, "rank list for {} is not published yet", d),
            AuthorityError::Fetch(msg) => write!(f, "rank list fetch failed: {msg}"),
            AuthorityError::Parse(msg) => write!(f, "rank list parse failed: {msg}"),
            AuthorityError::Unavailable(msg) => write!(f, "domain authority dataset unavailable: {msg}"),
            AuthorityError::NotReady => write!(f, "domain authority resolver is not initialized"),
            AuthorityError::InvalidUrl(raw) => write!(f, "cannot extract a domain from {raw:?}"),
        }
    }
}

impl std::error::Error for AuthorityError {}

#[async_trait]
pub trait RankProvider: Send + Sync {
    async fn load(&self, key: DatasetKey) -> Result<RankTable, AuthorityError>;
}

#[derive(Clone, Debug)]
pub struct TrancoConfig {
    pub base_url: String,
    pub list_size: usize,
    pub timeout: Duration,
    /// `None` disables the on-disk cache.
    pub cache_dir: Option<PathBuf>,
}

impl Default for TrancoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            list_size: DEFAULT_LIST_SIZE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_dir: Some(PathBuf::from(DEFAULT_CACHE_DIR)),
        }
    }
}

impl TrancoConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(base) = std::env::var("FEEDRANK_TRANCO_BASE_URL") {
            cfg.base_url = base;
        }
        if let Ok(size) = std::env::var("FEEDRANK_TRANCO_LIST_SIZE") {
            if let Ok(parsed) = size.parse::<usize>() {
                if parsed > 0 { cfg.list_size = parsed; }
            }
        }
        if let Ok(timeout) = std::env::var("FEEDRANK_TRANCO_TIMEOUT_SECS") {
            if let Ok(parsed) = timeout.parse::<u64>() {
                cfg.timeout = Duration::from_secs(parsed);
            }
        }
        if let Ok(dir) = std::env::var("FEEDRANK_TRANCO_CACHE_DIR") {
            cfg.cache_dir = if dir.trim().is_empty() { None } else { Some(PathBuf::from(dir)) };
        }
        cfg
    }
}

#[derive(Debug, Deserialize)]
struct ListInfo {
    list_id: String,
    #[serde(default)]
    available: bool,
    #[serde(default)]
    download: Option<String>,
}

/// Tranco ranked-domain lists over HTTP, with dated lists cached on disk.
#[derive(Clone)]
pub struct TrancoProvider {
    http: HttpClient,
    cfg: TrancoConfig,
}

impl TrancoProvider {
    pub fn new(cfg: TrancoConfig) -> Result<Self, AuthorityError> {
        let http = HttpClient::builder()
            .user_agent(USER_AGENT)
            .timeout(cfg.timeout)
            .build()
            .map_err(AuthorityError::from_reqwest)?;
        Ok(Self { http, cfg })
    }

    fn base(&self) -> &str { self.cfg.base_url.trim_end_matches('/') }

    fn date_info_url(&self, date: NaiveDate) -> String {
        format!("{}/api/lists/date/{}?subdomains=false", self.base(), date.format("%Y-%m-%d"))
    }

    fn latest_id_url(&self) -> String { format!("{}/top-1m-id", self.base()) }

    fn download_url(&self, list_id: &str) -> String {
        format!("{}/download/{}/{}", self.base(), list_id.trim(), self.cfg.list_size)
    }

    fn cache_path(&self, date: NaiveDate) -> Option<PathBuf> {
        self.cfg
            .cache_dir
            .as_ref()
            .map(|dir| dir.join(format!("tranco-{}.csv", date.format("%Y-%m-%d"))))
    }

    async fn get_text(&self, url: &str) -> Result<(StatusCode, String), AuthorityError> {
        let resp = self.http.get(url).send().await.map_err(AuthorityError::from_reqwest)?;
        let status = resp.status();
        let body = resp.text().await.map_err(AuthorityError::from_reqwest)?;
        Ok((status, body))
    }

    /// Prefer the link the service hands out; build one from the id otherwise.
    fn dated_download_url(&self, info: &ListInfo) -> String {
        match info.download.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => self.download_url(&info.list_id),
        }
    }

    async fn download(&self, url: &str) -> Result<String, AuthorityError> {
        let (status, body) = self.get_text(url).await?;
        if !status.is_success() {
            return Err(AuthorityError::Fetch(format!("GET {url} returned {status}")));
        }
        Ok(body)
    }

    async fn load_daily(&self, date: NaiveDate) -> Result<RankTable, AuthorityError> {
        let cache = self.cache_path(date);
        if let Some(path) = &cache {
            if let Ok(raw) = tokio::fs::read_to_string(path).await {
                match RankTable::parse_csv(&raw) {
                    Ok(table) => {
                        debug!(path = %path.display(), "rank list cache hit");
                        return Ok(table);
                    }
                    Err(e) => warn!(path = %path.display(), error = %e, "corrupt rank list cache, downloading again"),
                }
            }
        }

        let url = self.date_info_url(date);
        let (status, body) = self.get_text(&url).await?;
        if status == StatusCode::NOT_FOUND {
            return Err(AuthorityError::NotPublished(date));
        }
        if !status.is_success() {
            return Err(AuthorityError::Fetch(format!("GET {url} returned {status}")));
        }
        let info: ListInfo = serde_json::from_str(&body)
            .map_err(|e| AuthorityError::Parse(format!("list metadata: {e}")))?;
        if !info.available {
            return Err(AuthorityError::NotPublished(date));
        }

        let raw = self.download(&self.dated_download_url(&info)).await?;
        let table = RankTable::parse_csv(&raw)?;
        if let Some(path) = &cache {
            write_cache(path, &raw).await;
        }
        Ok(table)
    }

    async fn load_rolling(&self) -> Result<RankTable, AuthorityError> {
        let url = self.latest_id_url();
        let (status, body) = self.get_text(&url).await?;
        if !status.is_success() {
            return Err(AuthorityError::Fetch(format!("GET {url} returned {status}")));
        }
        let list_id = body.trim();
        if list_id.is_empty() {
            return Err(AuthorityError::Parse("empty list id".to_string()));
        }
        let raw = self.download(&self.download_url(list_id)).await?;
        RankTable::parse_csv(&raw)
    }
}

async fn write_cache(path: &std::path::Path, raw: &str) {
    if let Some(parent) = path.parent() {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            warn!(path = %parent.display(), error = %e, "cannot create rank list cache dir");
            return;
        }
    }
    // readers never see a half-written list
    let tmp = path.with_extension(format!("csv.{}.tmp", uuid::Uuid::new_v4()));
    if let Err(e) = tokio::fs::write(&tmp, raw).await {
        warn!(path = %tmp.display(), error = %e, "cannot write rank list cache");
        let _ = tokio::fs::remove_file(&tmp).await;
        return;
    }
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        warn!(path = %path.display(), error = %e, "cannot move rank list cache into place");
        let _ = tokio::fs::remove_file(&tmp).await;
    }
}

#[async_trait]
impl RankProvider for TrancoProvider {
    async fn load(&self, key: DatasetKey) -> Result<RankTable, AuthorityError> {
        match key {
            DatasetKey::Daily(date) => self.load_daily(date).await,
            DatasetKey::Rolling30 => self.load_rolling().await,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn provider(cache_dir: Option<PathBuf>) -> TrancoProvider {
        TrancoProvider::new(TrancoConfig {
            // nothing listens on the discard port
            base_url: "http://127.0.0.1:9/".to_string(),
            list_size: 1000,
            timeout: Duration::from_secs(2),
            cache_dir,
        })
        .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

    #[test]
    fn builds_endpoint_urls() {
        let p = provider(None);
        assert_eq!(
            p.date_info_url(date(2024, 5, 1)),
            "http://127.0.0.1:9/api/lists/date/2024-05-01?subdomains=false"
        );
        assert_eq!(p.latest_id_url(), "http://127.0.0.1:9/top-1m-id");
        assert_eq!(p.download_url(" X5Y2 \n"), "http://127.0.0.1:9/download/X5Y2/1000");
    }

    #[test]
    fn cache_path_is_per_date() {
        let p = provider(Some(PathBuf::from("/tmp/ranks")));
        assert_eq!(p.cache_path(date(2024, 1, 9)), Some(PathBuf::from("/tmp/ranks/tranco-2024-01-09.csv")));
        assert_eq!(provider(None).cache_path(date(2024, 1, 9)), None);
    }

    #[test]
    fn list_metadata_decodes() {
        let info: ListInfo = serde_json::from_str(
            r#"{"list_id":"K2QVW","available":true,"download":"https://tranco-list.eu/download/K2QVW/1000000"}"#,
        )
        .unwrap();
        assert_eq!(info.list_id, "K2QVW");
        assert!(info.available);
        assert_eq!(provider(None).dated_download_url(&info), "https://tranco-list.eu/download/K2QVW/1000000");
    }

    #[test]
    fn dated_download_without_link_uses_list_id() {
        let info: ListInfo = serde_json::from_str(r#"{"list_id":"K2QVW","available":true}"#).unwrap();
        assert_eq!(info.download, None);
        assert_eq!(provider(None).dated_download_url(&info), "http://127.0.0.1:9/download/K2QVW/1000");
    }

    #[tokio::test]
    async fn cached_daily_list_skips_network() {
        let dir = std::env::temp_dir().join(format!("feedrank-cache-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("tranco-2024-05-01.csv"), "1,google.com\n2,example.com\n").await.unwrap();

        let p = provider(Some(dir.clone()));
        let table = p.load(DatasetKey::Daily(date(2024, 5, 1))).await.unwrap();
        assert_eq!(table.rank("example.com"), Some(2));

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn corrupt_cache_falls_back_to_download() {
        let dir = std::env::temp_dir().join(format!("feedrank-cache-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("tranco-2024-05-02.csv"), "1,google.com\nnot-a-rank,example.com\n").await.unwrap();

        let p = provider(Some(dir.clone()));
        // nothing listens at the base url, so reaching the network means a fetch error
        let err = p.load(DatasetKey::Daily(date(2024, 5, 2))).await.unwrap_err();
        assert!(matches!(err, AuthorityError::Fetch(_)), "got {err:?}");

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn cache_write_replaces_file_without_leftovers() {
        let dir = std::env::temp_dir().join(format!("feedrank-cache-{}", uuid::Uuid::new_v4()));
        let path = dir.join("tranco-2024-05-03.csv");
        write_cache(&path, "1,old.com\n").await;
        write_cache(&path, "1,new.com\n").await;

        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "1,new.com\n");
        let mut names = Vec::new();
        let mut rd = tokio::fs::read_dir(&dir).await.unwrap();
        while let Some(e) = rd.next_entry().await.unwrap() {
            names.push(e.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["tranco-2024-05-03.csv".to_string()]);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn unreachable_service_is_a_fetch_error() {
        let err = provider(None).load(DatasetKey::Rolling30).await.unwrap_err();
        assert!(matches!(err, AuthorityError::Fetch(_)));
    }

    #[test]
    fn dataset_key_display() {
        assert_eq!(DatasetKey::Daily(date(2024, 2, 29)).to_string(), "2024-02-29");
        assert_eq!(DatasetKey::Rolling30.to_string(), "rolling-30d");
    }
}
