use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;

use super::parse;
use super::types::{FeedEntry, FeedSource};

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";

#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, source: &FeedSource) -> Result<Vec<FeedEntry>>;
}

#[derive(Clone)]
pub struct HttpFeedFetcher {
    client: Client,
}

impl HttpFeedFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("build feed http client")?;
        Ok(Self { client })
    }
}

pub async fn fetch_feed_bytes(client: &Client, url: &str) -> Result<Bytes> {
    let bytes = client.get(url).send().await?.error_for_status()?.bytes().await?;
    Ok(bytes)
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, source: &FeedSource) -> Result<Vec<FeedEntry>> {
        let xml = fetch_feed_bytes(&self.client, &source.url)
            .await
            .with_context(|| format!("fetch feed {}", source.url))?;
        parse::parse_entries(&xml).with_context(|| format!("parse feed {}", source.url))
    }
}
