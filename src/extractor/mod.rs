pub mod generic;
mod retriever;

pub use retriever::FullTextRetriever;

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::feed::fetch::USER_AGENT;

/// Page URL in, article plaintext out.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<String>;
}

/// Pick an extraction strategy for a host.
pub fn extract_for_host(host: &str, html: &str) -> Option<String> {
    match host {
        // site-specific readers slot in here, keyed by host
        _ => generic::extract_article_text(html),
    }
}

#[derive(Clone)]
pub struct HttpExtractor {
    client: Client,
}

impl HttpExtractor {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("build article http client")?;
        Ok(Self { client })
    }
}

async fn fetch_article_html(client: &Client, url: &str) -> Result<String> {
    let text = client.get(url).send().await?.error_for_status()?.text().await?;
    Ok(text)
}

#[async_trait]
impl Extractor for HttpExtractor {
    async fn extract(&self, url: &str) -> Result<String> {
        let parsed = Url::parse(url).with_context(|| format!("invalid article url {}", url))?;
        let host = parsed.host_str().unwrap_or_default().to_lowercase();
        let html = fetch_article_html(&self.client, url)
            .await
            .with_context(|| format!("fetch article {}", url))?;
        extract_for_host(&host, &html).ok_or_else(|| anyhow!("no article text found at {}", url))
    }
}
