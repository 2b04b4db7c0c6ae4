use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::warn;

use super::Extractor;

/// Full-text lookups for article links.
///
/// Never fails: any extractor error becomes empty text plus a warning, and the
/// caller falls back to feed-supplied content. A shared semaphore bounds how
/// many fetches are in flight across every clone of the retriever.
#[derive(Clone)]
pub struct FullTextRetriever {
    extractor: Arc<dyn Extractor>,
    permits: Arc<Semaphore>,
}

impl FullTextRetriever {
    pub fn new(extractor: Arc<dyn Extractor>, max_inflight: usize) -> Self {
        Self { extractor, permits: Arc::new(Semaphore::new(max_inflight.max(1))) }
    }

    pub async fn fetch(&self, link: &str) -> String {
        let Ok(_permit) = self.permits.acquire().await else {
            warn!(link, "full-text retriever closed");
            return String::new();
        };
        match self.extractor.extract(link).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(link, error = %e, "full-text fetch failed, falling back to feed content");
                String::new()
            }
        }
    }
}
