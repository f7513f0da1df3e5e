//! Raw HTML fetches for the fallback scraping tier.

use super::{HtmlFetcher, check_status};
use crate::config::CrawlerConfig;
use crate::error::FailureKind;
use async_trait::async_trait;
use tracing::{debug, instrument};
use url::Url;

/// Plain GET with the configured user agent and deadline.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HtmlFetcher for ReqwestFetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &Url) -> Result<String, FailureKind> {
        let resp = self.client.get(url.clone()).send().await?;
        let resp = check_status(resp).await?;
        let html = resp.text().await?;
        debug!(bytes = html.len(), "Fetched page");
        Ok(html)
    }
}
