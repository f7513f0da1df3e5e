//! Outbound collaborators of the pipeline.
//!
//! Each external service sits behind a small trait so the pipeline can be
//! exercised against scripted doubles. The production implementations are
//! thin HTTP clients:
//!
//! | Concern | Trait | Client | Service |
//! |---------|-------|--------|---------|
//! | Structured extraction | [`StructuredExtractor`] | [`firecrawl::FirecrawlClient`] | Firecrawl `/v1/scrape` |
//! | Summarization | [`CompletionClient`] | [`openai::OpenAiClient`] | OpenAI-compatible `/chat/completions` |
//! | Persistence | [`DocumentStore`] | [`notion::NotionStore`] | Notion `/pages` |
//! | Fallback fetch | [`HtmlFetcher`] | [`html::ReqwestFetcher`] | plain HTTP GET |
//!
//! All of them are bundled in [`Services`], built once in `main` and shared
//! by reference-counted handle for the life of the process.

pub mod firecrawl;
pub mod html;
pub mod notion;
pub mod openai;

use crate::error::FailureKind;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

/// A model-driven extraction request against one live page.
#[derive(Debug, Clone)]
pub struct ExtractRequest {
    pub url: Url,
    pub prompt: String,
    /// JSON schema describing the desired output shape.
    pub schema: Value,
}

/// One chat completion call.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// The fixed set of fields written per article.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreEntry {
    pub title: String,
    pub summary: String,
    pub country: String,
    pub source: String,
    pub date: NaiveDate,
    pub url: String,
}

#[async_trait]
pub trait StructuredExtractor: Send + Sync {
    /// Returns the extracted payload, or `None` if the service found nothing.
    async fn extract(&self, request: &ExtractRequest) -> Result<Option<Value>, FailureKind>;
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the generated text, possibly empty.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, FailureKind>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Creates one entry and returns its identifier.
    async fn create(&self, entry: &StoreEntry) -> Result<String, FailureKind>;
}

#[async_trait]
pub trait HtmlFetcher: Send + Sync {
    /// GET the page and return its raw markup.
    async fn fetch(&self, url: &Url) -> Result<String, FailureKind>;
}

/// Client bundle handed to the pipeline.
#[derive(Clone)]
pub struct Services {
    pub extractor: Arc<dyn StructuredExtractor>,
    pub completion: Arc<dyn CompletionClient>,
    pub store: Arc<dyn DocumentStore>,
    pub html: Arc<dyn HtmlFetcher>,
}

/// Map a non-success response to [`FailureKind::Status`], keeping a short
/// preview of the body for the logs.
pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, FailureKind> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(FailureKind::Status {
        status: status.as_u16(),
        body: crate::utils::truncate_for_log(&body, 300),
    })
}
