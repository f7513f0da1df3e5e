//! Scripted stand-ins for the outbound services, shared by unit tests.
//!
//! Every double answers from a table keyed by URL (or by a substring of the
//! prompt, for completions) and falls back to a fixed default otherwise.

use crate::config::Config;
use crate::error::FailureKind;
use crate::models::{ArticleDraft, Headline, Site};
use crate::pipeline::Context;
use crate::services::{
    CompletionClient, CompletionRequest, DocumentStore, ExtractRequest, HtmlFetcher, Services,
    StoreEntry, StructuredExtractor,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

pub fn site() -> Site {
    Site {
        country: "Testland".to_string(),
        name: "Daily Test".to_string(),
        url: Url::parse("https://daily.test/").unwrap(),
    }
}

pub fn headline() -> Headline {
    Headline {
        title: "Council approves new bridge".to_string(),
        url: Url::parse("https://daily.test/news/bridge").unwrap(),
    }
}

pub fn draft(body: &str) -> ArticleDraft {
    ArticleDraft::new(headline(), &site(), body.to_string()).unwrap()
}

#[derive(Default)]
pub struct ScriptedExtractor {
    responses: Mutex<HashMap<String, Result<Option<Value>, FailureKind>>>,
    panics: Mutex<HashSet<String>>,
    delay: Mutex<Option<Duration>>,
    requested: Mutex<Vec<String>>,
    events: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedExtractor {
    pub fn respond(&self, url: &str, result: Result<Option<Value>, FailureKind>) {
        self.responses.lock().unwrap().insert(url.to_string(), result);
    }

    pub fn panic_for(&self, url: &str) {
        self.panics.lock().unwrap().insert(url.to_string());
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    /// `"start <url>"` / `"end <url>"` in the order calls began and finished.
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StructuredExtractor for ScriptedExtractor {
    async fn extract(&self, request: &ExtractRequest) -> Result<Option<Value>, FailureKind> {
        let url = request.url.to_string();
        self.requested.lock().unwrap().push(url.clone());
        if self.panics.lock().unwrap().contains(&url) {
            panic!("scripted extractor panic for {url}");
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.events.lock().unwrap().push(format!("start {url}"));

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.events.lock().unwrap().push(format!("end {url}"));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.responses
            .lock()
            .unwrap()
            .get(&url)
            .cloned()
            .unwrap_or(Ok(None))
    }
}

#[derive(Default)]
pub struct ScriptedHtml {
    pages: Mutex<HashMap<String, Result<String, FailureKind>>>,
    calls: AtomicUsize,
}

impl ScriptedHtml {
    pub fn respond(&self, url: &str, result: Result<String, FailureKind>) {
        self.pages.lock().unwrap().insert(url.to_string(), result);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HtmlFetcher for ScriptedHtml {
    async fn fetch(&self, url: &Url) -> Result<String, FailureKind> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .lock()
            .unwrap()
            .get(url.as_str())
            .cloned()
            .unwrap_or(Err(FailureKind::Status {
                status: 404,
                body: String::new(),
            }))
    }
}

#[derive(Default)]
pub struct ScriptedCompletion {
    rules: Mutex<Vec<(String, Result<String, FailureKind>)>>,
    calls: AtomicUsize,
}

impl ScriptedCompletion {
    /// Answer with `result` whenever the prompt contains `needle`.
    pub fn respond_when(&self, needle: &str, result: Result<String, FailureKind>) {
        self.rules.lock().unwrap().push((needle.to_string(), result));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, FailureKind> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.rules
            .lock()
            .unwrap()
            .iter()
            .find(|(needle, _)| request.prompt.contains(needle.as_str()))
            .map(|(_, result)| result.clone())
            .unwrap_or_else(|| Ok("A summary.".to_string()))
    }
}

#[derive(Default)]
pub struct ScriptedStore {
    failing: Mutex<HashSet<String>>,
    entries: Mutex<Vec<StoreEntry>>,
}

impl ScriptedStore {
    pub fn fail_for(&self, title: &str) {
        self.failing.lock().unwrap().insert(title.to_string());
    }

    pub fn entries(&self) -> Vec<StoreEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentStore for ScriptedStore {
    async fn create(&self, entry: &StoreEntry) -> Result<String, FailureKind> {
        if self.failing.lock().unwrap().contains(&entry.title) {
            return Err(FailureKind::Status {
                status: 400,
                body: "validation_error".to_string(),
            });
        }
        let mut entries = self.entries.lock().unwrap();
        entries.push(entry.clone());
        Ok(format!("page-{}", entries.len()))
    }
}

/// Handles to every double, kept alongside the [`Services`] built from them.
pub struct TestServices {
    pub extractor: Arc<ScriptedExtractor>,
    pub completion: Arc<ScriptedCompletion>,
    pub store: Arc<ScriptedStore>,
    pub html: Arc<ScriptedHtml>,
}

impl TestServices {
    pub fn new() -> Self {
        Self {
            extractor: Arc::default(),
            completion: Arc::default(),
            store: Arc::default(),
            html: Arc::default(),
        }
    }

    pub fn services(&self) -> Services {
        Services {
            extractor: self.extractor.clone(),
            completion: self.completion.clone(),
            store: self.store.clone(),
            html: self.html.clone(),
        }
    }

    pub fn context(&self) -> Context {
        self.context_with(Config::default())
    }

    pub fn context_with(&self, config: Config) -> Context {
        Context::new(config, self.services()).unwrap()
    }
}
