//! The end-to-end ingestion run.
//!
//! ```text
//! select countries ─▶ expand to sites ─▶ batches of `concurrency` sites
//!                                          │  (batches strictly in order,
//!                                          │   sites in a batch concurrent)
//!                                          ▼
//!                       per site: extract headlines
//!                                          │  (headlines sequential)
//!                                          ▼
//!               per headline: extract content ─▶ summarize ─▶ persist
//! ```
//!
//! Only a selection fault ends a run early. Everything downstream degrades
//! to fewer results: a headline whose content or summary cannot be produced
//! is skipped, a failed write keeps the result without an identifier, and a
//! site whose task dies is counted as having produced nothing.

use crate::config::{Config, ConfigError};
use crate::error::SelectionError;
use crate::models::{ArticleRecord, Headline, ProcessResult, Site};
use crate::persister::persist;
use crate::scrapers::content::extract_content;
use crate::scrapers::headlines::extract_headlines;
use crate::scrapers::profiles::ProfileTable;
use crate::selector::{expand_sites, select_countries};
use crate::services::Services;
use crate::summarizer::summarize;
use futures::future::join_all;
use std::slice::Chunks;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

/// Everything a leaf component needs, shared read-only across tasks.
#[derive(Clone)]
pub struct Context {
    pub config: Arc<Config>,
    pub services: Services,
    pub profiles: Arc<ProfileTable>,
}

impl Context {
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] if a configured selector profile does not
    /// compile.
    pub fn new(config: Config, services: Services) -> Result<Self, ConfigError> {
        let profiles = ProfileTable::new(&config.profiles)?;
        Ok(Self {
            config: Arc::new(config),
            services,
            profiles: Arc::new(profiles),
        })
    }
}

/// Where a run currently is. Runs only move forward through these phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    SelectingCountries,
    ProcessingSiteBatches,
    Done,
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunPhase::Idle => "idle",
            RunPhase::SelectingCountries => "selecting_countries",
            RunPhase::ProcessingSiteBatches => "processing_site_batches",
            RunPhase::Done => "done",
        };
        f.write_str(name)
    }
}

impl RunPhase {
    /// The phase that follows this one; `Done` is terminal.
    pub fn next(self) -> Self {
        match self {
            RunPhase::Idle => RunPhase::SelectingCountries,
            RunPhase::SelectingCountries => RunPhase::ProcessingSiteBatches,
            RunPhase::ProcessingSiteBatches | RunPhase::Done => RunPhase::Done,
        }
    }
}

fn advance(phase: &mut RunPhase) {
    let next = phase.next();
    debug!(from = %phase, to = %next, "Run phase");
    *phase = next;
}

pub struct Pipeline {
    ctx: Context,
}

impl Pipeline {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// Perform one full run and return the per-article results, in the
    /// order sites finished.
    ///
    /// # Errors
    ///
    /// Only [`SelectionError`]; every other fault is absorbed.
    #[instrument(level = "info", skip_all)]
    pub async fn run(&self) -> Result<Vec<ProcessResult>, SelectionError> {
        let t0 = Instant::now();
        let config = &self.ctx.config;
        let crawler = &config.crawler;
        let mut phase = RunPhase::Idle;

        advance(&mut phase);
        let sites = select_countries(&config.catalog, crawler.random_countries)
            .and_then(|countries| {
                info!(countries = %countries.join(", "), "Selected countries");
                expand_sites(&config.catalog, &countries)
            })
            .inspect_err(|e| error!(phase = %phase, error = %e, "Run aborted"))?;
        let total = sites.len();
        info!(sites = total, concurrency = crawler.concurrency, "Processing news sites");

        advance(&mut phase);
        let results = Arc::new(Mutex::new(Vec::new()));
        let settled = Arc::new(AtomicUsize::new(0));

        for (index, batch) in site_batches(&sites, crawler.concurrency).enumerate() {
            debug!(batch = index + 1, size = batch.len(), "Starting site batch");

            let (names, handles): (Vec<_>, Vec<_>) = batch
                .iter()
                .cloned()
                .map(|site| {
                    let name = site.name.clone();
                    let ctx = self.ctx.clone();
                    let results = Arc::clone(&results);
                    let settled = Arc::clone(&settled);
                    let handle = tokio::spawn(async move {
                        let processed = process_site(&ctx, &site).await;
                        results.lock().await.extend(processed);
                        let done = settled.fetch_add(1, Ordering::SeqCst) + 1;
                        info!(done, total, "Site settled");
                    });
                    (name, handle)
                })
                .unzip();

            for (name, outcome) in names.into_iter().zip(join_all(handles).await) {
                if let Err(e) = outcome {
                    let done = settled.fetch_add(1, Ordering::SeqCst) + 1;
                    error!(site = %name, error = %e, done, total, "Site processing aborted");
                }
            }
        }

        let results = std::mem::take(&mut *results.lock().await);
        advance(&mut phase);
        let elapsed = t0.elapsed();
        info!(
            phase = %phase,
            processed = results.len(),
            sites = total,
            secs = elapsed.as_secs(),
            millis = elapsed.subsec_millis(),
            "Run complete"
        );
        Ok(results)
    }
}

/// Consecutive groups of at most `size` sites.
pub fn site_batches(sites: &[Site], size: usize) -> Chunks<'_, Site> {
    sites.chunks(size.max(1))
}

/// Extract a site's headlines and push each one through the article chain,
/// one after another.
#[instrument(level = "info", skip_all, fields(site = %site.name, country = %site.country))]
pub async fn process_site(ctx: &Context, site: &Site) -> Vec<ProcessResult> {
    info!("Processing site");
    let headlines = extract_headlines(ctx, site).await;
    if headlines.is_empty() {
        warn!("No headlines extracted; skipping site");
        return Vec::new();
    }

    let mut processed = Vec::with_capacity(headlines.len());
    for headline in &headlines {
        if let Some(result) = process_article(ctx, headline, site).await {
            processed.push(result);
        }
    }

    info!(
        succeeded = processed.len(),
        headlines = headlines.len(),
        "Finished site"
    );
    processed
}

/// Content extraction, summarization and persistence for one headline.
///
/// Returns `None` when the article has to be skipped. A persistence failure
/// still yields a result, just without a record identifier.
#[instrument(level = "info", skip_all, fields(title = %headline.title))]
pub async fn process_article(ctx: &Context, headline: &Headline, site: &Site) -> Option<ProcessResult> {
    let draft = match extract_content(ctx, headline, site).await {
        Ok(draft) => draft,
        Err(e) => {
            warn!(error = %e, "Skipping article: no content");
            return None;
        }
    };

    let summary = match summarize(ctx, &draft).await {
        Ok(summary) => summary,
        Err(e) => {
            warn!(error = %e, "Skipping article: no summary");
            return None;
        }
    };

    let record = ArticleRecord::new(draft, summary)?;
    let record_id = persist(ctx, &record).await.ok();
    let title = record.title().to_string();

    info!(persisted = record_id.is_some(), "Article processed");
    Some(ProcessResult {
        title,
        summary: record.summary,
        record_id,
    })
}
