//! Data models that flow through one pipeline run.
//!
//! Nothing here outlives a run:
//! - [`Site`]: one outlet of one selected country
//! - [`Headline`]: a (title, absolute URL) pair found on a site's front page
//! - [`ArticleDraft`]: a headline plus its extracted body text
//! - [`ArticleRecord`]: a draft plus its summary, handed to the persister
//! - [`ProcessResult`]: what the caller of the pipeline gets back per article
//!
//! [`ExtractionResult`] is the tagged outcome of one extraction tier.

use crate::error::FailureKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

/// A news outlet belonging to exactly one country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub country: String,
    pub name: String,
    pub url: Url,
}

/// A headline found on a site's listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headline {
    /// Non-empty, whitespace-collapsed title.
    pub title: String,
    /// Absolute URL, resolved against the page it was found on.
    pub url: Url,
}

/// A headline whose body text has been extracted.
///
/// Only constructed with a non-empty body; see [`ArticleDraft::new`].
#[derive(Debug, Clone)]
pub struct ArticleDraft {
    pub headline: Headline,
    pub site: String,
    pub country: String,
    pub body: String,
    pub extracted_at: DateTime<Utc>,
}

impl ArticleDraft {
    /// Build a draft stamped with the current time.
    ///
    /// Returns `None` when the body is blank, since such a draft would be
    /// discarded anyway.
    pub fn new(headline: Headline, site: &Site, body: String) -> Option<Self> {
        if body.trim().is_empty() {
            return None;
        }
        Some(Self {
            headline,
            site: site.name.clone(),
            country: site.country.clone(),
            body,
            extracted_at: Utc::now(),
        })
    }
}

/// A summarized draft, ready to be written to the document store.
#[derive(Debug, Clone)]
pub struct ArticleRecord {
    pub draft: ArticleDraft,
    pub summary: String,
}

impl ArticleRecord {
    /// Attach a summary. Returns `None` for a blank summary.
    pub fn new(draft: ArticleDraft, summary: String) -> Option<Self> {
        let summary = summary.trim().to_string();
        if summary.is_empty() {
            return None;
        }
        Some(Self { draft, summary })
    }

    pub fn title(&self) -> &str {
        &self.draft.headline.title
    }
}

/// Per-article outcome returned to the caller of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessResult {
    pub title: String,
    pub summary: String,
    /// Identifier of the created store entry; absent if persistence failed.
    pub record_id: Option<String>,
}

/// Outcome of one extraction tier.
///
/// The fallback tier only runs when the primary tier yields [`Empty`] or
/// [`Error`]; `Items` short-circuits.
///
/// [`Empty`]: ExtractionResult::Empty
/// [`Error`]: ExtractionResult::Error
#[derive(Debug)]
pub enum ExtractionResult<T> {
    Empty,
    Items(T),
    Error(FailureKind),
}

impl<T> From<Result<Option<T>, FailureKind>> for ExtractionResult<T> {
    fn from(res: Result<Option<T>, FailureKind>) -> Self {
        match res {
            Ok(Some(items)) => ExtractionResult::Items(items),
            Ok(None) => ExtractionResult::Empty,
            Err(e) => ExtractionResult::Error(e),
        }
    }
}
