//! Front-page headline extraction.
//!
//! Returns at most `crawler.headlines_per_site` headlines, each with a
//! non-empty title and an absolute `http(s)` URL. Titles are unique within
//! one call. An empty result is not an error: the orchestrator just skips
//! the site.

use super::with_fallback;
use crate::models::{ExtractionResult, Headline, Site};
use crate::pipeline::Context;
use crate::services::ExtractRequest;
use crate::utils::collapse_whitespace;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde_json::{Value, json};
use tracing::{error, info, instrument, warn};
use url::Url;

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// JSON schema sent with the primary extraction request.
pub fn headline_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "title": { "type": "string", "description": "News headline title" },
                "url": { "type": "string", "description": "Link to the news article" }
            },
            "required": ["title", "url"]
        }
    })
}

/// Extract up to `headlines_per_site` headlines from `site`.
///
/// Never fails; both tiers failing or coming back empty yields an empty vec.
#[instrument(level = "info", skip_all, fields(site = %site.name, country = %site.country))]
pub async fn extract_headlines(ctx: &Context, site: &Site) -> Vec<Headline> {
    let limit = ctx.config.crawler.headlines_per_site;
    info!("Extracting headlines");

    let primary = primary_headlines(ctx, site, limit).await;
    if let ExtractionResult::Items(ref items) = primary {
        info!(count = items.len(), tier = "primary", "Extracted headlines");
    }

    let outcome = with_fallback("headlines", site.url.as_str(), primary, || {
        fallback_headlines(ctx, site, limit)
    })
    .await;

    match outcome {
        ExtractionResult::Items(items) => items,
        ExtractionResult::Empty => {
            warn!("No headlines found by either tier");
            Vec::new()
        }
        ExtractionResult::Error(e) => {
            error!(error = %e, "Headline scraping failed");
            Vec::new()
        }
    }
}

async fn primary_headlines(ctx: &Context, site: &Site, limit: usize) -> ExtractionResult<Vec<Headline>> {
    let request = ExtractRequest {
        url: site.url.clone(),
        prompt: ctx.config.extraction.headline_prompt.clone(),
        schema: headline_schema(),
    };
    let outcome = ctx.services.extractor.extract(&request).await.map(|value| {
        value
            .map(|v| headlines_from_value(&v, &site.url, limit))
            .filter(|headlines| !headlines.is_empty())
    });
    ExtractionResult::from(outcome)
}

async fn fallback_headlines(ctx: &Context, site: &Site, limit: usize) -> ExtractionResult<Vec<Headline>> {
    let html = match ctx.services.html.fetch(&site.url).await {
        Ok(html) => html,
        Err(e) => return ExtractionResult::Error(e),
    };
    let profile = ctx.profiles.for_url(&site.url);
    let headlines = parse_headlines(&html, &site.url, &profile.headlines, limit);
    info!(count = headlines.len(), tier = "fallback", "Scraped headlines");

    if headlines.is_empty() {
        ExtractionResult::Empty
    } else {
        ExtractionResult::Items(headlines)
    }
}

/// Read headline items out of a structured extraction payload.
///
/// Accepts a bare array or an object wrapping one under `headlines` or
/// `items`. Items without a title or with an unusable URL are dropped.
pub fn headlines_from_value(value: &Value, base: &Url, limit: usize) -> Vec<Headline> {
    let items: &[Value] = match value {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => map
            .get("headlines")
            .or_else(|| map.get("items"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    };

    items
        .iter()
        .filter_map(|item| {
            let title = collapse_whitespace(item.get("title")?.as_str()?);
            let url = resolve(base, item.get("url")?.as_str()?)?;
            (!title.is_empty()).then_some(Headline { title, url })
        })
        .unique_by(|h| h.title.clone())
        .take(limit)
        .collect()
}

/// Scrape headlines from raw front-page markup.
///
/// Each element matched by `selector` contributes its text as the title.
/// The link is the element's own `href`, else its first descendant link,
/// else its nearest enclosing link. Titles are de-duplicated by exact match
/// and collection stops at `limit`.
pub fn parse_headlines(html: &str, base: &Url, selector: &Selector, limit: usize) -> Vec<Headline> {
    let document = Html::parse_document(html);
    document
        .select(selector)
        .filter_map(|element| {
            let title = collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "));
            if title.is_empty() {
                return None;
            }
            let url = resolve(base, link_of(element)?)?;
            Some(Headline { title, url })
        })
        .unique_by(|h| h.title.clone())
        .take(limit)
        .collect()
}

fn link_of(element: ElementRef<'_>) -> Option<&str> {
    if let Some(href) = element.value().attr("href") {
        return Some(href);
    }
    if let Some(anchor) = element.select(&ANCHOR).next() {
        return anchor.value().attr("href");
    }
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == "a")
        .and_then(|a| a.value().attr("href"))
}

/// Resolve a possibly-relative link against the page URL, keeping only
/// `http` and `https` results.
fn resolve(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let url = base.join(href).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}
