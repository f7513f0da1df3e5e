//! Article body extraction.

use super::with_fallback;
use crate::error::FailureKind;
use crate::models::{ArticleDraft, ExtractionResult, Headline, Site};
use crate::pipeline::Context;
use crate::services::ExtractRequest;
use crate::utils::collapse_whitespace;
use scraper::{Html, Selector};
use serde_json::{Value, json};
use std::collections::HashSet;
use tracing::{info, instrument, warn};

/// JSON schema sent with the primary extraction request.
pub fn content_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "content": { "type": "string", "description": "Body text of the news article" }
        },
        "required": ["content"]
    })
}

/// Extract the body of `headline` and stamp it into a draft.
///
/// # Errors
///
/// [`FailureKind::Empty`] when neither tier produced any text, or the
/// fallback tier's fetch error when that is what ended the attempt. Both are
/// recoverable: the caller skips this headline and moves on.
#[instrument(level = "info", skip_all, fields(title = %headline.title))]
pub async fn extract_content(
    ctx: &Context,
    headline: &Headline,
    site: &Site,
) -> Result<ArticleDraft, FailureKind> {
    let primary = primary_content(ctx, headline).await;
    let outcome = with_fallback("content", headline.url.as_str(), primary, || {
        fallback_content(ctx, headline)
    })
    .await;

    match outcome {
        ExtractionResult::Items(body) => {
            let chars = body.chars().count();
            let draft = ArticleDraft::new(headline.clone(), site, body).ok_or(FailureKind::Empty)?;
            info!(chars, "Extracted article content");
            Ok(draft)
        }
        ExtractionResult::Empty => {
            warn!("No article content found by either tier");
            Err(FailureKind::Empty)
        }
        ExtractionResult::Error(e) => {
            warn!(error = %e, "Article content scraping failed");
            Err(e)
        }
    }
}

async fn primary_content(ctx: &Context, headline: &Headline) -> ExtractionResult<String> {
    let request = ExtractRequest {
        url: headline.url.clone(),
        prompt: ctx.config.extraction.content_prompt.clone(),
        schema: content_schema(),
    };
    let outcome = ctx
        .services
        .extractor
        .extract(&request)
        .await
        .map(|value| value.as_ref().and_then(body_from_value));
    ExtractionResult::from(outcome)
}

/// Body text from a primary payload: a bare string or an object's `content`.
fn body_from_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.as_str(),
        other => other.get("content").and_then(Value::as_str)?,
    };
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

async fn fallback_content(ctx: &Context, headline: &Headline) -> ExtractionResult<String> {
    let html = match ctx.services.html.fetch(&headline.url).await {
        Ok(html) => html,
        Err(e) => return ExtractionResult::Error(e),
    };
    let profile = ctx.profiles.for_url(&headline.url);
    let body = parse_body(&html, &profile.content);
    info!(chars = body.chars().count(), tier = "fallback", "Scraped article body");

    if body.is_empty() {
        ExtractionResult::Empty
    } else {
        ExtractionResult::Items(body)
    }
}

/// Concatenate the text of every outermost element matched by `selector`.
///
/// Elements nested inside an already-taken match (an `.article-content`
/// inside an `<article>`) are skipped so their text is not repeated. Blocks
/// are joined by blank lines; whitespace inside a block is collapsed.
pub fn parse_body(html: &str, selector: &Selector) -> String {
    let document = Html::parse_document(html);
    let mut taken = HashSet::new();
    let mut blocks = Vec::new();

    for element in document.select(selector) {
        if element.ancestors().any(|a| taken.contains(&a.id())) {
            continue;
        }
        taken.insert(element.id());
        let text = collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "));
        if !text.is_empty() {
            blocks.push(text);
        }
    }
    blocks.join("\n\n")
}
