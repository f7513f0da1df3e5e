//! Article summarization through the completion service.

use crate::error::FailureKind;
use crate::models::ArticleDraft;
use crate::pipeline::Context;
use crate::services::CompletionRequest;
use crate::utils::truncate_for_log;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Build the completion request for one draft.
pub fn summary_request(ctx: &Context, draft: &ArticleDraft) -> CompletionRequest {
    let conf = &ctx.config.summarization;
    CompletionRequest {
        model: conf.model.clone(),
        system: conf.system_prompt.clone(),
        prompt: format!("{}\n\n{}", conf.prompt, draft.body),
        max_tokens: conf.max_tokens,
        temperature: conf.temperature,
    }
}

/// Summarize a draft in a few sentences.
///
/// # Errors
///
/// [`FailureKind::Empty`] if the model answered with blank text, or the
/// completion call's own failure. Either way the article is skipped.
#[instrument(level = "info", skip_all, fields(title = %draft.headline.title))]
pub async fn summarize(ctx: &Context, draft: &ArticleDraft) -> Result<String, FailureKind> {
    let t0 = Instant::now();
    let request = summary_request(ctx, draft);

    let text = ctx
        .services
        .completion
        .complete(&request)
        .await
        .inspect_err(|e| error!(error = %e, "Summarization call failed"))?;

    let summary = text.trim();
    if summary.is_empty() {
        warn!("Model returned an empty summary");
        return Err(FailureKind::Empty);
    }

    info!(
        elapsed_ms = t0.elapsed().as_millis() as u64,
        chars = summary.chars().count(),
        "Summarized article"
    );
    debug!(summary = %truncate_for_log(summary, 200), "Summary preview");
    Ok(summary.to_string())
}
