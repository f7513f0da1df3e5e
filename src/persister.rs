//! Writing summarized articles to the document store.

use crate::error::FailureKind;
use crate::models::ArticleRecord;
use crate::pipeline::Context;
use crate::services::StoreEntry;
use chrono::Utc;
use tracing::{error, info, instrument};

/// Map a record onto the store's fixed field set, dated today (UTC).
pub fn store_entry(record: &ArticleRecord) -> StoreEntry {
    StoreEntry {
        title: record.title().to_string(),
        summary: record.summary.clone(),
        country: record.draft.country.clone(),
        source: record.draft.site.clone(),
        date: Utc::now().date_naive(),
        url: record.draft.headline.url.to_string(),
    }
}

/// Create one store entry and return its identifier.
///
/// # Errors
///
/// The store call's failure, already logged. The caller keeps the article
/// in its results without an identifier.
#[instrument(level = "info", skip_all, fields(title = %record.title()))]
pub async fn persist(ctx: &Context, record: &ArticleRecord) -> Result<String, FailureKind> {
    let entry = store_entry(record);
    match ctx.services.store.create(&entry).await {
        Ok(id) => {
            info!(record_id = %id, "Persisted article");
            Ok(id)
        }
        Err(e) => {
            error!(error = %e, "Failed to persist article");
            Err(e)
        }
    }
}
