//! Headline and article-body extraction.
//!
//! Both extractors follow the same two-tier pattern:
//!
//! 1. **Primary**: a model-driven structured extraction request against the
//!    live page (see [`crate::services::StructuredExtractor`]).
//! 2. **Fallback**: fetch the raw HTML and match it against the site's
//!    selector profile (see [`profiles`]).
//!
//! The fallback only runs when the primary tier comes back
//! [`ExtractionResult::Empty`] or [`ExtractionResult::Error`]. It is a last
//! resort, never a merge: if the primary tier yields anything, its items are
//! returned as-is.
//!
//! | Module | Input | Output |
//! |--------|-------|--------|
//! | [`headlines`] | a [`crate::models::Site`] | up to N [`crate::models::Headline`]s |
//! | [`content`] | a [`crate::models::Headline`] | an [`crate::models::ArticleDraft`] |

pub mod content;
pub mod headlines;
pub mod profiles;

use crate::models::ExtractionResult;
use std::future::Future;
use tracing::{info, warn};

/// Run `fallback` unless `primary` already produced items.
///
/// `what` names the extraction in log lines ("headlines", "content").
pub async fn with_fallback<T, F, Fut>(
    what: &str,
    target: &str,
    primary: ExtractionResult<T>,
    fallback: F,
) -> ExtractionResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ExtractionResult<T>>,
{
    match primary {
        ExtractionResult::Items(items) => ExtractionResult::Items(items),
        ExtractionResult::Empty => {
            info!(what, target, "Primary extraction empty; falling back to HTML scraping");
            fallback().await
        }
        ExtractionResult::Error(e) => {
            warn!(what, target, error = %e, "Primary extraction failed; falling back to HTML scraping");
            fallback().await
        }
    }
}
