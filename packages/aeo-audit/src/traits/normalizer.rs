//! Content normalizer trait.

use async_trait::async_trait;

use crate::error::NormalizeResult;
use crate::types::SourceDocument;

/// Converts a URL or raw HTML into a normalized document.
///
/// Consumed as a black box: the pipeline never inspects HTML itself.
/// Failures are fatal for the single page only and surface as
/// fetch or parse failure markers in the batch result.
#[async_trait]
pub trait ContentNormalizer: Send + Sync {
    /// Normalize a page into plain text plus metadata.
    async fn normalize(&self, url_or_html: &str) -> NormalizeResult<SourceDocument>;
}
