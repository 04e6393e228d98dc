use crate::models::ListingDraft;
use crate::scrapers::types::{ScrapeError, SummaryPage};
use async_trait::async_trait;

/// Common trait for all marketplace adapters.
///
/// An adapter is a pure translation from fetched documents to canonical
/// drafts: it never touches the record store and never deduplicates.
/// Adding a marketplace means implementing this once and registering the
/// adapter with the pipeline.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Name of the marketplace, for logs.
    fn name(&self) -> &'static str;

    /// Fetch and parse one summary (index) page. `page` is 1-based and
    /// informational; sources that paginate encode the real cursor in the
    /// `next_page` URL they return.
    async fn fetch_summary(&self, url: &str, page: u32) -> Result<SummaryPage, ScrapeError>;

    /// Fetch and parse one detail page into a draft. `title` and `url`
    /// are required; every other field is best-effort and absent on
    /// missing or unparseable markup.
    async fn fetch_listing(&self, url: &str) -> Result<ListingDraft, ScrapeError>;
}
