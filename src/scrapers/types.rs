use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One row of a summary (index) page: where the detail page lives and
/// what to call it in logs and notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryItem {
    /// Absolute detail-page URL.
    pub url: String,
    pub title: String,
}

/// A parsed summary page. `next_page` is set only by sources that
/// paginate their results.
#[derive(Debug, Clone, Default)]
pub struct SummaryPage {
    pub items: Vec<SummaryItem>,
    pub next_page: Option<String>,
}

/// Failure modes of a single fetch-and-parse step. Both are recoverable:
/// the orchestrator logs and moves on rather than aborting the run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Transport or HTTP-status failure.
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// An element the layout guarantees (e.g. the title) was absent,
    /// which usually means the site redesigned its markup.
    #[error("parse failed: {what}")]
    Parse { what: String },

    #[error("invalid url {url}: {source}")]
    Url {
        url: String,
        source: url::ParseError,
    },
}

impl ScrapeError {
    pub fn parse(what: impl Into<String>) -> Self {
        ScrapeError::Parse { what: what.into() }
    }
}
