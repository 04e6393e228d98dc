pub mod airplane_mart;
pub mod aso;
pub mod controller;
pub mod html;
pub mod trade_a_plane;
pub mod traits;
pub mod types;

pub use airplane_mart::AirplaneMartScraper;
pub use aso::AsoScraper;
pub use controller::ControllerScraper;
pub use trade_a_plane::TradeAPlaneScraper;
pub use traits::SourceAdapter;
pub use types::{ScrapeError, SummaryItem, SummaryPage};

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Shared HTTP client configuration: every marketplace rejects requests
/// without a browser User-Agent.
pub(crate) fn default_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        )
        .build()
        .context("Failed to create HTTP client")
}

/// Fetch one document as text, treating non-2xx statuses as fetch errors.
pub(crate) async fn fetch_text(client: &Client, url: &str) -> Result<String, ScrapeError> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.text().await?)
}

/// Resolve a (possibly relative) href against the page it came from.
pub(crate) fn join_url(base: &str, href: &str) -> Result<String, ScrapeError> {
    Url::parse(base)
        .and_then(|b| b.join(href))
        .map(Into::into)
        .map_err(|source| ScrapeError::Url {
            url: format!("{base} + {href}"),
            source,
        })
}
