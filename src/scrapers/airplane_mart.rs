use crate::fields;
use crate::models::ListingDraft;
use crate::scrapers::aso::{model_from_title, year_from_title};
use crate::scrapers::html::{find_containing, following_element, text};
use crate::scrapers::traits::SourceAdapter;
use crate::scrapers::types::{ScrapeError, SummaryItem, SummaryPage};
use crate::scrapers::{default_client, fetch_text, join_url};
use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use std::sync::OnceLock;
use tracing::debug;

/// Airplane Mart adapter. Tables of label/value `<td>` pairs straight out
/// of the nineties; summary pages link listings under a fixed path prefix.
pub struct AirplaneMartScraper {
    client: Client,
}

fn engine_time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9\.]+)(?:\s+([A-Z]+))?").unwrap())
}

fn parens_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*\([^)]*\)\s*").unwrap())
}

impl AirplaneMartScraper {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: default_client()?,
        })
    }

    fn parse_summary(base_url: &str, html: &str) -> Result<SummaryPage, ScrapeError> {
        let doc = Html::parse_document(html);
        let link_sel = Selector::parse("a[href*=\"/aircraft-for-sale/Single-Engine-Piston/\"]").unwrap();
        let bold_sel = Selector::parse("b").unwrap();

        let mut items = Vec::new();
        for link in doc.select(&link_sel) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let title = link
                .select(&bold_sel)
                .next()
                .map(|b| text(b))
                .unwrap_or_default();
            items.push(SummaryItem {
                url: join_url(base_url, href)?,
                title,
            });
        }
        Ok(SummaryPage {
            items,
            next_page: None,
        })
    }

    fn parse_listing(url: &str, html: &str) -> Result<ListingDraft, ScrapeError> {
        let doc = Html::parse_document(html);
        let title_sel = Selector::parse("font[size=\"5\"] b").unwrap();
        let cell_sel = Selector::parse("td").unwrap();

        let title = doc
            .select(&title_sel)
            .next()
            .map(|el| text(el))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ScrapeError::parse("missing title (font b)"))?;

        // Label cell, then the value in the next cell over.
        let cell = |label: &str| {
            find_containing(&doc, &cell_sel, label)
                .and_then(following_element)
                .map(|el| text(el))
                .filter(|t| !t.is_empty())
        };

        let mut draft = ListingDraft {
            title: title.clone(),
            url: url.to_string(),
            year: year_from_title(&title),
            model: model_from_title(&title),
            price: cell("Price:").and_then(|v| fields::parse_float(&v)),
            registration: cell("Registration:").filter(|r| fields::valid_registration(r)),
            serial: cell("Serial:"),
            airframe_hours: cell("Airframe Time:").and_then(|v| fields::parse_float(&v)),
            ..Default::default()
        };

        if let Some(engine) = cell("Engine Time(s):") {
            let engine = engine.to_uppercase();
            if let Some(caps) = engine_time_re().captures(&engine) {
                draft.engine_hours = fields::parse_float(&caps[1]);
                if let Some(kind) = caps.get(2) {
                    draft.overhaul_type = Some(kind.as_str().to_string());
                }
            }
        }

        if let Some(location) = cell("Aircraft Location:") {
            // Airport codes ride along in parentheses.
            let location = parens_re().replace_all(&location, "").to_string();
            let parts: Vec<&str> = location.split(',').collect();
            if let Some(city) = parts.first().map(|c| c.trim()).filter(|c| !c.is_empty()) {
                draft.city = Some(city.to_string());
            }
            if let Some(state) = parts.get(1).and_then(|s| s.split_whitespace().next()) {
                draft.state = fields::normalize_state(state);
            }
        }

        draft.gps = fields::extract_gps(html);
        draft.transponder = fields::extract_transponder(html);

        Ok(draft)
    }
}

#[async_trait]
impl SourceAdapter for AirplaneMartScraper {
    fn name(&self) -> &'static str {
        "Airplane Mart"
    }

    async fn fetch_summary(&self, url: &str, page: u32) -> Result<SummaryPage, ScrapeError> {
        debug!(url, page, "fetching Airplane Mart summary");
        let html = fetch_text(&self.client, url).await?;
        Self::parse_summary(url, &html)
    }

    async fn fetch_listing(&self, url: &str) -> Result<ListingDraft, ScrapeError> {
        let html = fetch_text(&self.client, url).await?;
        Self::parse_listing(url, &html)
    }
}
