use crate::fields;
use crate::models::ListingDraft;
use crate::scrapers::html::{find_labelled, first_text, following_element, text};
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

/// Controller adapter. Detail pages carry a `div.spec-name` / value-div
/// table; summaries paginate through an `a.btn.next` link, which makes
/// this the only multi-page source.
pub struct ControllerScraper {
    client: Client,
}

fn overhaul_hours_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9,\.]+)").unwrap())
}

fn overhaul_type_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9,\.]+\s*([a-zA-Z]+)").unwrap())
}

impl ControllerScraper {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: default_client()?,
        })
    }

    fn parse_summary(base_url: &str, html: &str) -> Result<SummaryPage, ScrapeError> {
        let doc = Html::parse_document(html);
        let name_sel = Selector::parse("div.listing-name").unwrap();
        let link_sel = Selector::parse("a").unwrap();
        let next_sel = Selector::parse("a.btn.next").unwrap();

        let mut items = Vec::new();
        for div in doc.select(&name_sel) {
            let Some(link) = div.select(&link_sel).next() else {
                continue;
            };
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            items.push(SummaryItem {
                url: join_url(base_url, href)?,
                title: first_text(link).unwrap_or_default(),
            });
        }

        let next_page = match doc.select(&next_sel).next().and_then(|a| a.value().attr("href")) {
            Some(href) => Some(join_url(base_url, href)?),
            None => None,
        };

        Ok(SummaryPage { items, next_page })
    }

    fn parse_listing(url: &str, html: &str) -> Result<ListingDraft, ScrapeError> {
        let doc = Html::parse_document(html);
        let h1_sel = Selector::parse("h1").unwrap();
        let h4_sel = Selector::parse("h4").unwrap();
        let spec_sel = Selector::parse("div.spec-name").unwrap();
        let location_sel = Selector::parse("a.machinelocation").unwrap();

        let title = doc
            .select(&h1_sel)
            .next()
            .map(|el| text(el))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ScrapeError::parse("missing title (h1)"))?;

        let spec = |name: &str| {
            find_labelled(&doc, &spec_sel, name)
                .and_then(following_element)
                .map(|el| text(el))
                .filter(|t| !t.is_empty())
        };

        let mut draft = ListingDraft {
            title,
            url: url.to_string(),
            year: spec("Year").and_then(|v| fields::parse_int(&v)).map(|y| y as i32),
            registration: spec("Registration #").filter(|r| fields::valid_registration(r)),
            model: spec("Model"),
            serial: spec("Serial #"),
            airframe_hours: spec("Total Time").and_then(|v| fields::parse_float(&v)),
            ..Default::default()
        };

        for h4 in doc.select(&h4_sel) {
            let t = text(h4);
            if t.contains("For Sale Price:") {
                draft.price = fields::parse_float(&t);
                break;
            }
        }

        if let Some(overhaul) = spec("Overhaul") {
            if let Some(m) = overhaul_hours_re().captures(&overhaul) {
                draft.engine_hours = fields::parse_float(&m[1]);
            }
            if let Some(m) = overhaul_type_re().captures(&overhaul) {
                draft.overhaul_type = Some(m[1].to_string());
            }
        }

        if let Some(location) = doc.select(&location_sel).next().map(|el| text(el)) {
            let parts: Vec<&str> = location.split(',').collect();
            match parts.as_slice() {
                [state] => draft.state = fields::normalize_state(state.trim()),
                [city, state, ..] => {
                    draft.city = Some(city.trim().to_string());
                    draft.state = fields::normalize_state(state.trim());
                }
                [] => {}
            }
        }

        draft.gps = fields::extract_gps(html);
        draft.transponder = fields::extract_transponder(html);

        Ok(draft)
    }
}

#[async_trait]
impl SourceAdapter for ControllerScraper {
    fn name(&self) -> &'static str {
        "Controller"
    }

    async fn fetch_summary(&self, url: &str, page: u32) -> Result<SummaryPage, ScrapeError> {
        debug!(url, page, "fetching Controller summary");
        let html = fetch_text(&self.client, url).await?;
        Self::parse_summary(url, &html)
    }

    async fn fetch_listing(&self, url: &str) -> Result<ListingDraft, ScrapeError> {
        let html = fetch_text(&self.client, url).await?;
        Self::parse_listing(url, &html)
    }
}
