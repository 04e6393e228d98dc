use crate::fields;
use crate::models::ListingDraft;
use crate::scrapers::html::text;
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

/// ASO adapter. The least structured of the sources: most values live in
/// free-form `<span>` runs, so year and model come from the title text.
pub struct AsoScraper {
    client: Client,
}

fn year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(19|20)\d\d").unwrap())
}

fn model_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"M20[A-Z]\s*(\d{3})?").unwrap())
}

/// Year from a listing title like "1982 Mooney M20K 231".
pub(crate) fn year_from_title(title: &str) -> Option<i32> {
    year_re().find(title).and_then(|m| m.as_str().parse().ok())
}

/// Model designation from a listing title, e.g. "M20K 231".
pub(crate) fn model_from_title(title: &str) -> Option<String> {
    model_re()
        .find(&title.to_uppercase())
        .map(|m| m.as_str().trim().to_string())
}

impl AsoScraper {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: default_client()?,
        })
    }

    fn parse_summary(base_url: &str, html: &str) -> Result<SummaryPage, ScrapeError> {
        let doc = Html::parse_document(html);
        let link_sel = Selector::parse("a.photoListingsDescription").unwrap();
        let img_sel = Selector::parse("img").unwrap();

        let mut items = Vec::new();
        for link in doc.select(&link_sel) {
            // Each listing appears twice: once as a photo link, once as a
            // text link. Keep the text one.
            if link.select(&img_sel).next().is_some() {
                continue;
            }
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            items.push(SummaryItem {
                url: join_url(base_url, href)?,
                title: text(link),
            });
        }
        Ok(SummaryPage {
            items,
            next_page: None,
        })
    }

    fn parse_listing(url: &str, html: &str) -> Result<ListingDraft, ScrapeError> {
        let doc = Html::parse_document(html);
        let header_sel = Selector::parse("div.adSpecView-header-Descr div").unwrap();
        let span_sel = Selector::parse("span").unwrap();
        let engine_table_sel = Selector::parse("table.enginePropView").unwrap();
        let row_sel = Selector::parse("tr").unwrap();
        let cell_sel = Selector::parse("td").unwrap();

        let title = doc
            .select(&header_sel)
            .next()
            .map(|el| text(el))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ScrapeError::parse("missing title (adSpecView header)"))?;

        let mut draft = ListingDraft {
            title: title.clone(),
            url: url.to_string(),
            year: year_from_title(&title),
            model: model_from_title(&title),
            ..Default::default()
        };

        for span in doc.select(&span_sel) {
            let t = text(span);
            if t.contains("Price") {
                draft.price = fields::parse_float(&t);
            } else if t.contains("Reg #") {
                draft.registration = t
                    .split_whitespace()
                    .last()
                    .map(str::to_uppercase)
                    .filter(|r| fields::valid_registration(r));
            } else if t.contains("Serial #") {
                draft.serial = t.split_whitespace().last().map(str::to_uppercase);
            } else if t.contains("TTAF:") {
                draft.airframe_hours = fields::parse_float(&t);
            } else if t.contains("Location:") {
                // The token right after the label is the state.
                if let Some(state) = t.split_whitespace().nth(1) {
                    draft.state =
                        fields::normalize_state(state.trim_matches(|c| c == ' ' || c == ','));
                }
            }
        }

        // Engine block: a two-row table, headers over values. The first
        // all-digit cell is the engine time; its header is the overhaul
        // flavor (SMOH, SFRM, ...).
        if let Some(table) = doc.select(&engine_table_sel).next() {
            let rows: Vec<_> = table.select(&row_sel).collect();
            if rows.len() == 2 {
                let headers: Vec<String> = rows[0].select(&cell_sel).map(text).collect();
                for (i, cell) in rows[1].select(&cell_sel).enumerate() {
                    let value = text(cell);
                    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
                        draft.engine_hours = fields::parse_float(&value);
                        draft.overhaul_type = headers.get(i).map(|h| h.to_uppercase());
                        break;
                    }
                }
            }
        }

        draft.gps = fields::extract_gps(html);
        draft.transponder = fields::extract_transponder(html);

        Ok(draft)
    }
}

#[async_trait]
impl SourceAdapter for AsoScraper {
    fn name(&self) -> &'static str {
        "ASO"
    }

    async fn fetch_summary(&self, url: &str, page: u32) -> Result<SummaryPage, ScrapeError> {
        debug!(url, page, "fetching ASO summary");
        let html = fetch_text(&self.client, url).await?;
        Self::parse_summary(url, &html)
    }

    async fn fetch_listing(&self, url: &str) -> Result<ListingDraft, ScrapeError> {
        let html = fetch_text(&self.client, url).await?;
        Self::parse_listing(url, &html)
    }
}
