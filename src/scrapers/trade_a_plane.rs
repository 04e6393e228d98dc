use crate::fields;
use crate::models::ListingDraft;
use crate::scrapers::html::{find_labelled, first_text, following_text, text};
use crate::scrapers::traits::SourceAdapter;
use crate::scrapers::types::{ScrapeError, SummaryItem, SummaryPage};
use crate::scrapers::{default_client, fetch_text, join_url};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::debug;

/// Trade-A-Plane adapter. Detail pages use `<label>Name:</label> value`
/// markup plus schema.org item properties; summaries are single pages of
/// `div.result` rows.
pub struct TradeAPlaneScraper {
    client: Client,
}

impl TradeAPlaneScraper {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: default_client()?,
        })
    }

    fn parse_summary(base_url: &str, html: &str) -> Result<SummaryPage, ScrapeError> {
        let doc = Html::parse_document(html);
        let result_sel = Selector::parse("div.result").unwrap();
        let link_sel = Selector::parse("a").unwrap();

        let mut items = Vec::new();
        for div in doc.select(&result_sel) {
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
        Ok(SummaryPage {
            items,
            next_page: None,
        })
    }

    fn parse_listing(url: &str, html: &str) -> Result<ListingDraft, ScrapeError> {
        let doc = Html::parse_document(html);
        let h1_sel = Selector::parse("h1").unwrap();
        let price_sel = Selector::parse("span[itemprop=\"price\"]").unwrap();
        let manufacturer_sel = Selector::parse("span[itemprop=\"manufacturer\"]").unwrap();
        let label_sel = Selector::parse("label").unwrap();

        let title = doc
            .select(&h1_sel)
            .next()
            .map(|el| text(el))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ScrapeError::parse("missing title (h1)"))?;

        let labelled = |label: &str| find_labelled(&doc, &label_sel, label).and_then(following_text);

        let mut draft = ListingDraft {
            title,
            url: url.to_string(),
            price: doc
                .select(&price_sel)
                .next()
                .and_then(|el| fields::parse_float(&text(el))),
            year: labelled("Year:").and_then(|v| fields::parse_int(&v)).map(|y| y as i32),
            registration: labelled("Registration #:").filter(|r| fields::valid_registration(r)),
            model: doc
                .select(&manufacturer_sel)
                .next()
                .and_then(following_text),
            serial: labelled("Serial #:"),
            airframe_hours: labelled("Total Time:").and_then(|v| fields::parse_float(&v)),
            ..Default::default()
        };

        // "1425 SMOH" style: leading hours, then the overhaul flavor.
        if let Some(overhaul) = labelled("Engine 1 Overhaul Time:") {
            let mut parts = overhaul.split_whitespace();
            if let Some(hours) = parts.next() {
                draft.engine_hours = fields::parse_float(hours);
            }
            if let Some(kind) = parts.next() {
                draft.overhaul_type = Some(kind.to_string());
            }
        }

        if let Some(location) = labelled("Location:") {
            let parts: Vec<&str> = location.split(',').collect();
            match parts.as_slice() {
                [state] => {
                    draft.state = state
                        .split_whitespace()
                        .next()
                        .and_then(fields::normalize_state);
                }
                [city, state, ..] => {
                    draft.city = Some(city.trim().to_string());
                    draft.state = state
                        .trim()
                        .split_whitespace()
                        .next()
                        .and_then(fields::normalize_state);
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
impl SourceAdapter for TradeAPlaneScraper {
    fn name(&self) -> &'static str {
        "Trade-A-Plane"
    }

    async fn fetch_summary(&self, url: &str, page: u32) -> Result<SummaryPage, ScrapeError> {
        debug!(url, page, "fetching Trade-A-Plane summary");
        let html = fetch_text(&self.client, url).await?;
        Self::parse_summary(url, &html)
    }

    async fn fetch_listing(&self, url: &str) -> Result<ListingDraft, ScrapeError> {
        let html = fetch_text(&self.client, url).await?;
        Self::parse_listing(url, &html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body>
        <h1>1979 MOONEY M20J 201</h1>
        <span itemprop="price">$129,500.00</span>
        <p><label>Year:</label> 1979</p>
        <p><label>Registration #:</label> N201BD</p>
        <p><span itemprop="manufacturer">Make/Model:</span> M20J 201</p>
        <p><label>Serial #:</label> 24-0774</p>
        <p><label>Total Time:</label> 4,100</p>
        <p><label>Engine 1 Overhaul Time:</label> 1,425 SMOH</p>
        <p><label>Location:</label> Addison, TX USA</p>
        <div>Garmin GNS 530 with WAAS, GTX 330ES transponder</div>
        </body></html>"#;

    #[test]
    fn listing_fields() {
        let draft =
            TradeAPlaneScraper::parse_listing("http://example.com/l/1", LISTING).unwrap();
        assert_eq!(draft.title, "1979 MOONEY M20J 201");
        assert_eq!(draft.price, Some(129500.0));
        assert_eq!(draft.year, Some(1979));
        assert_eq!(draft.registration.as_deref(), Some("N201BD"));
        assert_eq!(draft.serial.as_deref(), Some("24-0774"));
        assert_eq!(draft.airframe_hours, Some(4100.0));
        assert_eq!(draft.engine_hours, Some(1425.0));
        assert_eq!(draft.overhaul_type.as_deref(), Some("SMOH"));
        assert_eq!(draft.city.as_deref(), Some("Addison"));
        assert_eq!(draft.state.as_deref(), Some("TX"));
        assert_eq!(draft.gps.as_deref(), Some("GNS530W"));
        assert_eq!(draft.transponder.as_deref(), Some("GTX330ES"));
    }

    #[test]
    fn missing_title_is_a_parse_error() {
        let err = TradeAPlaneScraper::parse_listing("http://example.com/l/2", "<html></html>")
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Parse { .. }));
    }

    #[test]
    fn secondary_fields_default_to_none() {
        let draft = TradeAPlaneScraper::parse_listing(
            "http://example.com/l/3",
            "<h1>1980 MOONEY M20K 231</h1>",
        )
        .unwrap();
        assert_eq!(draft.price, None);
        assert_eq!(draft.registration, None);
        assert_eq!(draft.state, None);
        assert_eq!(draft.gps, None);
    }

    #[test]
    fn registration_without_digits_is_dropped() {
        let html = "<h1>Mooney</h1><p><label>Registration #:</label> N/A</p>";
        let draft = TradeAPlaneScraper::parse_listing("http://example.com/l/4", html).unwrap();
        assert_eq!(draft.registration, None);
    }

    #[test]
    fn summary_resolves_relative_links() {
        let html = r#"
            <div class="result"><a href="/listing/1">1979 Mooney 201 <img src="x.jpg"></a></div>
            <div class="result"><a href="/listing/2">1982 Mooney 231</a></div>
            <div class="result"><p>no link here</p></div>"#;
        let page =
            TradeAPlaneScraper::parse_summary("https://www.trade-a-plane.com/search", html)
                .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].url, "https://www.trade-a-plane.com/listing/1");
        assert_eq!(page.items[0].title, "1979 Mooney 201");
        assert!(page.next_page.is_none());
    }
}
