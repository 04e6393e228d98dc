use crate::models::Listing;
use anyhow::Result;
use tracing::info;

/// Outbound notification seam. The pipeline calls this at most once per
/// run, with every listing persisted during the run; the transport
/// (SMTP, chat webhook, ...) lives outside this crate.
pub trait Notifier: Send + Sync {
    fn notify(&self, subject: &str, listings: &[Listing]) -> Result<()>;
}

/// Notifier that just writes the batch to the log. The default when no
/// transport is wired up.
#[derive(Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, subject: &str, listings: &[Listing]) -> Result<()> {
        info!("{subject}");
        for listing in listings {
            info!(id = listing.id, title = %listing.title, url = %listing.url, "new listing");
        }
        Ok(())
    }
}

/// Render the notification body as HTML, one review link per listing.
/// `base_url` points at the listing browser, e.g. `http://host`.
pub fn html_body(base_url: &str, listings: &[Listing]) -> String {
    let mut body = format!("<h4>Found {} new listings:</h4>", listings.len());
    body.push_str("<ul>");
    for listing in listings {
        body.push_str(&format!(
            "<li><a href=\"{}/listing/{}/\">{}</a></li>",
            base_url, listing.id, listing.title
        ));
    }
    body.push_str("</ul>");
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListingDraft;
    use chrono::Utc;

    #[test]
    fn body_links_each_listing() {
        let listings: Vec<Listing> = (1..=2)
            .map(|i| {
                Listing::from_draft(
                    i,
                    ListingDraft {
                        title: format!("Listing {i}"),
                        url: format!("http://src/{i}"),
                        ..Default::default()
                    },
                    Utc::now(),
                )
            })
            .collect();

        let body = html_body("http://host", &listings);
        assert!(body.starts_with("<h4>Found 2 new listings:</h4>"));
        assert!(body.contains("<a href=\"http://host/listing/1/\">Listing 1</a>"));
        assert!(body.contains("<a href=\"http://host/listing/2/\">Listing 2</a>"));
    }
}
