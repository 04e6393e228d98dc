//! The acquisition orchestrator.
//!
//! Drives every configured source through its summary pages, fetches
//! unseen detail pages with a per-source politeness delay, deduplicates
//! against the record store (URL first, registration second), persists
//! what is new, and hands the run's full batch of new listings to the
//! notifier once at the end.
//!
//! Failure policy: an item failure never aborts its source; a summary
//! failure aborts only that seed chain; a source failure never aborts
//! the run. Partial results are normal.

use crate::models::Listing;
use crate::notify::Notifier;
use crate::scrapers::{SourceAdapter, SummaryItem};
use crate::store::{RecordStore, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// Minimum interval between requests to the same source.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(500);

/// Hard bound on one summary pagination chain.
const MAX_SUMMARY_PAGES: u32 = 50;

/// One source's work order: an adapter plus its configured seed URLs,
/// processed in the given order.
pub struct SourceJob {
    pub adapter: Arc<dyn SourceAdapter>,
    pub seed_urls: Vec<String>,
}

/// What one run did, across all sources.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Listings persisted during this run, in processing order.
    pub new_listings: Vec<Listing>,
    /// Items discarded as duplicates, by URL or registration.
    pub skipped: usize,
    /// Items that failed to fetch, parse, or persist.
    pub failed_items: usize,
    /// Seed chains aborted by a summary-level failure.
    pub failed_sources: usize,
}

impl RunReport {
    fn absorb(&mut self, other: RunReport) {
        self.new_listings.extend(other.new_listings);
        self.skipped += other.skipped;
        self.failed_items += other.failed_items;
        self.failed_sources += other.failed_sources;
    }
}

/// Per-source request pacing. The delay is measured from the start of
/// the previous request on this source, and is enforced before every
/// item regardless of whether the previous item was skipped or fetched.
struct SourceClock {
    last: Option<Instant>,
    delay: Duration,
}

impl SourceClock {
    fn new(delay: Duration) -> Self {
        Self { last: None, delay }
    }

    async fn pace(&self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.delay {
                tokio::time::sleep(self.delay - elapsed).await;
            }
        }
    }

    fn mark(&mut self) {
        self.last = Some(Instant::now());
    }
}

pub struct Pipeline {
    store: Arc<dyn RecordStore>,
    delay: Duration,
    /// Serializes the dedup-check-then-insert section across source
    /// workers, so two sources cannot both pass the not-found check for
    /// the same registration (or URL) and both insert.
    dedup: Mutex<()>,
}

impl Pipeline {
    pub fn new(store: Arc<dyn RecordStore>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            store,
            delay,
            dedup: Mutex::new(()),
        })
    }

    /// Run every source to completion (one worker per source), then
    /// notify once if anything new was persisted.
    pub async fn run(self: &Arc<Self>, jobs: Vec<SourceJob>, notifier: &dyn Notifier) -> RunReport {
        let mut workers = JoinSet::new();
        for job in jobs {
            let pipeline = Arc::clone(self);
            workers.spawn(async move { pipeline.run_source(job).await });
        }

        let mut report = RunReport::default();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(source_report) => report.absorb(source_report),
                Err(e) => {
                    error!("source worker panicked: {e}");
                    report.failed_sources += 1;
                }
            }
        }

        info!("Found {} new listings.", report.new_listings.len());

        if !report.new_listings.is_empty() {
            let subject = format!("Found {} New Listings", report.new_listings.len());
            if let Err(e) = notifier.notify(&subject, &report.new_listings) {
                error!("notification failed: {e:#}");
            }
        }

        report
    }

    async fn run_source(&self, job: SourceJob) -> RunReport {
        let adapter = job.adapter.as_ref();
        let mut report = RunReport::default();
        let mut clock = SourceClock::new(self.delay);

        for seed in &job.seed_urls {
            if let Err(e) = self
                .scrape_summary_chain(adapter, seed, &mut clock, &mut report)
                .await
            {
                warn!(
                    source = adapter.name(),
                    url = %seed,
                    "summary scrape failed, moving on: {e}"
                );
                report.failed_sources += 1;
            }
        }
        report
    }

    /// Walk one summary chain, page by page, processing items in summary
    /// order. Summary-level errors propagate to the caller and abort the
    /// chain; item-level errors are absorbed here.
    async fn scrape_summary_chain(
        &self,
        adapter: &dyn SourceAdapter,
        seed: &str,
        clock: &mut SourceClock,
        report: &mut RunReport,
    ) -> Result<(), crate::scrapers::ScrapeError> {
        let mut url = seed.to_string();
        let mut page = 1u32;

        loop {
            info!(source = adapter.name(), page, "Scraping summary: {url}");
            clock.pace().await;
            clock.mark();
            let summary = adapter.fetch_summary(&url, page).await?;
            info!(
                "Found {} {} listings.",
                summary.items.len(),
                adapter.name()
            );

            for item in &summary.items {
                clock.pace().await;
                self.process_item(adapter, item, clock, report).await;
            }

            match summary.next_page {
                Some(next) if page < MAX_SUMMARY_PAGES => {
                    url = next;
                    page += 1;
                }
                Some(next) => {
                    warn!(
                        source = adapter.name(),
                        "pagination bound reached, not following {next}"
                    );
                    break;
                }
                None => break,
            }
        }
        Ok(())
    }

    /// One summary item: skip, or fetch-parse-dedup-persist. All failure
    /// handling is local; a bad listing never aborts the source.
    async fn process_item(
        &self,
        adapter: &dyn SourceAdapter,
        item: &SummaryItem,
        clock: &mut SourceClock,
        report: &mut RunReport,
    ) {
        // URL dedup before the fetch, so known listings cost nothing.
        match self.store.find_by_url(&item.url) {
            Ok(Some(_)) => {
                info!("Skipping {}.", item.title);
                report.skipped += 1;
                return;
            }
            Ok(None) => {}
            Err(e) => {
                error!(url = %item.url, "store lookup failed: {e}");
                report.failed_items += 1;
                return;
            }
        }

        info!("Opening {}.", item.title);
        clock.mark();
        let draft = match adapter.fetch_listing(&item.url).await {
            Ok(draft) => draft,
            Err(e) => {
                warn!(
                    source = adapter.name(),
                    url = %item.url,
                    "listing scrape failed, moving on: {e}"
                );
                report.failed_items += 1;
                return;
            }
        };

        // Check-then-insert is exclusive across sources; the draft either
        // fully commits or is fully discarded.
        let _guard = self.dedup.lock().await;

        let decision = (|| -> Result<Decision, StoreError> {
            if self.store.find_by_url(&draft.url)?.is_some() {
                return Ok(Decision::DuplicateUrl);
            }
            if let Some(reg) = &draft.registration {
                if self.store.find_by_registration(reg)?.is_some() {
                    return Ok(Decision::DuplicateRegistration(reg.clone()));
                }
            }
            Ok(Decision::Insert)
        })();

        match decision {
            Ok(Decision::DuplicateUrl) => {
                info!("Skipping {}.", item.title);
                report.skipped += 1;
            }
            Ok(Decision::DuplicateRegistration(reg)) => {
                // Same aircraft re-listed under a new URL.
                info!("Duplicate Registration {}: {}.", reg, item.title);
                report.skipped += 1;
            }
            Ok(Decision::Insert) => match self.store.insert(&draft) {
                Ok(listing) => report.new_listings.push(listing),
                Err(e) => {
                    error!(url = %draft.url, "persist failed: {e}");
                    report.failed_items += 1;
                }
            },
            Err(e) => {
                error!(url = %draft.url, "store lookup failed: {e}");
                report.failed_items += 1;
            }
        }
    }
}

enum Decision {
    DuplicateUrl,
    DuplicateRegistration(String),
    Insert,
}
