//! Orchestrator behavior against scripted adapters and an in-memory store.

use async_trait::async_trait;
use mooney_scout::models::{Listing, ListingDraft, ListingOrder};
use mooney_scout::notify::Notifier;
use mooney_scout::scrapers::{ScrapeError, SourceAdapter, SummaryItem, SummaryPage};
use mooney_scout::{MemoryStore, Pipeline, RecordStore, SourceJob};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

enum ItemBehavior {
    Parses(ListingDraft),
    FailsToParse,
}

/// Adapter that replays scripted summary pages and listing outcomes.
struct ScriptedAdapter {
    name: &'static str,
    /// One entry per summary page; the last page has no next link.
    pages: Vec<Vec<SummaryItem>>,
    listings: HashMap<String, ItemBehavior>,
    summary_fails: bool,
    listing_fetches: AtomicUsize,
}

impl ScriptedAdapter {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            pages: vec![Vec::new()],
            listings: HashMap::new(),
            summary_fails: false,
            listing_fetches: AtomicUsize::new(0),
        }
    }

    fn with_listing(mut self, page: usize, url: &str, title: &str, behavior: ItemBehavior) -> Self {
        while self.pages.len() <= page {
            self.pages.push(Vec::new());
        }
        self.pages[page].push(SummaryItem {
            url: url.to_string(),
            title: title.to_string(),
        });
        self.listings.insert(url.to_string(), behavior);
        self
    }

    fn failing_summary(name: &'static str) -> Self {
        Self {
            summary_fails: true,
            ..Self::new(name)
        }
    }
}

#[async_trait]
impl SourceAdapter for ScriptedAdapter {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch_summary(&self, _url: &str, page: u32) -> Result<SummaryPage, ScrapeError> {
        if self.summary_fails {
            return Err(ScrapeError::parse("summary layout changed"));
        }
        let index = (page - 1) as usize;
        let items = self.pages.get(index).cloned().unwrap_or_default();
        let next_page = if index + 1 < self.pages.len() {
            Some(format!("http://scripted/{}/page/{}", self.name, page + 1))
        } else {
            None
        };
        Ok(SummaryPage { items, next_page })
    }

    async fn fetch_listing(&self, url: &str) -> Result<ListingDraft, ScrapeError> {
        self.listing_fetches.fetch_add(1, Ordering::SeqCst);
        match self.listings.get(url) {
            Some(ItemBehavior::Parses(draft)) => Ok(draft.clone()),
            Some(ItemBehavior::FailsToParse) => Err(ScrapeError::parse("missing title")),
            None => Err(ScrapeError::parse("unknown url")),
        }
    }
}

#[derive(Default)]
struct RecordingNotifier {
    calls: Mutex<Vec<(String, Vec<Listing>)>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, subject: &str, listings: &[Listing]) -> anyhow::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((subject.to_string(), listings.to_vec()));
        Ok(())
    }
}

fn draft(url: &str, title: &str, registration: Option<&str>) -> ListingDraft {
    ListingDraft {
        title: title.to_string(),
        url: url.to_string(),
        registration: registration.map(str::to_string),
        ..Default::default()
    }
}

fn parses(url: &str, title: &str, registration: Option<&str>) -> ItemBehavior {
    ItemBehavior::Parses(draft(url, title, registration))
}

fn job(adapter: Arc<ScriptedAdapter>) -> SourceJob {
    SourceJob {
        adapter,
        seed_urls: vec!["http://scripted/seed".to_string()],
    }
}

#[tokio::test]
async fn second_run_is_idempotent_and_skips_without_fetching() {
    let adapter = Arc::new(
        ScriptedAdapter::new("mock")
            .with_listing(0, "http://m/1", "Mooney One", parses("http://m/1", "Mooney One", None))
            .with_listing(0, "http://m/2", "Mooney Two", parses("http://m/2", "Mooney Two", None)),
    );
    let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(Arc::clone(&store), Duration::ZERO);

    let first = pipeline
        .run(vec![job(Arc::clone(&adapter))], &RecordingNotifier::default())
        .await;
    assert_eq!(first.new_listings.len(), 2);
    assert_eq!(adapter.listing_fetches.load(Ordering::SeqCst), 2);

    let second = pipeline
        .run(vec![job(Arc::clone(&adapter))], &RecordingNotifier::default())
        .await;
    assert!(second.new_listings.is_empty());
    assert_eq!(second.skipped, 2);
    // Known URLs are never re-fetched.
    assert_eq!(adapter.listing_fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn registration_duplicate_is_discarded() {
    // Two distinct URLs, same tail number: a re-listing.
    let adapter = Arc::new(
        ScriptedAdapter::new("mock")
            .with_listing(0, "http://m/1", "First", parses("http://m/1", "First", Some("N201BD")))
            .with_listing(0, "http://m/2", "Relisted", parses("http://m/2", "Relisted", Some("N201BD"))),
    );
    let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(Arc::clone(&store), Duration::ZERO);
    let notifier = RecordingNotifier::default();

    let report = pipeline.run(vec![job(adapter)], &notifier).await;

    assert_eq!(report.new_listings.len(), 1);
    assert_eq!(report.new_listings[0].url, "http://m/1");
    assert_eq!(report.skipped, 1);

    // The duplicate is in neither the store nor the notification batch.
    let stored = store.list_all(ListingOrder::SourceTime).unwrap();
    assert_eq!(stored.len(), 1);
    let calls = notifier.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1.len(), 1);
    assert_eq!(calls[0].1[0].title, "First");
}

#[tokio::test]
async fn one_bad_listing_does_not_abort_the_source() {
    let adapter = Arc::new(
        ScriptedAdapter::new("mock")
            .with_listing(0, "http://m/1", "Broken", ItemBehavior::FailsToParse)
            .with_listing(0, "http://m/2", "Fine", parses("http://m/2", "Fine", None)),
    );
    let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(Arc::clone(&store), Duration::ZERO);

    let report = pipeline
        .run(vec![job(adapter)], &RecordingNotifier::default())
        .await;

    assert_eq!(report.failed_items, 1);
    assert_eq!(report.new_listings.len(), 1);
    assert_eq!(report.new_listings[0].title, "Fine");
}

#[tokio::test]
async fn failed_source_leaves_others_running_and_store_unchanged() {
    let broken = Arc::new(ScriptedAdapter::failing_summary("broken"));
    let healthy = Arc::new(
        ScriptedAdapter::new("healthy").with_listing(
            0,
            "http://h/1",
            "Healthy One",
            parses("http://h/1", "Healthy One", None),
        ),
    );
    let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(Arc::clone(&store), Duration::ZERO);
    let notifier = RecordingNotifier::default();

    let report = pipeline
        .run(vec![job(broken), job(healthy)], &notifier)
        .await;

    assert_eq!(report.failed_sources, 1);
    assert_eq!(report.new_listings.len(), 1);

    let stored = store.list_all(ListingOrder::SourceTime).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].title, "Healthy One");

    // The notification still fires, exactly once, for what was persisted.
    let calls = notifier.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "Found 1 New Listings");
}

#[tokio::test]
async fn no_notification_when_nothing_new() {
    let adapter = Arc::new(ScriptedAdapter::new("empty"));
    let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(store, Duration::ZERO);
    let notifier = RecordingNotifier::default();

    let report = pipeline.run(vec![job(adapter)], &notifier).await;

    assert!(report.new_listings.is_empty());
    assert!(notifier.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn pagination_chain_is_followed_in_order() {
    let adapter = Arc::new(
        ScriptedAdapter::new("paged")
            .with_listing(0, "http://p/1", "Page1 Item", parses("http://p/1", "Page1 Item", None))
            .with_listing(1, "http://p/2", "Page2 Item", parses("http://p/2", "Page2 Item", None)),
    );
    let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(Arc::clone(&store), Duration::ZERO);

    let report = pipeline
        .run(vec![job(adapter)], &RecordingNotifier::default())
        .await;

    assert_eq!(report.new_listings.len(), 2);
    assert_eq!(report.new_listings[0].title, "Page1 Item");
    assert_eq!(report.new_listings[1].title, "Page2 Item");
}

#[tokio::test]
async fn batch_spans_all_sources_in_one_notification() {
    let a = Arc::new(
        ScriptedAdapter::new("a").with_listing(0, "http://a/1", "A1", parses("http://a/1", "A1", None)),
    );
    let b = Arc::new(
        ScriptedAdapter::new("b").with_listing(0, "http://b/1", "B1", parses("http://b/1", "B1", None)),
    );
    let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(store, Duration::ZERO);
    let notifier = RecordingNotifier::default();

    let report = pipeline.run(vec![job(a), job(b)], &notifier).await;

    assert_eq!(report.new_listings.len(), 2);
    let calls = notifier.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "Found 2 New Listings");
    assert_eq!(calls[0].1.len(), 2);
}
